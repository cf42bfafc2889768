use crate::models::DbCoachSettings;
use chrono::{NaiveTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_by_coach_id(
    pool: &Pool<Postgres>,
    coach_id: Uuid,
) -> Result<Option<DbCoachSettings>> {
    tracing::debug!("Getting coach settings: coach_id={}", coach_id);

    let settings = sqlx::query_as::<_, DbCoachSettings>(
        r#"
        SELECT coach_id, work_start_time, work_end_time, google_calendar_id, updated_at
        FROM coach_settings
        WHERE coach_id = $1
        "#,
    )
    .bind(coach_id)
    .fetch_optional(pool)
    .await?;

    Ok(settings)
}

pub async fn upsert(
    pool: &Pool<Postgres>,
    coach_id: Uuid,
    work_start_time: NaiveTime,
    work_end_time: NaiveTime,
    google_calendar_id: Option<&str>,
) -> Result<DbCoachSettings> {
    let settings = sqlx::query_as::<_, DbCoachSettings>(
        r#"
        INSERT INTO coach_settings (coach_id, work_start_time, work_end_time, google_calendar_id, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (coach_id) DO UPDATE
        SET work_start_time = EXCLUDED.work_start_time,
            work_end_time = EXCLUDED.work_end_time,
            google_calendar_id = EXCLUDED.google_calendar_id,
            updated_at = EXCLUDED.updated_at
        RETURNING coach_id, work_start_time, work_end_time, google_calendar_id, updated_at
        "#,
    )
    .bind(coach_id)
    .bind(work_start_time)
    .bind(work_end_time)
    .bind(google_calendar_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::debug!("Coach settings saved: coach_id={}", coach_id);
    Ok(settings)
}
