pub mod booking;
pub mod coach_settings;
pub mod slot_block;

use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::PgConnection;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

/// Serialises writers of one `(coach, start_time)` slot for the rest of the
/// surrounding transaction.
pub(crate) async fn lock_slot(
    conn: &mut PgConnection,
    coach_id: Uuid,
    start_time: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        SELECT pg_advisory_xact_lock(
            hashtextextended($1::text || '@' || extract(epoch FROM $2::timestamptz)::bigint::text, 0)
        )
        "#,
    )
    .bind(coach_id)
    .bind(start_time)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// True if a confirmed booking or a block already occupies the slot.
pub(crate) async fn slot_taken(
    conn: &mut PgConnection,
    coach_id: Uuid,
    start_time: DateTime<Utc>,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM bookings
            WHERE coach_id = $1 AND start_time = $2 AND status = 'confirmed'
        ) OR EXISTS (
            SELECT 1 FROM slot_blocks
            WHERE coach_id = $1 AND start_time = $2
        )
        "#,
    )
    .bind(coach_id)
    .bind(start_time)
    .fetch_one(&mut *conn)
    .await?;

    Ok(taken)
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
