use crate::{
    models::{DbSlotBlock, NewSlotBlock},
    repositories::{is_unique_violation, lock_slot, slot_taken},
    store::InsertOutcome,
};
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn insert_if_free(
    pool: &Pool<Postgres>,
    block: &NewSlotBlock,
) -> Result<InsertOutcome<DbSlotBlock>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let mut tx = pool.begin().await?;
    lock_slot(&mut tx, block.coach_id, block.start_time).await?;

    if slot_taken(&mut tx, block.coach_id, block.start_time).await? {
        return Ok(InsertOutcome::SlotTaken);
    }

    let inserted = sqlx::query_as::<_, DbSlotBlock>(
        r#"
        INSERT INTO slot_blocks (id, coach_id, start_time, reason, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, coach_id, start_time, reason, created_at
        "#,
    )
    .bind(id)
    .bind(block.coach_id)
    .bind(block.start_time)
    .bind(&block.reason)
    .bind(now)
    .fetch_one(&mut *tx)
    .await;

    let row = match inserted {
        Ok(row) => row,
        Err(e) if is_unique_violation(&e) => return Ok(InsertOutcome::SlotTaken),
        Err(e) => return Err(e.into()),
    };

    tx.commit().await?;
    Ok(InsertOutcome::Inserted(row))
}

pub async fn get_from(
    pool: &Pool<Postgres>,
    coach_id: Uuid,
    from: DateTime<Utc>,
) -> Result<Vec<DbSlotBlock>> {
    let blocks = sqlx::query_as::<_, DbSlotBlock>(
        r#"
        SELECT id, coach_id, start_time, reason, created_at
        FROM slot_blocks
        WHERE coach_id = $1 AND start_time >= $2
        ORDER BY start_time ASC
        "#,
    )
    .bind(coach_id)
    .bind(from)
    .fetch_all(pool)
    .await?;

    Ok(blocks)
}

pub async fn get_between(
    pool: &Pool<Postgres>,
    coach_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<DbSlotBlock>> {
    let blocks = sqlx::query_as::<_, DbSlotBlock>(
        r#"
        SELECT id, coach_id, start_time, reason, created_at
        FROM slot_blocks
        WHERE coach_id = $1 AND start_time >= $2 AND start_time < $3
        ORDER BY start_time ASC
        "#,
    )
    .bind(coach_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(blocks)
}

/// Returns false when no block with that id belongs to the coach.
pub async fn delete(pool: &Pool<Postgres>, coach_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM slot_blocks
        WHERE id = $1 AND coach_id = $2
        "#,
    )
    .bind(id)
    .bind(coach_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
