use crate::{
    models::{DbBooking, NewBooking},
    repositories::{is_unique_violation, lock_slot, slot_taken},
    store::InsertOutcome,
};
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Inserts the booking unless the slot already holds a confirmed booking or
/// a block.
pub async fn insert_if_free(
    pool: &Pool<Postgres>,
    booking: &NewBooking,
) -> Result<InsertOutcome<DbBooking>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let mut tx = pool.begin().await?;
    lock_slot(&mut tx, booking.coach_id, booking.start_time).await?;

    if slot_taken(&mut tx, booking.coach_id, booking.start_time).await? {
        tracing::debug!(
            "Slot taken: coach_id={}, start_time={}",
            booking.coach_id, booking.start_time
        );
        return Ok(InsertOutcome::SlotTaken);
    }

    let inserted = sqlx::query_as::<_, DbBooking>(
        r#"
        INSERT INTO bookings (id, coach_id, start_time, status, client_name, client_email, client_phone, notes, created_at)
        VALUES ($1, $2, $3, 'confirmed', $4, $5, $6, $7, $8)
        RETURNING id, coach_id, start_time, status, client_name, client_email, client_phone,
                  notes, cancellation_reason, cancelled_at, created_at
        "#,
    )
    .bind(id)
    .bind(booking.coach_id)
    .bind(booking.start_time)
    .bind(&booking.client_name)
    .bind(&booking.client_email)
    .bind(&booking.client_phone)
    .bind(&booking.notes)
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

pub async fn get_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbBooking>> {
    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, coach_id, start_time, status, client_name, client_email, client_phone,
               notes, cancellation_reason, cancelled_at, created_at
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

/// Confirmed bookings starting at or after `from`, earliest first.
pub async fn get_active_from(
    pool: &Pool<Postgres>,
    coach_id: Uuid,
    from: DateTime<Utc>,
) -> Result<Vec<DbBooking>> {
    let bookings = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, coach_id, start_time, status, client_name, client_email, client_phone,
               notes, cancellation_reason, cancelled_at, created_at
        FROM bookings
        WHERE coach_id = $1 AND status = 'confirmed' AND start_time >= $2
        ORDER BY start_time ASC
        "#,
    )
    .bind(coach_id)
    .bind(from)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

/// Confirmed bookings in the half-open range `[start, end)`.
pub async fn get_active_between(
    pool: &Pool<Postgres>,
    coach_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<DbBooking>> {
    let bookings = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, coach_id, start_time, status, client_name, client_email, client_phone,
               notes, cancellation_reason, cancelled_at, created_at
        FROM bookings
        WHERE coach_id = $1 AND status = 'confirmed' AND start_time >= $2 AND start_time < $3
        ORDER BY start_time ASC
        "#,
    )
    .bind(coach_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

/// Flips a confirmed booking to cancelled. `None` if the booking does not
/// exist or was already cancelled.
pub async fn cancel(pool: &Pool<Postgres>, id: Uuid, reason: &str) -> Result<Option<DbBooking>> {
    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        UPDATE bookings
        SET status = 'cancelled', cancellation_reason = $2, cancelled_at = $3
        WHERE id = $1 AND status = 'confirmed'
        RETURNING id, coach_id, start_time, status, client_name, client_email, client_phone,
                  notes, cancellation_reason, cancelled_at, created_at
        "#,
    )
    .bind(id)
    .bind(reason)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}
