use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Client name the legacy dashboard used to mark a blocked slot.
pub const LEGACY_BLOCK_CLIENT_NAME: &str = "BLOKADA";

const LEGACY_MIGRATION_REASON: &str = "migrated to slot block";

/// Marker row recording that the sentinel conversion has run.
const LEGACY_MIGRATION_NAME: &str = "legacy_sentinel_blocks";

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create coach_settings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS coach_settings (
            coach_id UUID PRIMARY KEY,
            work_start_time TIME NOT NULL,
            work_end_time TIME NOT NULL,
            google_calendar_id VARCHAR(255) NULL,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_work_window CHECK (work_end_time > work_start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create bookings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            coach_id UUID NOT NULL,
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'confirmed',
            client_name VARCHAR(255) NOT NULL,
            client_email VARCHAR(255) NOT NULL,
            client_phone VARCHAR(64) NULL,
            notes TEXT NULL,
            cancellation_reason TEXT NULL,
            cancelled_at TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_status CHECK (status IN ('confirmed', 'cancelled'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create slot_blocks table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS slot_blocks (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            coach_id UUID NOT NULL,
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            reason TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS uniq_slot_blocks_slot
        ON slot_blocks(coach_id, start_time);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            name VARCHAR(64) PRIMARY KEY,
            applied_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Sentinel rows must leave the bookings table before its unique index
    // can be built over legacy data
    let migrated = migrate_legacy_blocks(pool).await?;
    if migrated > 0 {
        info!("Moved {} legacy sentinel bookings into slot_blocks", migrated);
    }

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS uniq_bookings_active_slot
        ON bookings(coach_id, start_time)
        WHERE status = 'confirmed';
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_bookings_coach_start
        ON bookings(coach_id, start_time);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}

/// Moves confirmed bookings carrying the legacy sentinel client name into
/// `slot_blocks` and cancels the originals. Returns the number of bookings
/// cancelled.
///
/// Runs at most once per database: later calls find the marker in
/// `schema_migrations` and return 0, so bookings made afterwards under the
/// sentinel name stay ordinary bookings.
pub async fn migrate_legacy_blocks(pool: &Pool<Postgres>) -> Result<u64> {
    let mut tx = pool.begin().await?;

    let first_run = sqlx::query(
        r#"
        INSERT INTO schema_migrations (name)
        VALUES ($1)
        ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(LEGACY_MIGRATION_NAME)
    .execute(&mut *tx)
    .await?
    .rows_affected()
        == 1;

    if !first_run {
        tx.commit().await?;
        return Ok(0);
    }

    sqlx::query(
        r#"
        INSERT INTO slot_blocks (id, coach_id, start_time, reason, created_at)
        SELECT gen_random_uuid(), coach_id, start_time, notes, created_at
        FROM bookings
        WHERE client_name = $1 AND status = 'confirmed'
        ON CONFLICT (coach_id, start_time) DO NOTHING
        "#,
    )
    .bind(LEGACY_BLOCK_CLIENT_NAME)
    .execute(&mut *tx)
    .await?;

    let cancelled = sqlx::query(
        r#"
        UPDATE bookings
        SET status = 'cancelled', cancellation_reason = $2, cancelled_at = NOW()
        WHERE client_name = $1 AND status = 'confirmed'
        "#,
    )
    .bind(LEGACY_BLOCK_CLIENT_NAME)
    .bind(LEGACY_MIGRATION_REASON)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    Ok(cancelled)
}
