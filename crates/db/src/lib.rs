pub mod memory;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod store;

pub use memory::MemoryStore;
pub use store::{BookingStore, InsertOutcome, PgStore};

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
