use axum::{
    routing::{delete, get},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/coaches/:coach_id/blocks",
            get(handlers::slot_block::list_slot_blocks).post(handlers::slot_block::create_slot_block),
        )
        .route(
            "/api/coaches/:coach_id/blocks/:id",
            delete(handlers::slot_block::delete_slot_block),
        )
}
