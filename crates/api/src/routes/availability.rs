use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/api/coaches/:coach_id/slots",
        get(handlers::availability::get_slot_grid),
    )
}
