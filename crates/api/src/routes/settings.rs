use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/api/coaches/:coach_id/settings",
        get(handlers::settings::get_settings).put(handlers::settings::save_settings),
    )
}
