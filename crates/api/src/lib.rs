//! # Boxing24 API
//!
//! The API crate provides the web server for the Boxing24 booking service.
//! Clients read a coach's slot grid and book or cancel slots; coaches manage
//! their work hours and block individual slots.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Turn requests into store calls and domain responses
//! - **Middleware**: Error mapping shared by all handlers
//! - **Integrations**: Client notification and calendar sync collaborators
//! - **Config**: Environment and application configuration
//!
//! The store, notifier and calendar are trait objects so the server runs
//! against PostgreSQL in production and in-memory doubles in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement the booking flows
pub mod handlers;
/// Outbound notification and calendar sync implementations
pub mod integrations;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{http::HeaderValue, Router};
use chrono_tz::Tz;
use eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use boxing24_core::services::{CalendarSync, Notifier};
use boxing24_db::BookingStore;

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use boxing24_api::{integrations::{LogNotifier, NoopCalendarSync}, router, ApiState};
/// use boxing24_db::MemoryStore;
///
/// let state = Arc::new(ApiState {
///     store: Arc::new(MemoryStore::new()),
///     notifier: Arc::new(LogNotifier),
///     calendar: Arc::new(NoopCalendarSync),
///     timezone: chrono_tz::Europe::Warsaw,
///     slot_minutes: 60,
/// });
/// let app = router(state);
/// ```
pub struct ApiState {
    /// Persistence for settings, bookings and slot blocks
    pub store: Arc<dyn BookingStore>,
    /// Tells clients about cancellations
    pub notifier: Arc<dyn Notifier>,
    /// Mirrors bookings into the coach's external calendar
    pub calendar: Arc<dyn CalendarSync>,
    /// Zone in which work hours and booking times are interpreted
    pub timezone: Tz,
    /// Slot duration used for booking and blocking
    pub slot_minutes: u32,
}

/// Builds the application router with all routes attached to `state`.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Slot grid
        .merge(routes::availability::routes())
        // Client bookings
        .merge(routes::booking::routes())
        // Coach blocks
        .merge(routes::slot_block::routes())
        // Coach work hours
        .merge(routes::settings::routes())
        .with_state(state)
}

/// Starts the API server with the provided configuration and store
///
/// This function initializes logging, wires the external collaborators,
/// configures routes and middleware, and serves HTTP until shut down.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use boxing24_api::{config::ApiConfig, start_server};
/// use boxing24_db::{create_pool, PgStore};
///
/// # async fn run() -> eyre::Result<()> {
/// let config = ApiConfig::from_env()?;
/// let pool = create_pool(&config.database_url).await?;
/// start_server(config, Arc::new(PgStore::new(pool))).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn BookingStore>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (notifier, calendar) = integrations::from_config(&config)?;

    let state = Arc::new(ApiState {
        store,
        notifier,
        calendar,
        timezone: config.timezone,
        slot_minutes: config.slot_minutes,
    });

    let app = router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .wrap_err_with(|| format!("Invalid CORS origin '{}'", origin))
            })
            .collect::<Result<Vec<_>>>()?;

        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Request logging and timeout
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    info!(
        "Booking times interpreted in {} with {} minute slots",
        config.timezone.name(),
        config.slot_minutes
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
