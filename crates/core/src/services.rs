//! Service abstractions for external collaborators.
//!
//! Both collaborators are best-effort: callers log their failures and never
//! let them undo the store mutation that triggered them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::booking::Booking;

/// Payload handed to the notifier once a cancellation has been stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationNotice {
    pub booking: Booking,
    pub reason: String,
}

/// Delivers client-facing messages (email in production).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_cancelled(&self, notice: &CancellationNotice) -> eyre::Result<()>;
}

/// Mirrors bookings into a coach's external calendar.
#[async_trait]
pub trait CalendarSync: Send + Sync {
    async fn booking_created(&self, calendar_id: &str, booking: &Booking) -> eyre::Result<()>;

    async fn booking_cancelled(&self, calendar_id: &str, booking: &Booking) -> eyre::Result<()>;
}
