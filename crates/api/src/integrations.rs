//! Implementations of the external collaborators described in
//! [`boxing24_core::services`].
//!
//! The webhook variants hand events to a relay (mail sender, calendar
//! bridge) as JSON with a bearer token. The fallbacks only log.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use serde::Serialize;
use tracing::info;

use boxing24_core::{
    models::booking::Booking,
    services::{CalendarSync, CancellationNotice, Notifier},
};

use crate::config::{ApiConfig, WebhookConfig};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Logs cancellations instead of delivering them.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_cancelled(&self, notice: &CancellationNotice) -> Result<()> {
        info!(
            "Cancellation notice for {} <{}> (booking {}): {}",
            notice.booking.client_name, notice.booking.client_email, notice.booking.id, notice.reason
        );
        Ok(())
    }
}

/// Used when no calendar bridge is configured.
pub struct NoopCalendarSync;

#[async_trait]
impl CalendarSync for NoopCalendarSync {
    async fn booking_created(&self, calendar_id: &str, booking: &Booking) -> Result<()> {
        tracing::debug!(
            "Calendar sync disabled, skipping create of booking {} for {}",
            booking.id, calendar_id
        );
        Ok(())
    }

    async fn booking_cancelled(&self, calendar_id: &str, booking: &Booking) -> Result<()> {
        tracing::debug!(
            "Calendar sync disabled, skipping cancel of booking {} for {}",
            booking.id, calendar_id
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookEvent<'a, T: Serialize> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    calendar_id: Option<&'a str>,
    payload: &'a T,
}

/// POSTs JSON events to a single endpoint.
#[derive(Clone)]
struct WebhookClient {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookClient {
    fn new(config: WebhookConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .wrap_err("Failed to build webhook HTTP client")?;
        Ok(Self { client, config })
    }

    async fn post<T: Serialize + Sync>(
        &self,
        event: &str,
        calendar_id: Option<&str>,
        payload: &T,
    ) -> Result<()> {
        self.client
            .post(&self.config.url)
            .bearer_auth(&self.config.token)
            .json(&WebhookEvent {
                event,
                calendar_id,
                payload,
            })
            .send()
            .await
            .wrap_err_with(|| format!("Webhook {} unreachable", self.config.url))?
            .error_for_status()
            .wrap_err_with(|| format!("Webhook {} rejected '{}'", self.config.url, event))?;
        Ok(())
    }
}

pub struct WebhookNotifier {
    client: WebhookClient,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self> {
        Ok(Self {
            client: WebhookClient::new(config)?,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn booking_cancelled(&self, notice: &CancellationNotice) -> Result<()> {
        self.client.post("booking_cancelled", None, notice).await
    }
}

pub struct WebhookCalendarSync {
    client: WebhookClient,
}

impl WebhookCalendarSync {
    pub fn new(config: WebhookConfig) -> Result<Self> {
        Ok(Self {
            client: WebhookClient::new(config)?,
        })
    }
}

#[async_trait]
impl CalendarSync for WebhookCalendarSync {
    async fn booking_created(&self, calendar_id: &str, booking: &Booking) -> Result<()> {
        self.client
            .post("booking_created", Some(calendar_id), booking)
            .await
    }

    async fn booking_cancelled(&self, calendar_id: &str, booking: &Booking) -> Result<()> {
        self.client
            .post("booking_cancelled", Some(calendar_id), booking)
            .await
    }
}

/// Picks webhook implementations when configured, logging fallbacks otherwise.
pub fn from_config(config: &ApiConfig) -> Result<(Arc<dyn Notifier>, Arc<dyn CalendarSync>)> {
    let notifier: Arc<dyn Notifier> = match &config.notify_webhook {
        Some(webhook) => Arc::new(WebhookNotifier::new(webhook.clone())?),
        None => {
            info!("NOTIFY_WEBHOOK_URL not set, cancellation notices will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let calendar: Arc<dyn CalendarSync> = match &config.calendar_webhook {
        Some(webhook) => Arc::new(WebhookCalendarSync::new(webhook.clone())?),
        None => Arc::new(NoopCalendarSync),
    };

    Ok((notifier, calendar))
}
