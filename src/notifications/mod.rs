use crate::config::AppConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Payload posted to webhook receivers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Receiver rejected notification with status {0}")]
    Rejected(u16),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Receives plain-text alerts such as low-stock warnings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), NotificationError>;
}

/// Delivers `message` and swallows any failure after logging it.
///
/// Callers use this so a broken receiver never fails the operation that
/// raised the alert.
pub async fn notify_best_effort(sink: &dyn NotificationSink, message: &str) {
    if let Err(e) = sink.notify(message).await {
        warn!(error = %e, "Notification delivery failed; continuing");
    }
}

/// Writes alerts to the log.
#[derive(Debug, Default, Clone)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        warn!(target: "site_safety::alerts", "{}", message);
        Ok(())
    }
}

/// Keeps every alert in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNotificationSink {
    messages: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .await
            .iter()
            .map(|n| n.text.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.messages.lock().await.clear();
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        self.messages.lock().await.push(Notification::new(message));
        Ok(())
    }
}

/// POSTs each alert as JSON to a configured endpoint.
#[derive(Clone)]
pub struct WebhookNotificationSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotificationSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationSink for WebhookNotificationSink {
    #[instrument(skip(self, message), fields(url = %self.url))]
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&Notification::new(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Rejected(status.as_u16()));
        }

        info!("Notification delivered");
        Ok(())
    }
}

/// Picks the webhook sink when an endpoint is configured, the log sink otherwise.
pub fn sink_from_config(cfg: &AppConfig) -> Result<Arc<dyn NotificationSink>, NotificationError> {
    match cfg.notification_webhook_url.as_deref() {
        Some(url) if !url.trim().is_empty() => Ok(Arc::new(WebhookNotificationSink::new(
            url,
            cfg.notification_timeout(),
        )?)),
        _ => Ok(Arc::new(LogNotificationSink)),
    }
}
