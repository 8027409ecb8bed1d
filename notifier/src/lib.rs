//! Best-effort side channel towards the workflow automation endpoint.
//!
//! `notify` never fails observably: delivery problems are logged and
//! dropped, so callers cannot make their own outcome depend on them.

use async_trait::async_trait;
use chrono::Utc;
use common::error::{AppError, Res};
use log::{info, warn};
use reqwest::Client;
use serde::Serialize;
use url::Url;

/// Action marker asking the automation to mail the license key.
pub const SEND_LICENSE_KEY: &str = "send_license_key";

/// Flat record forwarded for every recognized lifecycle event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotificationRecord {
    pub subscription_id: Option<String>,
    pub plan_id: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Body of the automation POST: `{event_type, timestamp, ...record}`.
#[derive(Debug, Serialize)]
struct Notification<'a> {
    event_type: &'a str,
    timestamp: String,
    #[serde(flatten)]
    record: &'a NotificationRecord,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event_type: &str, record: NotificationRecord);
}

/// Posts notifications to `AUTOMATION_WEBHOOK_URL`. With no URL configured
/// every notification is logged and skipped.
pub struct AutomationNotifier {
    client: Client,
    url: Option<Url>,
}

impl AutomationNotifier {
    pub fn new(client: Client, url: Option<Url>) -> Self {
        AutomationNotifier { client, url }
    }

    async fn deliver(&self, url: &Url, event_type: &str, record: &NotificationRecord) -> Res<()> {
        let body = Notification {
            event_type,
            timestamp: Utc::now().to_rfc3339(),
            record,
        };

        let response = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Forwarding(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Forwarding(format!(
                "automation endpoint answered {}",
                status
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for AutomationNotifier {
    async fn notify(&self, event_type: &str, record: NotificationRecord) {
        let Some(url) = &self.url else {
            info!("Automation forwarding disabled, dropping {}", event_type);
            return;
        };

        match self.deliver(url, event_type, &record).await {
            Ok(()) => info!(
                "Forwarded {} for subscription {:?}",
                event_type, record.subscription_id
            ),
            Err(e) => warn!("Failed to forward {}: {}", event_type, e),
        }
    }
}
