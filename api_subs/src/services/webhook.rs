use log::{info, warn};
use notifier::Notifier;

use crate::models::event::{RawEvent, WebhookEvent};

/// What ingest did with a delivery. The HTTP answer is the same either way.
#[derive(Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    Forwarded(&'static str),
    Ignored,
}

/// Classifies one delivery and forwards the recognized ones.
///
/// Never fails: unreadable bodies and unknown event types are logged and
/// ignored. A known event is forwarded even when its resource is missing or
/// partly malformed. Deliveries for the same subscription
/// may arrive in any order or more than once; each is handled on its own.
pub async fn ingest(notifier: &dyn Notifier, body: &[u8]) -> IngestOutcome {
    let raw: RawEvent = match serde_json::from_slice(body) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Unreadable PayPal webhook body: {}", e);
            return IngestOutcome::Ignored;
        }
    };

    let Some(event_type) = raw.event_type.as_deref() else {
        warn!("PayPal webhook {:?} without event_type", raw.id);
        return IngestOutcome::Ignored;
    };

    let Some(event) = WebhookEvent::parse(event_type, raw.resource) else {
        info!("Ignoring PayPal webhook {} ({:?})", event_type, raw.id);
        return IngestOutcome::Ignored;
    };

    let notification_type = event.notification_type();
    info!(
        "PayPal webhook {} for {}",
        event_type,
        event.resource_id().unwrap_or("unknown resource")
    );
    notifier.notify(notification_type, event.into_record()).await;
    IngestOutcome::Forwarded(notification_type)
}
