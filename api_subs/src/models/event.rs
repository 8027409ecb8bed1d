use notifier::{NotificationRecord, SEND_LICENSE_KEY};
use paypal::SubscriberName;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Field deserializer that turns a value of the wrong type into `None`, so one
/// bad field never costs the whole event.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Envelope of every PayPal webhook delivery. All fields are optional so
/// that a delivery without them can still be acknowledged.
#[derive(Debug, Default, Deserialize)]
pub struct RawEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub resource: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionEvent {
    Created,
    Activated,
    Updated,
    Cancelled,
    Suspended,
    Expired,
}

impl SubscriptionEvent {
    fn from_provider(event_type: &str) -> Option<Self> {
        Some(match event_type {
            "BILLING.SUBSCRIPTION.CREATED" => SubscriptionEvent::Created,
            "BILLING.SUBSCRIPTION.ACTIVATED" => SubscriptionEvent::Activated,
            "BILLING.SUBSCRIPTION.UPDATED" => SubscriptionEvent::Updated,
            "BILLING.SUBSCRIPTION.CANCELLED" => SubscriptionEvent::Cancelled,
            "BILLING.SUBSCRIPTION.SUSPENDED" => SubscriptionEvent::Suspended,
            "BILLING.SUBSCRIPTION.EXPIRED" => SubscriptionEvent::Expired,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    Completed,
    Denied,
}

impl CaptureEvent {
    fn from_provider(event_type: &str) -> Option<Self> {
        match event_type {
            "PAYMENT.CAPTURE.COMPLETED" => Some(CaptureEvent::Completed),
            "PAYMENT.CAPTURE.DENIED" => Some(CaptureEvent::Denied),
            _ => None,
        }
    }
}

/// `subscriber` block of a subscription event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventSubscriber {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<SubscriberName>,
    #[serde(default, deserialize_with = "lenient")]
    pub email_address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub payer_id: Option<String>,
}

impl EventSubscriber {
    pub fn full_name(&self) -> Option<String> {
        self.name.as_ref().and_then(SubscriberName::full_name)
    }
}

/// `resource` of the `BILLING.SUBSCRIPTION.*` events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionResource {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub plan_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub subscriber: Option<EventSubscriber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Amount {
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub currency_code: Option<String>,
}

/// `resource` of the `PAYMENT.CAPTURE.*` events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptureResource {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub amount: Option<Amount>,
    /// Set when the capture belongs to a subscription.
    #[serde(default, deserialize_with = "lenient")]
    pub billing_agreement_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub custom_id: Option<String>,
}

/// Recognized webhook deliveries, tagged by PayPal's `event_type`.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    Subscription(SubscriptionEvent, SubscriptionResource),
    Capture(CaptureEvent, CaptureResource),
}

impl WebhookEvent {
    /// `None` for event types the relay does not handle. A missing, null or
    /// non-object resource reads as an empty one.
    pub fn parse(event_type: &str, resource: Value) -> Option<Self> {
        if let Some(kind) = SubscriptionEvent::from_provider(event_type) {
            return Some(WebhookEvent::Subscription(kind, resource_or_empty(resource)));
        }
        if let Some(kind) = CaptureEvent::from_provider(event_type) {
            return Some(WebhookEvent::Capture(kind, resource_or_empty(resource)));
        }
        None
    }

    /// Event type sent to the automation endpoint.
    pub fn notification_type(&self) -> &'static str {
        match self {
            WebhookEvent::Subscription(kind, _) => match kind {
                SubscriptionEvent::Created => "SUBSCRIPTION_CREATED",
                SubscriptionEvent::Activated => "SUBSCRIPTION_ACTIVATED",
                SubscriptionEvent::Updated => "SUBSCRIPTION_UPDATED",
                SubscriptionEvent::Cancelled => "SUBSCRIPTION_CANCELLED",
                SubscriptionEvent::Suspended => "SUBSCRIPTION_SUSPENDED",
                SubscriptionEvent::Expired => "SUBSCRIPTION_EXPIRED",
            },
            WebhookEvent::Capture(CaptureEvent::Completed, _) => "PAYMENT_COMPLETED",
            WebhookEvent::Capture(CaptureEvent::Denied, _) => "PAYMENT_DENIED",
        }
    }

    pub fn resource_id(&self) -> Option<&str> {
        match self {
            WebhookEvent::Subscription(_, r) => r.id.as_deref(),
            WebhookEvent::Capture(_, r) => r.id.as_deref(),
        }
    }

    pub fn into_record(self) -> NotificationRecord {
        match self {
            WebhookEvent::Subscription(kind, r) => {
                let subscriber = r.subscriber.unwrap_or_default();
                NotificationRecord {
                    subscription_id: r.id,
                    plan_id: r.plan_id,
                    status: r.status,
                    name: subscriber.full_name(),
                    email: subscriber.email_address,
                    action: (kind == SubscriptionEvent::Activated)
                        .then(|| SEND_LICENSE_KEY.to_string()),
                    ..Default::default()
                }
            }
            WebhookEvent::Capture(_, r) => {
                let (amount, currency) = r
                    .amount
                    .map(|a| (a.value, a.currency_code))
                    .unwrap_or_default();
                NotificationRecord {
                    subscription_id: r.billing_agreement_id.or(r.custom_id),
                    status: r.status,
                    amount,
                    currency,
                    ..Default::default()
                }
            }
        }
    }
}

fn resource_or_empty<T: DeserializeOwned + Default>(resource: Value) -> T {
    serde_json::from_value(resource).unwrap_or_default()
}
