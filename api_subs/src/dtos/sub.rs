use paypal::{Subscriber, Subscription};
use serde::{Deserialize, Serialize};

// Request fields are optional so that a missing field is reported by name
// instead of as a JSON decoding error.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateSubscriptionRequest {
    pub plan_id: Option<String>,
    pub subscriber_email: Option<String>,
    pub subscriber_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionIdRequest {
    pub subscription_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancelSubscriptionRequest {
    pub subscription_id: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionResponse {
    pub subscription_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateSubscriptionResponse {
    pub subscription: SubscriptionView,
}

/// Subscription as shown to the extension. `subscriber`, `billingCycles`
/// and `billingInfo` keep PayPal's own shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub id: String,
    pub plan_id: Option<String>,
    pub status: String,
    pub subscriber: Option<Subscriber>,
    pub billing_cycles: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_info: Option<serde_json::Value>,
    pub created_at: Option<String>,
}

impl From<Subscription> for SubscriptionView {
    fn from(sub: Subscription) -> Self {
        SubscriptionView {
            id: sub.id,
            plan_id: sub.plan_id,
            status: sub.status.into(),
            subscriber: sub.subscriber,
            billing_cycles: sub.billing_cycles,
            billing_info: sub.billing_info,
            created_at: sub.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancelSubscriptionResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusResponse {
    pub subscription_id: String,
    pub status: String,
    pub is_active: bool,
}
