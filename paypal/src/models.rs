use std::fmt;

use serde::{Deserialize, Serialize};

/// Subscription status as reported by PayPal.
///
/// PayPal may add statuses at any time, so unknown values are kept verbatim
/// in `Other` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    ApprovalPending,
    Approved,
    Active,
    Suspended,
    Cancelled,
    Expired,
    Other(String),
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::ApprovalPending => "APPROVAL_PENDING",
            SubscriptionStatus::Approved => "APPROVED",
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Suspended => "SUSPENDED",
            SubscriptionStatus::Cancelled => "CANCELLED",
            SubscriptionStatus::Expired => "EXPIRED",
            SubscriptionStatus::Other(s) => s.as_str(),
        }
    }

    /// Whether the extension should unlock paid features.
    ///
    /// `APPROVAL_PENDING` counts so the extension can show the subscription
    /// as in progress while the user is still on the PayPal approval page.
    pub fn is_entitled(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::ApprovalPending
        )
    }
}

impl From<String> for SubscriptionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "APPROVAL_PENDING" => SubscriptionStatus::ApprovalPending,
            "APPROVED" => SubscriptionStatus::Approved,
            "ACTIVE" => SubscriptionStatus::Active,
            "SUSPENDED" => SubscriptionStatus::Suspended,
            "CANCELLED" => SubscriptionStatus::Cancelled,
            "EXPIRED" => SubscriptionStatus::Expired,
            _ => SubscriptionStatus::Other(s),
        }
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriberName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
}

impl SubscriberName {
    /// Given name and surname joined by a space. Missing parts are skipped;
    /// `None` when neither is present.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.given_name.as_deref(), self.surname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// Subscriber block shared by the billing API and the webhook resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<SubscriberName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer_id: Option<String>,
}

impl Subscriber {
    pub fn full_name(&self) -> Option<String> {
        self.name.as_ref().and_then(SubscriberName::full_name)
    }
}

/// Normalized view of a PayPal subscription. The relay never stores it;
/// every read goes back to PayPal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub plan_id: Option<String>,
    pub status: SubscriptionStatus,
    pub subscriber: Option<Subscriber>,
    /// Billing-cycle data, passed through untouched.
    pub billing_cycles: Option<serde_json::Value>,
    /// Payment progress (`cycle_executions`, `next_billing_time`, ...),
    /// passed through untouched.
    pub billing_info: Option<serde_json::Value>,
    pub created_at: Option<String>,
}

/// Result of a create call: the new id plus where to send the user.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedSubscription {
    pub id: String,
    pub approval_link: Option<String>,
}

// === PAYPAL WIRE TYPES ===

#[derive(Serialize)]
pub(crate) struct CreateSubscriptionPayload<'a> {
    pub plan_id: &'a str,
    pub subscriber: SubscriberPayload<'a>,
}

#[derive(Serialize)]
pub(crate) struct SubscriberPayload<'a> {
    pub name: NamePayload<'a>,
    pub email_address: &'a str,
}

#[derive(Serialize)]
pub(crate) struct NamePayload<'a> {
    pub given_name: &'a str,
}

#[derive(Serialize)]
pub(crate) struct CancelPayload<'a> {
    pub reason_code: &'static str,
    pub reason: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Link {
    pub href: String,
    pub rel: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateSubscriptionResponse {
    pub id: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl CreateSubscriptionResponse {
    /// `href` of the `rel == "approve"` link, if PayPal sent one.
    pub fn approval_link(&self) -> Option<String> {
        self.links
            .iter()
            .find(|l| l.rel == "approve")
            .map(|l| l.href.clone())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PayPalSubscription {
    pub id: String,
    pub plan_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub subscriber: Option<Subscriber>,
    pub billing_cycles: Option<serde_json::Value>,
    pub billing_info: Option<serde_json::Value>,
    pub create_time: Option<String>,
}

impl From<PayPalSubscription> for Subscription {
    fn from(raw: PayPalSubscription) -> Self {
        Subscription {
            id: raw.id,
            plan_id: raw.plan_id,
            status: raw.status.unwrap_or_default().into(),
            subscriber: raw.subscriber,
            billing_cycles: raw.billing_cycles,
            billing_info: raw.billing_info,
            created_at: raw.create_time,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

/// Error body of both the REST API (`name`/`message`/`details`) and the
/// OAuth endpoint (`error`/`error_description`).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PayPalErrorBody {
    pub name: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub details: Vec<PayPalErrorDetail>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PayPalErrorDetail {
    pub issue: Option<String>,
    pub description: Option<String>,
}

impl PayPalErrorBody {
    pub fn summary(&self) -> Option<String> {
        if let Some(desc) = &self.error_description {
            return Some(desc.clone());
        }
        let head = self.message.clone().or_else(|| self.name.clone()).or_else(|| self.error.clone())?;
        let detail = self.details.first().map(|d| {
            match (&d.issue, &d.description) {
                (Some(issue), Some(desc)) => format!("{}: {}", issue, desc),
                (Some(issue), None) => issue.clone(),
                (None, Some(desc)) => desc.clone(),
                (None, None) => String::new(),
            }
        });
        match detail {
            Some(d) if !d.is_empty() => Some(format!("{} ({})", head, d)),
            _ => Some(head),
        }
    }
}
