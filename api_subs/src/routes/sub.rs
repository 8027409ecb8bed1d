use actix_web::{Responder, post, web};
use common::{error::Res, http::Success};
use paypal::BillingGateway;

use crate::{
    dtos::sub::{CancelSubscriptionRequest, CreateSubscriptionRequest, SubscriptionIdRequest},
    services,
};

/// Creates a PayPal subscription for the given plan.
///
/// # Input
/// - `req`: JSON payload:
///   - `planId`: PayPal billing plan id
///   - `subscriberEmail`: Email of the subscriber
///   - `subscriberName`: (Optional) Given name, defaults to "Customer"
///
/// # Output
/// - Success: `{ success: true, subscriptionId, approvalLink }`, `approvalLink`
///   is omitted when PayPal returned none
/// - Error: 400 when a required field is missing, 500 when PayPal refuses
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch(`${API_BASE}/api/paypal/create-subscription`, {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({ planId: 'P-5ML4271244454362WXNWU5NQ', subscriberEmail: email })
/// });
/// const { subscriptionId, approvalLink } = await response.json();
/// chrome.storage.local.set({ pendingSubscriptionId: subscriptionId });
/// chrome.tabs.create({ url: approvalLink });
/// ```
#[post("/create-subscription")]
pub async fn post_create_subscription(
    gateway: web::Data<dyn BillingGateway>,
    req: web::Json<CreateSubscriptionRequest>,
) -> Res<impl Responder> {
    let created = services::sub::create_subscription(gateway.get_ref(), req.into_inner()).await?;
    Success::ok(created)
}

/// Fetches the current state of a subscription from PayPal.
///
/// Safe to call repeatedly; the extension calls it after the user returns
/// from the approval page to learn whether the subscription went through.
///
/// # Input
/// - `req`: JSON payload with `subscriptionId`
///
/// # Output
/// - Success: `{ success: true, subscription: { id, planId, status, subscriber, billingCycles, createdAt } }`
/// - Error: 400 when `subscriptionId` is missing, 500 when PayPal refuses
#[post("/validate-subscription")]
pub async fn post_validate_subscription(
    gateway: web::Data<dyn BillingGateway>,
    req: web::Json<SubscriptionIdRequest>,
) -> Res<impl Responder> {
    let subscription =
        services::sub::validate_subscription(gateway.get_ref(), req.into_inner()).await?;
    Success::ok(subscription)
}

/// Cancels a subscription.
///
/// # Input
/// - `req`: JSON payload:
///   - `subscriptionId`: Subscription to cancel
///   - `reason`: (Optional) Free text passed on to PayPal
///
/// # Output
/// - Success: `{ success: true, message }`
/// - Error: 400 when `subscriptionId` is missing, 500 with PayPal's message
///   otherwise (for example when the subscription is already cancelled)
#[post("/cancel-subscription")]
pub async fn post_cancel_subscription(
    gateway: web::Data<dyn BillingGateway>,
    req: web::Json<CancelSubscriptionRequest>,
) -> Res<impl Responder> {
    let cancelled = services::sub::cancel_subscription(gateway.get_ref(), req.into_inner()).await?;
    Success::ok(cancelled)
}

/// Reports whether a subscription currently unlocks paid features.
///
/// # Input
/// - `req`: JSON payload with `subscriptionId`
///
/// # Output
/// - Success: `{ success: true, subscriptionId, status, isActive }`
/// - Error: same as `/validate-subscription`
#[post("/subscription-status")]
pub async fn post_subscription_status(
    gateway: web::Data<dyn BillingGateway>,
    req: web::Json<SubscriptionIdRequest>,
) -> Res<impl Responder> {
    let status = services::sub::subscription_status(gateway.get_ref(), req.into_inner()).await?;
    Success::ok(status)
}
