use common::{
    error::Res,
    validate::{require, require_all},
};
use log::info;
use paypal::{BillingGateway, DEFAULT_CANCEL_REASON, DEFAULT_SUBSCRIBER_NAME};

use crate::dtos::sub::{
    CancelSubscriptionRequest, CancelSubscriptionResponse, CreateSubscriptionRequest,
    CreateSubscriptionResponse, SubscriptionIdRequest, SubscriptionStatusResponse,
    SubscriptionView, ValidateSubscriptionResponse,
};

/// Creates a subscription and returns where the user has to approve it.
pub async fn create_subscription(
    gateway: &dyn BillingGateway,
    req: CreateSubscriptionRequest,
) -> Res<CreateSubscriptionResponse> {
    let [plan_id, email] = require_all([
        ("planId", req.plan_id.as_deref()),
        ("subscriberEmail", req.subscriber_email.as_deref()),
    ])?;
    let name = req
        .subscriber_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_SUBSCRIBER_NAME);

    let created = gateway.create_subscription(plan_id, email, name).await?;
    info!("Subscription {} created for plan {}", created.id, plan_id);

    Ok(CreateSubscriptionResponse {
        subscription_id: created.id,
        approval_link: created.approval_link,
    })
}

/// Re-reads a subscription from PayPal. Read-only, so the extension can call
/// it as often as it needs after coming back from the approval page.
pub async fn validate_subscription(
    gateway: &dyn BillingGateway,
    req: SubscriptionIdRequest,
) -> Res<ValidateSubscriptionResponse> {
    let id = require(req.subscription_id.as_deref(), "subscriptionId")?;
    let subscription = gateway.get_subscription(id).await?;
    Ok(ValidateSubscriptionResponse {
        subscription: SubscriptionView::from(subscription),
    })
}

pub async fn cancel_subscription(
    gateway: &dyn BillingGateway,
    req: CancelSubscriptionRequest,
) -> Res<CancelSubscriptionResponse> {
    let id = require(req.subscription_id.as_deref(), "subscriptionId")?;
    let reason = req
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_CANCEL_REASON);

    gateway.cancel_subscription(id, reason).await?;
    info!("Subscription {} cancelled: {}", id, reason);

    Ok(CancelSubscriptionResponse {
        message: "Subscription cancelled successfully".to_string(),
    })
}

/// Current status plus whether it unlocks paid features.
pub async fn subscription_status(
    gateway: &dyn BillingGateway,
    req: SubscriptionIdRequest,
) -> Res<SubscriptionStatusResponse> {
    let id = require(req.subscription_id.as_deref(), "subscriptionId")?;
    let subscription = gateway.get_subscription(id).await?;
    Ok(SubscriptionStatusResponse {
        is_active: subscription.status.is_entitled(),
        status: subscription.status.to_string(),
        subscription_id: subscription.id,
    })
}
