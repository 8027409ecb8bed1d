use async_trait::async_trait;
use common::{
    env_config::PayPalConfig,
    error::{AppError, Res},
    validate::require,
};
use log::{error, info};
use reqwest::{Client, Response};
use url::Url;

use crate::{
    models::{
        CancelPayload, CreateSubscriptionPayload, CreateSubscriptionResponse, CreatedSubscription,
        NamePayload, PayPalErrorBody, PayPalSubscription, SubscriberPayload, Subscription,
    },
    token::TokenProvider,
};

pub const DEFAULT_SUBSCRIBER_NAME: &str = "Customer";
pub const DEFAULT_CANCEL_REASON: &str = "User requested cancellation";
const CANCEL_REASON_CODE: &str = "USER_REQUESTED";

/// The three billing calls the relay makes against PayPal.
///
/// Implementations check that the identifiers they need are present and fail
/// with `AppError::BadRequest` before touching the network.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait BillingGateway: Send + Sync {
    async fn create_subscription(
        &self,
        plan_id: &str,
        subscriber_email: &str,
        subscriber_name: &str,
    ) -> Res<CreatedSubscription>;

    async fn get_subscription(&self, subscription_id: &str) -> Res<Subscription>;

    /// A blank `reason` is replaced by [`DEFAULT_CANCEL_REASON`].
    async fn cancel_subscription(&self, subscription_id: &str, reason: &str) -> Res<()>;
}

/// `BillingGateway` backed by the PayPal REST API.
pub struct PayPalClient {
    client: Client,
    tokens: TokenProvider,
    base_url: Url,
}

impl PayPalClient {
    pub fn new(config: &PayPalConfig, client: Client) -> Res<Self> {
        Ok(PayPalClient {
            tokens: TokenProvider::new(config, client.clone())?,
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn subscriptions_url(&self, tail: &[&str]) -> Res<Url> {
        let mut segments = vec!["v1", "billing", "subscriptions"];
        segments.extend_from_slice(tail);
        crate::endpoint(&self.base_url, &segments)
    }

    /// Passes 2xx responses through; turns anything else into a gateway
    /// error carrying the upstream status and PayPal's own message.
    async fn ensure_success(response: Response, context: &str) -> Res<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let debug_id = response
            .headers()
            .get("paypal-debug-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        let summary = serde_json::from_str::<PayPalErrorBody>(&body)
            .ok()
            .and_then(|b| b.summary())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        error!(
            "PayPal {} failed: status={} debug_id={:?} body={}",
            context, status, debug_id, body
        );

        Err(AppError::gateway(
            Some(status.as_u16()),
            format!("PayPal {} failed ({}): {}", context, status.as_u16(), summary),
        ))
    }
}

#[async_trait]
impl BillingGateway for PayPalClient {
    async fn create_subscription(
        &self,
        plan_id: &str,
        subscriber_email: &str,
        subscriber_name: &str,
    ) -> Res<CreatedSubscription> {
        let plan_id = require(Some(plan_id), "planId")?;
        let subscriber_email = require(Some(subscriber_email), "subscriberEmail")?;
        let given_name = match subscriber_name.trim() {
            "" => DEFAULT_SUBSCRIBER_NAME,
            name => name,
        };

        let token = self.tokens.access_token().await?;
        let payload = CreateSubscriptionPayload {
            plan_id,
            subscriber: SubscriberPayload {
                name: NamePayload { given_name },
                email_address: subscriber_email,
            },
        };

        let response = self
            .client
            .post(self.subscriptions_url(&[])?)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;
        let created: CreateSubscriptionResponse = Self::ensure_success(response, "create subscription")
            .await?
            .json()
            .await?;

        info!("PayPal subscription created: {}", created.id);
        Ok(CreatedSubscription {
            approval_link: created.approval_link(),
            id: created.id,
        })
    }

    async fn get_subscription(&self, subscription_id: &str) -> Res<Subscription> {
        let subscription_id = require(Some(subscription_id), "subscriptionId")?;

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(self.subscriptions_url(&[subscription_id])?)
            .bearer_auth(token)
            .send()
            .await?;
        let raw: PayPalSubscription = Self::ensure_success(response, "get subscription")
            .await?
            .json()
            .await?;

        info!("PayPal subscription fetched: {} ({:?})", raw.id, raw.status);
        Ok(raw.into())
    }

    async fn cancel_subscription(&self, subscription_id: &str, reason: &str) -> Res<()> {
        let subscription_id = require(Some(subscription_id), "subscriptionId")?;
        let reason = match reason.trim() {
            "" => DEFAULT_CANCEL_REASON,
            r => r,
        };

        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(self.subscriptions_url(&[subscription_id, "cancel"])?)
            .bearer_auth(token)
            .json(&CancelPayload {
                reason_code: CANCEL_REASON_CODE,
                reason,
            })
            .send()
            .await?;
        Self::ensure_success(response, "cancel subscription").await?;

        info!("PayPal subscription cancelled: {}", subscription_id);
        Ok(())
    }
}
