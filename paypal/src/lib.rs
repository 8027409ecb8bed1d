//! PayPal REST client: OAuth client-credentials token exchange and the three
//! billing subscription calls the relay needs.

pub mod billing;
pub mod models;
pub mod token;

pub use billing::{BillingGateway, DEFAULT_CANCEL_REASON, DEFAULT_SUBSCRIBER_NAME, PayPalClient};
#[cfg(any(test, feature = "mock"))]
pub use billing::MockBillingGateway;
pub use models::{CreatedSubscription, Subscriber, SubscriberName, Subscription, SubscriptionStatus};
pub use token::TokenProvider;

use url::Url;

/// `base` with its path replaced by `segments`, each segment percent-encoded.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> common::error::Res<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| common::error::AppError::Internal(format!("Invalid PayPal base URL: {}", base)))?
        .clear()
        .extend(segments);
    Ok(url)
}
