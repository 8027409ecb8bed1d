use actix_web::{Responder, post, web};
use common::{error::Res, http::Success};
use log::warn;
use notifier::Notifier;
use serde_json::json;

use crate::services;

/// Receives PayPal webhook events and forwards lifecycle changes to the
/// automation endpoint.
///
/// # Input
/// - `body`: Raw event, `{ id, event_type, resource, ... }`
///
/// # Output
/// - Always 200 `{ received: true }`, whatever happened to the event, so
///   PayPal never retries because of a forwarding problem. A body over the
///   scope's payload limit is dropped and still acknowledged
///
/// # Note
/// Not called by the extension. Register
/// `https://yourapp.com/api/paypal/webhook` in the PayPal developer dashboard
/// for the `BILLING.SUBSCRIPTION.*` and `PAYMENT.CAPTURE.*` events.
#[post("/webhook")]
pub async fn post_webhook(
    notifier: web::Data<dyn Notifier>,
    body: Option<web::Bytes>,
) -> Res<impl Responder> {
    match body {
        Some(body) => {
            services::webhook::ingest(notifier.get_ref(), &body).await;
        }
        None => warn!("Unreadable PayPal webhook payload (too large or interrupted)"),
    }
    Success::raw(json!({ "received": true }))
}
