use actix_web::{Responder, post, web};
use chrono::Utc;
use common::{error::Res, http::Success};
use log::info;
use serde_json::{Value, json};

use crate::parse_body;

/// Mimics Lemon Squeezy `POST /v1/licenses/activate`.
///
/// # Input
/// - `body`: JSON or form with `license_key` (anything else is ignored)
///
/// # Output
/// - `{ activated: true, license_key: { status: "active", key }, meta: {} }`,
///   where `key` echoes the submitted `license_key` (null when absent)
#[post("/activate")]
pub async fn post_activate(body: web::Bytes) -> Res<impl Responder> {
    let body = parse_body(&body);
    info!("[LemonSqueezy Activate] {}", body);

    let key = body.get("license_key").cloned().unwrap_or(Value::Null);
    Success::raw(json!({
        "activated": true,
        "license_key": { "status": "active", "key": key },
        "meta": {}
    }))
}

/// Mimics Lemon Squeezy `POST /v1/licenses/validate`. Always valid.
#[post("/validate")]
pub async fn post_validate(body: web::Bytes) -> Res<impl Responder> {
    info!("[LemonSqueezy Validate] {}", parse_body(&body));
    Success::raw(json!({ "valid": true, "meta": {} }))
}

/// Mimics Gumroad `POST /v2/licenses/verify`. Always a fresh purchase.
#[post("/verify")]
pub async fn post_verify(body: web::Bytes) -> Res<impl Responder> {
    info!("[Gumroad Verify] {}", parse_body(&body));
    Success::raw(json!({
        "success": true,
        "purchase": {
            "email": "activated@example.com",
            "created_at": Utc::now().to_rfc3339()
        }
    }))
}
