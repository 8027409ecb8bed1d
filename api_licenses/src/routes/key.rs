use std::sync::Arc;

use actix_web::{Responder, post, web};
use chrono::{Duration, Utc};
use common::{env_config::Config, error::Res, http::Success};
use log::info;
use serde::Serialize;

use crate::parse_body;

const KEY_LIFETIME_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
    /// Unix seconds.
    pub expires: i64,
}

/// Hands the extension the key it uses for AI requests.
///
/// # Input
/// - `body`: Ignored apart from logging
///
/// # Output
/// - `{ success: true, api_key, expires }`, `expires` 30 days from now in
///   unix seconds
#[post("/get-api-key")]
pub async fn post_get_api_key(
    config: web::Data<Arc<Config>>,
    body: web::Bytes,
) -> Res<impl Responder> {
    info!("[API Key Request] {}", parse_body(&body));
    Success::ok(ApiKeyResponse {
        api_key: config.extension_api_key.clone(),
        expires: (Utc::now() + Duration::days(KEY_LIFETIME_DAYS)).timestamp(),
    })
}
