use actix_web::{Responder, get, web};
use chrono::Utc;
use common::{error::Res, http::Success};
use serde_json::json;

/// Liveness page for the hosting platform.
#[get("/")]
async fn get_index() -> Res<impl Responder> {
    Success::raw(json!({
        "status": "running",
        "message": "PayPal subscription relay",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[get("/health")]
async fn get_health() -> Res<impl Responder> {
    Success::raw(json!({ "status": "healthy" }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_index).service(get_health);
}
