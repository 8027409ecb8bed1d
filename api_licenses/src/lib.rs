//! Stand-ins for the license services the extension was built against.
//! Every endpoint answers success with the third party's response shape.

use actix_web::web::{self};
use serde_json::{Map, Value};

pub mod routes {
    pub mod key;
    pub mod license;
}

pub fn mount_lemonsqueezy() -> actix_web::Scope {
    web::scope("/lemonsqueezy")
        .service(routes::license::post_activate)
        .service(routes::license::post_validate)
}

pub fn mount_gumroad() -> actix_web::Scope {
    web::scope("/gumroad").service(routes::license::post_verify)
}

/// Request body as JSON whether it came as JSON or as a form. Anything else,
/// including an empty body, becomes an empty object.
pub(crate) fn parse_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Object(Map::new());
    }
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        return value;
    }
    let form: Map<String, Value> = url::form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    Value::Object(form)
}
