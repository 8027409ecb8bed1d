use actix_web::web::{self};

pub mod proxy;
pub mod routes {
    pub mod chat;
}

pub use proxy::AiProxy;

/// Expects `web::Data<AiProxy>` in app data.
pub fn mount_ai() -> actix_web::Scope {
    web::scope("/ai").service(routes::chat::post_chat_completions)
}
