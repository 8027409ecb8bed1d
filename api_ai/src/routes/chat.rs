use actix_web::{HttpResponse, Responder, http::StatusCode, post, web};
use common::error::{AppError, Res};
use serde_json::Value;

use crate::proxy::AiProxy;

/// OpenAI-style chat completion, answered by the configured AI provider.
///
/// # Input
/// - `req`: Chat completion request (`messages`, `temperature`, ...). `model`
///   is always replaced by the server's model
///
/// # Output
/// - The provider's status code and body, unchanged
/// - Error: 400 for a non-object body, 500 when no AI key is configured,
///   504 when the provider does not answer in time
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch(`${API_BASE}/api/ai/chat/completions`, {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({ messages: [{ role: 'user', content: 'Write a post about...' }] })
/// });
/// const completion = await response.json();
/// console.log(completion.choices[0].message.content);
/// ```
#[post("/chat/completions")]
pub async fn post_chat_completions(
    proxy: web::Data<AiProxy>,
    req: web::Json<Value>,
) -> Res<impl Responder> {
    let upstream = proxy.forward(req.into_inner()).await?;

    let status = StatusCode::from_u16(upstream.status)
        .map_err(|e| AppError::Internal(format!("Invalid upstream status: {}", e)))?;
    let mut response = HttpResponse::build(status);
    if let Some(content_type) = upstream.content_type {
        response.content_type(content_type);
    }
    Ok(response.body(upstream.body))
}
