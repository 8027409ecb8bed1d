use common::{
    env_config::AiProxyConfig,
    error::{AppError, Res},
};
use log::{info, warn};
use reqwest::{Client, header};
use serde_json::Value;

/// Upstream answer, relayed to the caller as is.
#[derive(Debug)]
pub struct ProxiedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Forwards chat-completion requests with the server's key and model, so
/// the extension never holds the AI provider key.
pub struct AiProxy {
    client: Client,
    config: AiProxyConfig,
}

impl AiProxy {
    pub fn new(client: Client, config: AiProxyConfig) -> Self {
        AiProxy { client, config }
    }

    pub async fn forward(&self, mut request: Value) -> Res<ProxiedResponse> {
        if self.config.api_key.is_empty() {
            return Err(AppError::Internal("AI_API_KEY is not configured".to_string()));
        }
        let Some(fields) = request.as_object_mut() else {
            return Err(AppError::BadRequest(
                "Request body must be a JSON object".to_string(),
            ));
        };
        fields.insert("model".to_string(), Value::String(self.config.model.clone()));

        let response = self
            .client
            .post(self.config.api_url.clone())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!("AI completion relayed ({})", status);
        } else {
            warn!("AI upstream answered {}", status);
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(ProxiedResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
