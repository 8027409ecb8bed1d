use base64::{Engine, engine::general_purpose};
use common::{
    env_config::PayPalConfig,
    error::{AppError, Res},
};
use log::{info, warn};
use reqwest::{Client, header};
use url::Url;

use crate::models::{PayPalErrorBody, TokenResponse};

/// Exchanges the REST app credentials for a bearer token.
///
/// Tokens are not cached: every billing call asks for a fresh one. That
/// costs one extra round trip per call, which is fine at the relay's volume.
pub struct TokenProvider {
    client: Client,
    token_url: Url,
    credential: String,
}

impl TokenProvider {
    pub fn new(config: &PayPalConfig, client: Client) -> Res<Self> {
        Ok(TokenProvider {
            client,
            token_url: crate::endpoint(&config.base_url, &["v1", "oauth2", "token"])?,
            credential: basic_credential(&config.client_id, &config.client_secret),
        })
    }

    /// Performs one `client_credentials` grant and returns the access token.
    ///
    /// Fails with `AppError::Auth` on any non-2xx answer or transport error,
    /// and with `AppError::Timeout` when the call exceeds the client timeout.
    /// Never retries.
    pub async fn access_token(&self) -> Res<String> {
        info!("Requesting PayPal access token from {}", self.token_url);
        let response = self
            .client
            .post(self.token_url.clone())
            .header(header::AUTHORIZATION, format!("Basic {}", self.credential))
            .header(header::ACCEPT, "application/json")
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!("PayPal token exchange: {}", e))
                } else {
                    AppError::Auth(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<PayPalErrorBody>(&body)
                .ok()
                .and_then(|b| b.summary())
                .unwrap_or_else(|| format!("token endpoint answered {}", status));
            warn!("PayPal token exchange failed ({}): {}", status, message);
            return Err(AppError::Auth(message));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!("PayPal token exchange: {}", e))
                } else {
                    AppError::Auth(format!("Unreadable token response: {}", e))
                }
            })?;
        Ok(token.access_token)
    }
}

/// Value of the `Basic` authorization header for `id:secret`.
fn basic_credential(client_id: &str, client_secret: &str) -> String {
    general_purpose::STANDARD.encode(format!("{}:{}", client_id, client_secret))
}
