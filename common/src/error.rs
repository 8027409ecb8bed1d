use actix_web::{HttpResponse, http::StatusCode};
use thiserror::Error;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CLIENT ERRORS ===
    #[error("{0}")]
    BadRequest(String),

    // === UPSTREAM ERRORS ===
    #[error("PayPal authentication failed: {0}")]
    Auth(String),

    #[error("{message}")]
    Gateway {
        status: Option<u16>,
        message: String,
    },

    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    #[error("Notification forwarding failed: {0}")]
    Forwarding(String),

    // === APPLICATION ERRORS ===
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Upstream failure with the status the upstream answered with.
    pub fn gateway(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Gateway {
            status,
            message: message.into(),
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Timeout(_) => true,
            AppError::Gateway { status, .. } => matches!(status, Some(500..=599) | None),
            _ => false,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Auth(_)
            | AppError::Gateway { .. }
            | AppError::Forwarding(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        let is_dev = cfg!(debug_assertions);
        let to_json = |err_msg: &str| serde_json::json!({ "success": false, "error": err_msg });

        match self {
            // === UPSTREAM ERRORS ===
            AppError::Auth(error) => {
                log::error!("PayPal token error: {}", error);
                HttpResponse::build(self.status_code()).json(to_json(&self.to_string()))
            }
            AppError::Gateway { status, message } => {
                log::error!(
                    "Gateway error (upstream status {:?}, retryable: {}): {}",
                    status,
                    self.is_retryable(),
                    message
                );
                HttpResponse::build(self.status_code()).json(to_json(message))
            }
            AppError::Timeout(error) => {
                log::warn!("Upstream timeout: {}", error);
                HttpResponse::build(self.status_code()).json(to_json(&self.to_string()))
            }
            AppError::Forwarding(error) => {
                log::warn!("Forwarding error reached a response: {}", error);
                HttpResponse::build(self.status_code()).json(to_json("Internal server error"))
            }

            // === APPLICATION ERRORS ===
            AppError::Internal(error) => {
                log::error!("Internal error: {}", error);
                let msg = if is_dev { error.as_str() } else { "Internal server error" };
                HttpResponse::build(self.status_code()).json(to_json(msg))
            }

            // === CLIENT ERRORS ===
            AppError::BadRequest(_) => {
                HttpResponse::build(self.status_code()).json(to_json(&self.to_string()))
            }
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            AppError::Timeout(error.to_string())
        } else {
            AppError::gateway(error.status().map(|s| s.as_u16()), error.to_string())
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}
