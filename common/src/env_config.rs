use std::{env, sync::Arc, time::Duration};

use url::Url;

pub const PAYPAL_SANDBOX_URL: &str = "https://api.sandbox.paypal.com";
pub const PAYPAL_LIVE_URL: &str = "https://api.paypal.com";
pub const DEFAULT_AI_API_URL: &str = "https://api.deepseek.com/chat/completions";

#[derive(Clone, Debug)]
/// Configuration struct for the relay.
///
/// Built once at startup and shared as `Arc<Config>`. Nothing below the
/// `core` crate reads the process environment; every client that needs a
/// setting receives it from here.
pub struct Config {
    // development or production
    pub environment: String,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS. `None` accepts any origin, which the
    /// browser extension needs since its origin is an extension id.
    pub cors_allowed_origin: Option<String>,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    pub log_level: String,
    pub log_file: String,
    /// Upper bound for every outbound HTTP call.
    pub http_timeout: Duration,
    /// PayPal REST credentials and base URL.
    pub paypal: PayPalConfig,
    /// Workflow automation endpoint. `None` disables forwarding.
    pub automation_webhook_url: Option<Url>,
    /// Upstream for the AI completion proxy.
    pub ai: AiProxyConfig,
    /// Key handed to the extension by `/api/get-api-key`.
    pub extension_api_key: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayPalMode {
    Sandbox,
    Live,
}

impl PayPalMode {
    /// Live mode is only selected for the `production` environment.
    pub fn from_environment(environment: &str) -> Self {
        if environment.eq_ignore_ascii_case("production") {
            PayPalMode::Live
        } else {
            PayPalMode::Sandbox
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            PayPalMode::Sandbox => PAYPAL_SANDBOX_URL,
            PayPalMode::Live => PAYPAL_LIVE_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayPalMode::Sandbox => "sandbox",
            PayPalMode::Live => "live",
        }
    }
}

#[derive(Clone, Debug)]
/// `PayPalConfig` holds what the token provider and the billing gateway need
/// to reach the PayPal REST API.
pub struct PayPalConfig {
    /// REST app client id.
    pub client_id: String,
    /// REST app secret.
    pub client_secret: String,
    pub mode: PayPalMode,
    /// Base URL, normally derived from `mode`.
    pub base_url: Url,
}

impl PayPalConfig {
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct AiProxyConfig {
    pub api_key: String,
    pub api_url: Url,
    /// Model name substituted into every proxied request.
    pub model: String,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Loads `.env` first, then reads every setting with a default, so the
    /// relay boots without any configuration (PayPal calls will then fail
    /// with an authentication error, and a warning is logged at startup).
    ///
    /// # Environment Variables
    ///
    /// - `PAYPAL_CLIENT_ID`, `PAYPAL_SECRET`: PayPal REST credentials
    /// - `ENVIRONMENT`: `production` selects the live PayPal API (default: "development")
    /// - `PAYPAL_API_URL`: Overrides the PayPal base URL
    /// - `IP`: Server host (default: "0.0.0.0")
    /// - `PORT`: Server port (default: 3000)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: any)
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_LEVEL`, `LOG_FILE`: Logger level and file (default: "info", "relay.log")
    /// - `HTTP_TIMEOUT_SECS`: Outbound call timeout (default: 10)
    /// - `AUTOMATION_WEBHOOK_URL`: Automation endpoint (default: disabled)
    /// - `AI_API_KEY`, `AI_API_URL`, `AI_MODEL`: AI proxy upstream
    /// - `EXTENSION_API_KEY`: Key returned by `/api/get-api-key`
    ///
    /// # Panics
    ///
    /// This function will panic if one of the URL settings is present but
    /// cannot be parsed.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();
        Arc::new(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Builds the configuration from any key/value source. `from_env` passes
    /// the process environment; tests pass a closure.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let mode = PayPalMode::from_environment(&environment);
        let paypal_base_url =
            var("PAYPAL_API_URL").unwrap_or_else(|| mode.default_base_url().to_string());

        Config {
            server_host: var("IP").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: var("PORT").and_then(|s| s.parse().ok()).unwrap_or(3000),
            num_workers: var("WORKERS").and_then(|s| s.parse().ok()).unwrap_or(4),
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN").filter(|s| s.trim() != "*"),
            console_logging_enabled: var("ENABLE_CONSOLE_LOGGING")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(true),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_file: var("LOG_FILE").unwrap_or_else(|| "relay.log".to_string()),
            http_timeout: Duration::from_secs(
                var("HTTP_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            paypal: PayPalConfig {
                client_id: var("PAYPAL_CLIENT_ID").unwrap_or_default(),
                client_secret: var("PAYPAL_SECRET").unwrap_or_default(),
                mode,
                base_url: Url::parse(&paypal_base_url).expect("PAYPAL_API_URL must be a valid URL"),
            },
            automation_webhook_url: var("AUTOMATION_WEBHOOK_URL")
                .map(|s| Url::parse(&s).expect("AUTOMATION_WEBHOOK_URL must be a valid URL")),
            ai: AiProxyConfig {
                api_key: var("AI_API_KEY").unwrap_or_default(),
                api_url: Url::parse(
                    &var("AI_API_URL").unwrap_or_else(|| DEFAULT_AI_API_URL.to_string()),
                )
                .expect("AI_API_URL must be a valid URL"),
                model: var("AI_MODEL").unwrap_or_else(|| "deepseek-chat".to_string()),
            },
            extension_api_key: var("EXTENSION_API_KEY")
                .unwrap_or_else(|| "sk-relay-placeholder".to_string()),
            environment,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}
