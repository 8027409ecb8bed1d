mod cors;
mod health;

use std::sync::Arc;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use api_ai::AiProxy;
use common::{env_config::Config, http::json_config};
use log::{info, warn};
use notifier::{AutomationNotifier, Notifier};
use paypal::{BillingGateway, PayPalClient};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup(&config.log_level, &config.log_file).expect("Failed to set up logger");
    }

    // one outbound client for PayPal, the automation endpoint and the AI provider
    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build HTTP client");

    let gateway: Arc<dyn BillingGateway> = Arc::new(
        PayPalClient::new(&config.paypal, client.clone()).expect("Failed to set up PayPal client"),
    );
    let notifier: Arc<dyn Notifier> = Arc::new(AutomationNotifier::new(
        client.clone(),
        config.automation_webhook_url.clone(),
    ));
    let ai_proxy = web::Data::new(AiProxy::new(client, config.ai.clone()));

    log_startup(&config);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::from(gateway.clone()))
            .app_data(web::Data::from(notifier.clone()))
            .app_data(ai_proxy.clone())
            .app_data(json_config())
            .wrap(logger::middleware(config_data.console_logging_enabled)) // 2nd
            .wrap(cors::middleware(origin.as_deref())) // 1st
            .configure(health::configure)
            .service(
                web::scope("/api")
                    .service(api_subs::mount_paypal())
                    .service(api_licenses::mount_lemonsqueezy())
                    .service(api_licenses::mount_gumroad())
                    .service(api_licenses::routes::key::post_get_api_key)
                    .service(api_ai::mount_ai()),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}

fn log_startup(config: &Config) {
    info!(
        "Relay listening on {}:{} ({} workers)",
        config.server_host, config.server_port, config.num_workers
    );
    info!("Environment: {}", config.environment);
    info!(
        "PayPal API: {} ({})",
        config.paypal.base_url,
        config.paypal.mode.as_str()
    );
    if !config.paypal.has_credentials() {
        warn!(
            "PayPal credentials not configured. Set PAYPAL_CLIENT_ID and PAYPAL_SECRET, \
             every PayPal call will fail until then."
        );
    }
    match &config.automation_webhook_url {
        Some(url) => info!("Forwarding webhook events to {}", url),
        None => warn!("AUTOMATION_WEBHOOK_URL not set, webhook events will not be forwarded"),
    }
    if config.is_production() && config.cors_allowed_origin.is_none() {
        warn!("CORS_ALLOWED_ORIGIN not set, accepting requests from any origin");
    }
    if config.ai.api_key.is_empty() {
        warn!("AI_API_KEY not set, /api/ai/chat/completions will answer 500");
    }
}
