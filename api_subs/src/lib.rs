use actix_web::web::{self};

pub mod routes {
    pub mod sub;
    pub mod webhook;
}

mod services {
    pub(crate) mod sub;
    pub(crate) mod webhook;
}

mod dtos {
    pub(crate) mod sub;
}

mod models {
    pub(crate) mod event;
}

/// Largest webhook body read; anything bigger is acknowledged unread.
pub const WEBHOOK_PAYLOAD_LIMIT: usize = 1 << 20;

/// Routes the extension and PayPal talk to. Handlers expect
/// `web::Data<dyn BillingGateway>` and `web::Data<dyn Notifier>` in app data.
pub fn mount_paypal() -> actix_web::Scope {
    web::scope("/paypal")
        .app_data(web::PayloadConfig::new(WEBHOOK_PAYLOAD_LIMIT))
        .service(routes::sub::post_create_subscription)
        .service(routes::sub::post_validate_subscription)
        .service(routes::sub::post_cancel_subscription)
        .service(routes::sub::post_subscription_status)
        .service(routes::webhook::post_webhook)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use common::{error::AppError, http::json_config};
    use notifier::{MockNotifier, NotificationRecord, Notifier};
    use paypal::{
        BillingGateway, CreatedSubscription, MockBillingGateway, Subscriber, SubscriberName,
        Subscription, SubscriptionStatus,
    };
    use serde_json::{Value, json};

    use super::*;

    macro_rules! app {
        ($gateway:expr, $notifier:expr) => {
            test::init_service(
                App::new()
                    .app_data(json_config())
                    .app_data(web::Data::from(Arc::new($gateway) as Arc<dyn BillingGateway>))
                    .app_data(web::Data::from(Arc::new($notifier) as Arc<dyn Notifier>))
                    .service(web::scope("/api").service(mount_paypal())),
            )
            .await
        };
    }

    macro_rules! post {
        ($app:expr, $path:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri($path)
                .set_json($body)
                .to_request();
            let resp = test::call_service(&$app, req).await;
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            (status, body)
        }};
    }

    fn subscription(id: &str, status: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            plan_id: Some("P-1".to_string()),
            status: SubscriptionStatus::from(status.to_string()),
            subscriber: Some(Subscriber {
                name: Some(SubscriberName {
                    given_name: Some("Ada".to_string()),
                    surname: Some("Lovelace".to_string()),
                }),
                email_address: Some("a@b.com".to_string()),
                payer_id: None,
            }),
            billing_cycles: None,
            billing_info: Some(json!({"cycle_executions": [], "next_billing_time": "2025-02-01T10:00:00Z"})),
            created_at: Some("2025-01-01T10:00:00Z".to_string()),
        }
    }

    fn quiet_notifier() -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();
        notifier
    }

    #[actix_web::test]
    async fn create_returns_id_and_approval_link() {
        let mut gateway = MockBillingGateway::new();
        gateway
            .expect_create_subscription()
            .withf(|plan: &str, email: &str, name: &str| {
                plan == "P-1" && email == "a@b.com" && name == "Customer"
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(CreatedSubscription {
                    id: "I-1".to_string(),
                    approval_link: Some("https://x/approve".to_string()),
                })
            });
        let app = app!(gateway, quiet_notifier());

        let (status, body) = post!(
            app,
            "/api/paypal/create-subscription",
            json!({"planId": "P-1", "subscriberEmail": "a@b.com"})
        );

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": true, "subscriptionId": "I-1", "approvalLink": "https://x/approve"})
        );
    }

    #[actix_web::test]
    async fn create_without_approval_link_omits_it() {
        let mut gateway = MockBillingGateway::new();
        gateway.expect_create_subscription().returning(|_, _, _| {
            Ok(CreatedSubscription {
                id: "I-2".to_string(),
                approval_link: None,
            })
        });
        let app = app!(gateway, quiet_notifier());

        let (status, body) = post!(
            app,
            "/api/paypal/create-subscription",
            json!({"planId": "P-1", "subscriberEmail": "a@b.com", "subscriberName": "Ada"})
        );

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "subscriptionId": "I-2"}));
    }

    #[actix_web::test]
    async fn create_rejects_missing_fields_before_calling_paypal() {
        let mut gateway = MockBillingGateway::new();
        gateway.expect_create_subscription().never();
        let app = app!(gateway, quiet_notifier());

        let (status, body) = post!(app, "/api/paypal/create-subscription", json!({}));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"success": false, "error": "Missing required fields: planId, subscriberEmail"})
        );

        let (status, body) = post!(
            app,
            "/api/paypal/create-subscription",
            json!({"planId": "P-1", "subscriberEmail": ""})
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: subscriberEmail");
    }

    #[actix_web::test]
    async fn create_passes_non_empty_values_verbatim() {
        let mut gateway = MockBillingGateway::new();
        gateway
            .expect_create_subscription()
            .withf(|plan: &str, email: &str, _: &str| plan == "P-1" && email == " ")
            .times(1)
            .returning(|_, _, _| {
                Ok(CreatedSubscription {
                    id: "I-3".to_string(),
                    approval_link: None,
                })
            });
        let app = app!(gateway, quiet_notifier());

        let (status, body) = post!(
            app,
            "/api/paypal/create-subscription",
            json!({"planId": "P-1", "subscriberEmail": " "})
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subscriptionId"], "I-3");
    }

    #[actix_web::test]
    async fn malformed_json_uses_error_shape() {
        let mut gateway = MockBillingGateway::new();
        gateway.expect_create_subscription().never();
        let app = app!(gateway, quiet_notifier());

        let req = test::TestRequest::post()
            .uri("/api/paypal/create-subscription")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }

    #[actix_web::test]
    async fn validate_returns_subscription() {
        let mut gateway = MockBillingGateway::new();
        gateway
            .expect_get_subscription()
            .withf(|id: &str| id == "I-1")
            .times(1)
            .returning(|id| Ok(subscription(id, "ACTIVE")));
        let app = app!(gateway, quiet_notifier());

        let (status, body) = post!(
            app,
            "/api/paypal/validate-subscription",
            json!({"subscriptionId": "I-1"})
        );

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let sub = &body["subscription"];
        assert_eq!(sub["id"], "I-1");
        assert_eq!(sub["status"], "ACTIVE");
        assert_eq!(sub["planId"], "P-1");
        assert_eq!(sub["createdAt"], "2025-01-01T10:00:00Z");
        assert_eq!(sub["subscriber"]["email_address"], "a@b.com");
        assert_eq!(sub["billingCycles"], Value::Null);
        assert_eq!(sub["billingInfo"]["next_billing_time"], "2025-02-01T10:00:00Z");
    }

    #[actix_web::test]
    async fn validate_is_repeatable() {
        let mut gateway = MockBillingGateway::new();
        gateway
            .expect_get_subscription()
            .times(2)
            .returning(|id| Ok(subscription(id, "APPROVAL_PENDING")));
        let app = app!(gateway, quiet_notifier());

        let first = post!(app, "/api/paypal/validate-subscription", json!({"subscriptionId": "I-1"}));
        let second = post!(app, "/api/paypal/validate-subscription", json!({"subscriptionId": "I-1"}));
        assert_eq!(first, second);
        assert_eq!(first.1["subscription"]["status"], "APPROVAL_PENDING");
    }

    #[actix_web::test]
    async fn validate_requires_subscription_id() {
        let mut gateway = MockBillingGateway::new();
        gateway.expect_get_subscription().never();
        let app = app!(gateway, quiet_notifier());

        let (status, body) = post!(app, "/api/paypal/validate-subscription", json!({"subscriptionId": ""}));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "Missing subscriptionId"}));
    }

    #[actix_web::test]
    async fn upstream_timeout_is_504() {
        let mut gateway = MockBillingGateway::new();
        gateway
            .expect_get_subscription()
            .returning(|_| Err(AppError::Timeout("PayPal did not answer".to_string())));
        let app = app!(gateway, quiet_notifier());

        let (status, body) = post!(app, "/api/paypal/validate-subscription", json!({"subscriptionId": "I-1"}));
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn second_cancel_surfaces_provider_error() {
        let mut gateway = MockBillingGateway::new();
        let mut already_cancelled = false;
        gateway
            .expect_cancel_subscription()
            .withf(|id: &str, reason: &str| id == "I-1" && reason == "User requested cancellation")
            .times(2)
            .returning(move |_, _| {
                if already_cancelled {
                    Err(AppError::gateway(
                        Some(422),
                        "PayPal cancel subscription failed (422): SUBSCRIPTION_STATUS_INVALID",
                    ))
                } else {
                    already_cancelled = true;
                    Ok(())
                }
            });
        let app = app!(gateway, quiet_notifier());

        let (status, body) = post!(app, "/api/paypal/cancel-subscription", json!({"subscriptionId": "I-1"}));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": true, "message": "Subscription cancelled successfully"})
        );

        let (status, body) = post!(app, "/api/paypal/cancel-subscription", json!({"subscriptionId": "I-1"}));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("SUBSCRIPTION_STATUS_INVALID"));
    }

    #[actix_web::test]
    async fn cancel_passes_custom_reason() {
        let mut gateway = MockBillingGateway::new();
        gateway
            .expect_cancel_subscription()
            .withf(|id: &str, reason: &str| id == "I-1" && reason == "Too expensive")
            .times(1)
            .returning(|_, _| Ok(()));
        let app = app!(gateway, quiet_notifier());

        let (status, _) = post!(
            app,
            "/api/paypal/cancel-subscription",
            json!({"subscriptionId": "I-1", "reason": "Too expensive"})
        );
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn status_reports_entitlement() {
        let mut gateway = MockBillingGateway::new();
        gateway
            .expect_get_subscription()
            .returning(|id| Ok(subscription(id, if id == "I-1" { "APPROVAL_PENDING" } else { "SUSPENDED" })));
        let app = app!(gateway, quiet_notifier());

        let (_, pending) = post!(app, "/api/paypal/subscription-status", json!({"subscriptionId": "I-1"}));
        assert_eq!(
            pending,
            json!({"success": true, "subscriptionId": "I-1", "status": "APPROVAL_PENDING", "isActive": true})
        );

        let (_, suspended) = post!(app, "/api/paypal/subscription-status", json!({"subscriptionId": "I-2"}));
        assert_eq!(suspended["isActive"], false);
    }

    #[actix_web::test]
    async fn webhook_forwards_cancellation_once() {
        let mut gateway = MockBillingGateway::new();
        gateway.expect_get_subscription().never();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|event_type: &str, record: &NotificationRecord| {
                event_type == "SUBSCRIPTION_CANCELLED"
                    && record.subscription_id.as_deref() == Some("I-1")
                    && record.action.is_none()
            })
            .times(1)
            .return_const(());
        let app = app!(gateway, notifier);

        let (status, body) = post!(
            app,
            "/api/paypal/webhook",
            json!({"event_type": "BILLING.SUBSCRIPTION.CANCELLED", "resource": {"id": "I-1"}})
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"received": true}));
    }

    #[actix_web::test]
    async fn webhook_activation_asks_for_license_key() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|event_type: &str, record: &NotificationRecord| {
                event_type == "SUBSCRIPTION_ACTIVATED"
                    && record.action.as_deref() == Some("send_license_key")
                    && record.email.as_deref() == Some("a@b.com")
            })
            .times(1)
            .return_const(());
        let app = app!(MockBillingGateway::new(), notifier);

        let (status, _) = post!(
            app,
            "/api/paypal/webhook",
            json!({
                "event_type": "BILLING.SUBSCRIPTION.ACTIVATED",
                "resource": {
                    "id": "I-1",
                    "status": "ACTIVE",
                    "subscriber": {"email_address": "a@b.com", "name": {"given_name": "Ada"}}
                }
            })
        );
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn webhook_acknowledges_unknown_and_malformed_events() {
        let app = app!(MockBillingGateway::new(), quiet_notifier());

        let (status, body) = post!(
            app,
            "/api/paypal/webhook",
            json!({"event_type": "BILLING.PLAN.ACTIVATED", "resource": {"id": "P-1"}})
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"received": true}));

        let req = test::TestRequest::post()
            .uri("/api/paypal/webhook")
            .set_payload("definitely not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"received": true}));
    }

    #[actix_web::test]
    async fn webhook_forwards_activation_with_badly_typed_name() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|event_type: &str, record: &NotificationRecord| {
                event_type == "SUBSCRIPTION_ACTIVATED"
                    && record.subscription_id.as_deref() == Some("I-1")
                    && record.action.as_deref() == Some("send_license_key")
                    && record.email.as_deref() == Some("a@b.com")
                    && record.name.is_none()
            })
            .times(1)
            .return_const(());
        let app = app!(MockBillingGateway::new(), notifier);

        let (status, body) = post!(
            app,
            "/api/paypal/webhook",
            json!({
                "event_type": "BILLING.SUBSCRIPTION.ACTIVATED",
                "resource": {
                    "id": "I-1",
                    "subscriber": {"name": "Ada Lovelace", "email_address": "a@b.com"}
                }
            })
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"received": true}));
    }

    #[actix_web::test]
    async fn webhook_forwards_known_event_with_null_resource() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|event_type: &str, _: &NotificationRecord| event_type == "SUBSCRIPTION_EXPIRED")
            .times(1)
            .return_const(());
        let app = app!(MockBillingGateway::new(), notifier);

        let (status, _) = post!(
            app,
            "/api/paypal/webhook",
            json!({"event_type": "BILLING.SUBSCRIPTION.EXPIRED", "resource": null})
        );
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn webhook_reads_bodies_above_the_default_limit() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|event_type: &str, record: &NotificationRecord| {
                event_type == "SUBSCRIPTION_CANCELLED"
                    && record.subscription_id.as_deref() == Some("I-1")
            })
            .times(1)
            .return_const(());
        let app = app!(MockBillingGateway::new(), notifier);

        let (status, _) = post!(
            app,
            "/api/paypal/webhook",
            json!({
                "event_type": "BILLING.SUBSCRIPTION.CANCELLED",
                "summary": "x".repeat(512 * 1024),
                "resource": {"id": "I-1"}
            })
        );
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn webhook_acknowledges_oversized_body_unread() {
        let app = app!(MockBillingGateway::new(), quiet_notifier());

        let req = test::TestRequest::post()
            .uri("/api/paypal/webhook")
            .insert_header(("content-type", "application/json"))
            .set_payload(vec![b' '; 2 * WEBHOOK_PAYLOAD_LIMIT])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"received": true}));
    }

    #[actix_web::test]
    async fn webhook_answers_while_automation_endpoint_hangs() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let _held = listener.accept();
            std::thread::sleep(std::time::Duration::from_secs(30));
        });

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap();
        let url = url::Url::parse(&format!("http://{}/hook", addr)).unwrap();
        let app = app!(
            MockBillingGateway::new(),
            notifier::AutomationNotifier::new(client, Some(url))
        );

        let (status, body) = post!(
            app,
            "/api/paypal/webhook",
            json!({"event_type": "BILLING.SUBSCRIPTION.CANCELLED", "resource": {"id": "I-1"}})
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"received": true}));
    }
}
