use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

use payflow_core::error::AppError;
use payflow_core::mapping::MappingSchema;
use payflow_core::services::partner;
use payflow_core::services::retry::RetryPolicy;

fn schema_for(url: &str) -> MappingSchema {
    MappingSchema::parse(&json!({
        "request": {
            "url": format!("{}/v1/charges", url),
            "method": "POST",
            "headers": {"Authorization": "Bearer {{credentials.api_key}}"},
            "body": {
                "external_id": "{{transaction_id}}",
                "amount": "{{amount}}",
                "payer_email": "{{customer.email}}",
                "callback_url": "{{callback_url}}"
            }
        },
        "response_mapping": {
            "payment_url": "data.checkout_url",
            "partner_transaction_id": "data.charge_id",
            "qr_data": "data.qr_string"
        }
    }))
    .expect("schema parses")
}

fn context() -> serde_json::Value {
    json!({
        "transaction_id": "TRX100",
        "amount": 50000,
        "customer": {"email": "a@b.com", "name": "A", "phone": null},
        "description": "Payment for TRX100",
        "credentials": {"api_key": "sk-test-123"},
        "callback_url": "http://localhost:3000/api/payments/webhook",
        "return_url": "http://localhost:3000/api/payments/status/TRX100",
    })
}

#[tokio::test]
async fn test_dynamic_partner_call_builds_and_parses() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/charges")
        .match_header("Authorization", "Bearer sk-test-123")
        .match_body(Matcher::Json(json!({
            "external_id": "TRX100",
            "amount": "50000",
            "payer_email": "a@b.com",
            "callback_url": "http://localhost:3000/api/payments/webhook"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": {
                    "charge_id": "ch_789",
                    "checkout_url": "https://pay.partner.test/ch_789",
                    "qr_string": "00020101021226..."
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let schema = schema_for(&server.url());

    let affordances =
        partner::dynamic_affordances(&client, &schema, &context(), &RetryPolicy::once())
            .await
            .expect("partner call");

    mock.assert_async().await;
    assert_eq!(
        affordances.payment_url.as_deref(),
        Some("https://pay.partner.test/ch_789")
    );
    assert_eq!(affordances.partner_transaction_id.as_deref(), Some("ch_789"));
    assert_eq!(affordances.qr_data.as_deref(), Some("00020101021226..."));
    assert_eq!(affordances.virtual_account, None);
}

#[tokio::test]
async fn test_unmapped_fields_stay_absent() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/v1/charges")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": {"charge_id": "ch_1"}}).to_string())
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let schema = schema_for(&server.url());

    let affordances =
        partner::dynamic_affordances(&client, &schema, &context(), &RetryPolicy::once())
            .await
            .unwrap();

    // checkout_url path is mapped but absent from the response
    assert_eq!(affordances.payment_url, None);
    assert_eq!(affordances.partner_transaction_id.as_deref(), Some("ch_1"));
}

#[tokio::test]
async fn test_partner_error_status_surfaces_as_partner_api_error() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/v1/charges")
        .with_status(500)
        .with_body("internal error")
        .expect_at_least(1)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let schema = schema_for(&server.url());

    let result =
        partner::dynamic_affordances(&client, &schema, &context(), &RetryPolicy::once()).await;

    match result {
        Err(AppError::PartnerApi(message)) => assert!(message.contains("500")),
        other => panic!("expected PartnerApi error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_unreachable_partner_is_partner_api_error() {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let schema = schema_for("http://127.0.0.1:1");

    let result =
        partner::dynamic_affordances(&client, &schema, &context(), &RetryPolicy::once()).await;
    assert!(matches!(result, Err(AppError::PartnerApi(_))));
}

#[tokio::test]
async fn test_retry_policy_applies_to_partner_call() {
    let mut server = Server::new_async().await;
    let _down = server
        .mock("POST", "/v1/charges")
        .with_status(502)
        .expect(1)
        .create_async()
        .await;
    let _up = server
        .mock("POST", "/v1/charges")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": {"charge_id": "ch_2"}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let schema = schema_for(&server.url());
    let retry = RetryPolicy::new(2, Duration::from_millis(10));

    let affordances = partner::dynamic_affordances(&client, &schema, &context(), &retry)
        .await
        .expect("second attempt succeeds");
    assert_eq!(affordances.partner_transaction_id.as_deref(), Some("ch_2"));
}
