//! Router

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    checkout_summary, create_order, external_payment, generate_token, get_checkout, health_check,
    order_details, update_order, validate_credentials,
};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let bigcommerce = Router::new()
        .route("/validate", post(validate_credentials))
        .route("/checkout", post(get_checkout))
        .route("/checkout-summary", post(checkout_summary))
        .route("/token-generate", post(generate_token))
        .route("/order-create", post(create_order))
        .route("/order-details", post(order_details))
        .route("/order-update", post(update_order))
        .route("/external-payment", post(external_payment));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/bigcommerce", bigcommerce)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use checkout_flow::FlowConfig;
    use checkout_gateway::{Endpoint, SimulatedGateway};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const CHECKOUT: &str = "306d57d7-124e-4112-82cd-35e060c0d4d9";

    fn app(gateway: SimulatedGateway) -> (Router, Arc<SimulatedGateway>) {
        let gateway = Arc::new(gateway);
        let state = AppState::new(gateway.clone(), FlowConfig::default());
        (router(state), gateway)
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn checkout_body() -> Value {
        json!({"storeHash": "abc123", "accessToken": "tok", "checkoutId": CHECKOUT})
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(SimulatedGateway::new());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["gateway"], "SimulatedGateway");
    }

    #[tokio::test]
    async fn test_missing_fields_rejected_without_upstream_call() {
        let (app, gateway) = app(SimulatedGateway::new());
        let (status, body) = post_json(
            app,
            "/api/bigcommerce/order-create",
            json!({"storeHash": "abc123", "accessToken": "tok"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing required parameters"}));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (app, _) = app(SimulatedGateway::new());
        let (status, body) = post_json(
            app,
            "/api/bigcommerce/order-update",
            json!({"storeHash": "abc123", "accessToken": "tok", "orderId": 1, "orderData": {"status_id": "eleven"}}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required parameters");
    }

    #[tokio::test]
    async fn test_validate_mirrors_upstream_status() {
        let (ok_app, _) = app(SimulatedGateway::new());
        let creds = json!({"storeHash": "abc123", "accessToken": "tok"});
        let (status, body) = post_json(ok_app, "/api/bigcommerce/validate", creds.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (bad_app, _) = app(
            SimulatedGateway::new()
                .with_response(Endpoint::ValidateCredentials, 401, json!({"title": "Unauthorized"})),
        );
        let (status, body) = post_json(bad_app, "/api/bigcommerce/validate", creds).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"success": false, "error": "API Error: 401 Unauthorized"}));
    }

    #[tokio::test]
    async fn test_checkout_and_summary() {
        let (app_raw, _) = app(SimulatedGateway::new());
        let (status, body) = post_json(app_raw, "/api/bigcommerce/checkout", checkout_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], CHECKOUT);

        let (app_summary, _) = app(SimulatedGateway::new());
        let (status, body) =
            post_json(app_summary, "/api/bigcommerce/checkout-summary", checkout_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["grand_total"], "$118.95");
    }

    #[tokio::test]
    async fn test_token_generate_survives_upstream_failure() {
        let (app, _) = app(
            SimulatedGateway::new()
                .with_response(Endpoint::CreateCheckoutToken, 500, json!({"title": "boom"})),
        );
        let (status, body) = post_json(app, "/api/bigcommerce/token-generate", checkout_body()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["origin"], "locally_synthesized");
        assert!(body["token"].as_str().unwrap().contains("306d57d7"));
    }

    #[tokio::test]
    async fn test_order_create_error_mirrors_status_and_details() {
        let (app, _) = app(
            SimulatedGateway::new()
                .with_response(Endpoint::CreateOrder, 422, json!({"title": "Missing billing address"})),
        );
        let (status, body) = post_json(app, "/api/bigcommerce/order-create", checkout_body()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "API Error: 422 Unprocessable Entity");
        assert_eq!(body["details"]["title"], "Missing billing address");
    }

    #[tokio::test]
    async fn test_order_details_accepts_numeric_id() {
        let (app, _) = app(SimulatedGateway::new());
        let (status, body) = post_json(
            app,
            "/api/bigcommerce/order-details",
            json!({"storeHash": "abc123", "accessToken": "tok", "orderId": 123_456}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 123_456);
    }

    #[tokio::test]
    async fn test_order_update_echoes_fields() {
        let (app, _) = app(SimulatedGateway::new());
        let (status, body) = post_json(
            app,
            "/api/bigcommerce/order-update",
            json!({
                "storeHash": "abc123",
                "accessToken": "tok",
                "orderId": "555",
                "orderData": {
                    "payment_method": "ExternalPayment",
                    "payment_provider_id": "txn-9",
                    "status_id": 2
                }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status_id"], 2);
        assert_eq!(body["status"], "Shipped");
        assert_eq!(body["payment_provider_id"], "txn-9");
    }

    #[tokio::test]
    async fn test_order_update_forwards_unknown_status_id() {
        let (app, gateway) = app(SimulatedGateway::new());
        let (status, body) = post_json(
            app,
            "/api/bigcommerce/order-update",
            json!({
                "storeHash": "abc123",
                "accessToken": "tok",
                "orderId": 555,
                "orderData": {
                    "payment_method": "ExternalPayment",
                    "payment_provider_id": "txn-9",
                    "status_id": -1
                }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status_id"], -1);
        assert!(body["status"].is_null());
        assert_eq!(gateway.calls(), vec![Endpoint::UpdateOrder]);
    }

    #[tokio::test]
    async fn test_external_payment_missing_input_returns_init_failure() {
        let (app, gateway) = app(SimulatedGateway::new());
        let (status, body) = post_json(
            app,
            "/api/bigcommerce/external-payment",
            json!({"storeHash": "abc123", "accessToken": "tok"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["state"], "failed");
        assert_eq!(body["outcome"]["stage"], "init");
        assert!(body["log"].as_array().is_some_and(|l| !l.is_empty()));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_external_payment_completes() {
        let (app, gateway) = app(SimulatedGateway::new());
        let mut request = checkout_body();
        request["storeBaseUrl"] = json!("https://shop.test/");
        let (status, body) = post_json(app, "/api/bigcommerce/external-payment", request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "completed");
        assert_eq!(body["outcome"]["token"], "demo-token-306d57d7");
        let url = body["outcome"]["confirmation_url"].as_str().unwrap();
        assert!(url.starts_with("https://shop.test/checkout/order-confirmation/"));
        assert!(url.ends_with("?t=demo-token-306d57d7"));
        assert_eq!(gateway.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_external_payment_failure_returns_log() {
        let (app, gateway) = app(
            SimulatedGateway::new().with_response(Endpoint::CreateOrder, 422, json!({"title": "nope"})),
        );
        let (status, body) =
            post_json(app, "/api/bigcommerce/external-payment", checkout_body()).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["outcome"]["stage"], "order-create");
        assert!(body["log"].as_array().is_some_and(|l| !l.is_empty()));
        assert!(!gateway.was_called(Endpoint::UpdateOrder));
    }
}
