//! Simulated Gateway
//!
//! For demos and tests. Answers every endpoint the way a cooperative store
//! would, and individual endpoints can be scripted to fail, be unreachable or
//! respond slowly.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};

use checkout_core::{
    checkout::SAMPLE_CHECKOUT, CheckoutError, CheckoutId, CommerceGateway, OrderId, OrderStatus,
    OrderUpdate, Result, StoreCredentials, UpstreamResponse,
};

/// Endpoints a script can target
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ValidateCredentials,
    GetCheckout,
    CreateCheckoutToken,
    CreateOrder,
    GetOrder,
    UpdateOrder,
}

#[derive(Clone, Debug)]
enum Script {
    Respond(UpstreamResponse),
    Unreachable(String),
}

/// Simulated BigCommerce store
#[derive(Default)]
pub struct SimulatedGateway {
    scripts: HashMap<Endpoint, Script>,
    delays: HashMap<Endpoint, Duration>,
    calls: Mutex<Vec<Endpoint>>,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `endpoint` with a fixed status and body
    pub fn with_response(mut self, endpoint: Endpoint, status: u16, body: Value) -> Self {
        self.scripts
            .insert(endpoint, Script::Respond(UpstreamResponse::new(status, body)));
        self
    }

    /// Fail `endpoint` as if the network were down
    pub fn with_unreachable(mut self, endpoint: Endpoint) -> Self {
        self.scripts.insert(
            endpoint,
            Script::Unreachable(format!("simulated connection failure on {endpoint:?}")),
        );
        self
    }

    /// Sleep before answering `endpoint`
    pub fn with_delay(mut self, endpoint: Endpoint, delay: Duration) -> Self {
        self.delays.insert(endpoint, delay);
        self
    }

    /// Endpoints called so far, in order
    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn was_called(&self, endpoint: Endpoint) -> bool {
        self.calls().contains(&endpoint)
    }

    async fn dispatch(&self, endpoint: Endpoint, default: impl FnOnce() -> UpstreamResponse) -> Result<UpstreamResponse> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(endpoint);
        }

        if let Some(delay) = self.delays.get(&endpoint) {
            tokio::time::sleep(*delay).await;
        }

        match self.scripts.get(&endpoint) {
            Some(Script::Respond(response)) => Ok(response.clone()),
            Some(Script::Unreachable(reason)) => Err(CheckoutError::Transport(reason.clone())),
            None => Ok(default()),
        }
    }
}

/// Numeric ids go back out as JSON numbers, as the real API does
fn order_id_json(order_id: &OrderId) -> Value {
    order_id
        .as_str()
        .parse::<u64>()
        .map_or_else(|_| json!(order_id.as_str()), |n| json!(n))
}

fn sample_checkout(checkout_id: &CheckoutId) -> Value {
    let mut body: Value = serde_json::from_str(SAMPLE_CHECKOUT).unwrap_or_else(|_| json!({"data": {}}));
    body["data"]["id"] = json!(checkout_id.as_str());
    if body["data"]["cart"].is_object() {
        body["data"]["cart"]["id"] = json!(checkout_id.as_str());
    }
    body
}

#[async_trait]
impl CommerceGateway for SimulatedGateway {
    async fn validate_credentials(&self, credentials: &StoreCredentials) -> Result<UpstreamResponse> {
        let valid = credentials.validate().is_ok();
        self.dispatch(Endpoint::ValidateCredentials, || {
            if valid {
                UpstreamResponse::ok(json!({"data": {"inventory_count": 42, "variant_count": 12, "primary_category_name": "Terrariums"}}))
            } else {
                UpstreamResponse::new(401, json!({"status": 401, "title": "Unauthorized"}))
            }
        })
        .await
    }

    async fn get_checkout(
        &self,
        _credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<UpstreamResponse> {
        self.dispatch(Endpoint::GetCheckout, || UpstreamResponse::ok(sample_checkout(checkout_id)))
            .await
    }

    async fn create_checkout_token(
        &self,
        _credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<UpstreamResponse> {
        self.dispatch(Endpoint::CreateCheckoutToken, || {
            UpstreamResponse::ok(json!({
                "token": format!("demo-token-{}", checkout_id.prefix(8)),
                "_note": "This is a demo token for testing the payment middleware flow"
            }))
        })
        .await
    }

    async fn create_order(
        &self,
        _credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<UpstreamResponse> {
        self.dispatch(Endpoint::CreateOrder, || {
            let order_id: u32 = rand::thread_rng().gen_range(100_000..=999_999);
            let status = OrderStatus::Incomplete;
            UpstreamResponse::ok(json!({
                "data": {
                    "id": order_id,
                    "checkout_id": checkout_id.as_str(),
                    "status": { "id": status.id(), "label": status.label() },
                    "_note": "This is a mock order for demonstration purposes"
                },
                "meta": {}
            }))
        })
        .await
    }

    async fn get_order(
        &self,
        _credentials: &StoreCredentials,
        order_id: &OrderId,
    ) -> Result<UpstreamResponse> {
        self.dispatch(Endpoint::GetOrder, || {
            let status = OrderStatus::Incomplete;
            UpstreamResponse::ok(json!({
                "id": order_id_json(order_id),
                "status_id": status.id(),
                "status": status.label(),
                "payment_method": "",
                "currency_code": "USD",
                "total_inc_tax": "118.9500",
                "_note": "This is a mock order for demonstration purposes"
            }))
        })
        .await
    }

    async fn update_order(
        &self,
        _credentials: &StoreCredentials,
        order_id: &OrderId,
        update: &OrderUpdate,
    ) -> Result<UpstreamResponse> {
        self.dispatch(Endpoint::UpdateOrder, || {
            UpstreamResponse::ok(json!({
                "id": order_id_json(order_id),
                "status_id": update.status_id,
                "status": update.status().map(OrderStatus::label),
                "payment_method": update.payment_method,
                "payment_provider_id": update.payment_provider_id,
                "_note": "This is a mock order update for demonstration purposes"
            }))
        })
        .await
    }

    fn name(&self) -> &str {
        "SimulatedGateway"
    }
}
