//! BigCommerce API Gateway
//!
//! Implementation of `CommerceGateway` against the live REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, Method, RequestBuilder, Url,
};

use checkout_core::{
    CheckoutError, CheckoutId, CommerceGateway, OrderId, OrderUpdate, Result, StoreCredentials,
    UpstreamResponse,
};

use crate::config::GatewayConfig;

const AUTH_HEADER: &str = "X-Auth-Token";

/// Live BigCommerce gateway
pub struct RealGateway {
    client: Client,
    api_base: Url,
}

impl RealGateway {
    /// Create a gateway for a custom API origin
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .map_err(|e| CheckoutError::Config(format!("invalid API base '{api_base}': {e}")))?;
        if api_base.cannot_be_a_base() {
            return Err(CheckoutError::Config(format!(
                "API base '{api_base}' cannot carry a path"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CheckoutError::Config(e.to_string()))?;

        Ok(Self { client, api_base })
    }

    /// Create from configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Self::new(&config.api_base, Duration::from_secs(config.timeout_secs))
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(&GatewayConfig::from_env()?)
    }

    /// `{base}/stores/{hash}/{segments...}`, each segment percent-encoded
    fn store_url(&self, credentials: &StoreCredentials, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| CheckoutError::Config("API base cannot carry a path".into()))?
            .pop_if_empty()
            .push("stores")
            .push(&credentials.store_hash)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, credentials: &StoreCredentials) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTH_HEADER, &credentials.access_token)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
    }

    /// Send and decode, keeping non-JSON bodies as strings
    async fn send(request: RequestBuilder) -> Result<UpstreamResponse> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CheckoutError::Transport(format!("request timed out: {e}"))
            } else {
                CheckoutError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        };

        if !(200..300).contains(&status) {
            tracing::warn!(status, "BigCommerce API returned an error status");
        }
        Ok(UpstreamResponse::new(status, body))
    }
}

#[async_trait]
impl CommerceGateway for RealGateway {
    async fn validate_credentials(&self, credentials: &StoreCredentials) -> Result<UpstreamResponse> {
        let url = self.store_url(credentials, &["v3", "catalog", "summary"])?;
        Self::send(self.request(Method::GET, url, credentials)).await
    }

    async fn get_checkout(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<UpstreamResponse> {
        let url = self.store_url(credentials, &["v3", "checkouts", checkout_id.as_str()])?;
        Self::send(self.request(Method::GET, url, credentials)).await
    }

    async fn create_checkout_token(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<UpstreamResponse> {
        let url = self.store_url(credentials, &["v3", "checkouts", checkout_id.as_str(), "token"])?;
        // The endpoint requires a JSON body, even an empty one
        let request = self
            .request(Method::POST, url, credentials)
            .json(&serde_json::json!({}));
        Self::send(request).await
    }

    async fn create_order(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<UpstreamResponse> {
        let url = self.store_url(credentials, &["v3", "checkouts", checkout_id.as_str(), "orders"])?;
        Self::send(self.request(Method::POST, url, credentials)).await
    }

    async fn get_order(
        &self,
        credentials: &StoreCredentials,
        order_id: &OrderId,
    ) -> Result<UpstreamResponse> {
        let url = self.store_url(credentials, &["v2", "orders", order_id.as_str()])?;
        Self::send(self.request(Method::GET, url, credentials)).await
    }

    async fn update_order(
        &self,
        credentials: &StoreCredentials,
        order_id: &OrderId,
        update: &OrderUpdate,
    ) -> Result<UpstreamResponse> {
        let url = self.store_url(credentials, &["v2", "orders", order_id.as_str()])?;
        let request = self.request(Method::PUT, url, credentials).json(update);
        Self::send(request).await
    }

    fn name(&self) -> &str {
        "RealGateway"
    }
}
