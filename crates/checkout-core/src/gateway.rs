//! Commerce Gateway Strategy Pattern
//!
//! Defines a common interface over the BigCommerce endpoints used by the
//! checkout explorer, so the flow runs unchanged against the real API or a
//! simulated store.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_core::gateway::{CommerceGateway, StoreCredentials};
//!
//! let gateway: Arc<dyn CommerceGateway> = Arc::new(RealGateway::from_env()?);
//! let response = gateway.create_order(&credentials, &checkout_id).await?;
//! if response.is_success() { /* ... */ }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::checkout::CheckoutId;
use crate::error::{CheckoutError, Result};
use crate::order::{OrderId, OrderUpdate};

/// Store hash and API access token, passed through untouched
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCredentials {
    pub store_hash: String,
    pub access_token: String,
}

impl StoreCredentials {
    pub fn new(store_hash: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            store_hash: store_hash.into(),
            access_token: access_token.into(),
        }
    }

    /// Presence check only; the format is never inspected
    pub fn validate(&self) -> Result<()> {
        if self.store_hash.trim().is_empty() {
            return Err(CheckoutError::Validation("storeHash is required".into()));
        }
        if self.access_token.trim().is_empty() {
            return Err(CheckoutError::Validation("accessToken is required".into()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("store_hash", &self.store_hash)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Status and decoded body of an upstream call
///
/// Bodies that are not JSON are carried as a JSON string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl UpstreamResponse {
    pub const fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: serde_json::Value) -> Self {
        Self::new(200, body)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Return the body on 2xx, or a generic upstream error otherwise
    pub fn into_success(self) -> Result<serde_json::Value> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(CheckoutError::Upstream {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// BigCommerce gateway trait (Strategy pattern)
///
/// Implementations return `Err` only when the upstream could not be reached;
/// any HTTP response, including non-2xx, is an `Ok(UpstreamResponse)` left for
/// the caller to interpret.
#[async_trait]
pub trait CommerceGateway: Send + Sync {
    /// Probe the credentials against a cheap read endpoint
    async fn validate_credentials(&self, credentials: &StoreCredentials) -> Result<UpstreamResponse>;

    /// `GET /v3/checkouts/{id}`
    async fn get_checkout(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<UpstreamResponse>;

    /// `POST /v3/checkouts/{id}/token`
    async fn create_checkout_token(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<UpstreamResponse>;

    /// `POST /v3/checkouts/{id}/orders`
    async fn create_order(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<UpstreamResponse>;

    /// `GET /v2/orders/{id}`
    async fn get_order(
        &self,
        credentials: &StoreCredentials,
        order_id: &OrderId,
    ) -> Result<UpstreamResponse>;

    /// `PUT /v2/orders/{id}`
    async fn update_order(
        &self,
        credentials: &StoreCredentials,
        order_id: &OrderId,
        update: &OrderUpdate,
    ) -> Result<UpstreamResponse>;

    /// Gateway name for logs and health output
    fn name(&self) -> &str;
}
