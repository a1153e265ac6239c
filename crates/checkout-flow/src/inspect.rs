//! Checkout Inspection
//!
//! Read-only lookups used before running the payment flow: credential
//! checks, the raw checkout payload and a formatted summary of it.

use std::sync::Arc;

use serde_json::Value;

use checkout_core::{
    Checkout, CheckoutEnvelope, CheckoutError, CheckoutId, CheckoutSummary, CommerceGateway,
    Result, StoreCredentials,
};

pub struct CheckoutInspector {
    gateway: Arc<dyn CommerceGateway>,
}

impl CheckoutInspector {
    pub fn new(gateway: Arc<dyn CommerceGateway>) -> Self {
        Self { gateway }
    }

    /// Confirm the store accepts these credentials
    pub async fn validate_credentials(&self, credentials: &StoreCredentials) -> Result<()> {
        credentials.validate()?;
        self.gateway
            .validate_credentials(credentials)
            .await?
            .into_success()
            .map(drop)
    }

    /// Checkout payload exactly as the API returned it
    pub async fn fetch_raw(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<Value> {
        credentials.validate()?;
        if checkout_id.is_blank() {
            return Err(CheckoutError::Validation("checkoutId is required".into()));
        }
        self.gateway
            .get_checkout(credentials, checkout_id)
            .await?
            .into_success()
    }

    /// Typed checkout
    pub async fn fetch(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<Checkout> {
        let body = self.fetch_raw(credentials, checkout_id).await?;
        let envelope: CheckoutEnvelope = serde_json::from_value(body)
            .map_err(|e| CheckoutError::MalformedResponse(format!("checkout payload: {e}")))?;
        Ok(envelope.data)
    }

    pub async fn summarize(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<CheckoutSummary> {
        let checkout = self.fetch(credentials, checkout_id).await?;
        tracing::debug!(checkout_id = %checkout.id, items = checkout.item_count(), "checkout decoded");
        Ok(checkout.summary())
    }
}
