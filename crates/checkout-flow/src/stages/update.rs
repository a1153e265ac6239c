//! Order Updater
//!
//! Applies payment method, provider id and status to a created order.
//! `status_id` is forwarded without range checks.

use std::sync::Arc;
use std::time::Duration;

use checkout_core::{
    CheckoutError, CommerceGateway, OrderId, OrderUpdate, Result, Stage, StoreCredentials,
};

use super::bounded;

pub struct OrderUpdater {
    gateway: Arc<dyn CommerceGateway>,
    timeout: Duration,
}

impl OrderUpdater {
    pub fn new(gateway: Arc<dyn CommerceGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Apply `update`, returning the upstream view of the updated order
    pub async fn apply(
        &self,
        credentials: &StoreCredentials,
        order_id: &OrderId,
        update: &OrderUpdate,
    ) -> Result<serde_json::Value> {
        credentials.validate()?;
        if order_id.is_blank() {
            return Err(CheckoutError::Validation("orderId is required".into()));
        }

        if update.status().is_none() {
            tracing::warn!(status_id = update.status_id, "status id outside the known enumeration");
        }

        let response = bounded(
            Stage::OrderUpdate,
            self.timeout,
            self.gateway.update_order(credentials, order_id, update),
        )
        .await?;

        if !response.is_success() {
            return Err(CheckoutError::OrderUpdateFailed {
                status: response.status,
                body: response.body,
            });
        }

        Ok(response.body)
    }
}
