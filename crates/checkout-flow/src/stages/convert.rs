//! Order Converter
//!
//! Converts a checkout into an order with a single remote call. An order is
//! a real transactional record, so nothing is synthesized on failure.

use std::sync::Arc;
use std::time::Duration;

use checkout_core::{
    CheckoutError, CheckoutId, CommerceGateway, CreatedOrder, Result, Stage, StoreCredentials,
};

use super::bounded;

pub struct OrderConverter {
    gateway: Arc<dyn CommerceGateway>,
    timeout: Duration,
}

impl OrderConverter {
    pub fn new(gateway: Arc<dyn CommerceGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    pub async fn convert(
        &self,
        credentials: &StoreCredentials,
        checkout_id: &CheckoutId,
    ) -> Result<CreatedOrder> {
        credentials.validate()?;
        if checkout_id.is_blank() {
            return Err(CheckoutError::Validation("checkoutId is required".into()));
        }

        let response = bounded(
            Stage::OrderCreate,
            self.timeout,
            self.gateway.create_order(credentials, checkout_id),
        )
        .await?;

        if !response.is_success() {
            return Err(CheckoutError::OrderCreationFailed {
                status: response.status,
                body: response.body,
            });
        }

        let order = CreatedOrder::from_response(response.body)?;
        tracing::debug!(order_id = %order.id, checkout_id = %checkout_id, "checkout converted");
        Ok(order)
    }
}
