//! Order Detail Fetcher
//!
//! Retrieves the created order for diagnostics. The result only feeds the
//! flow log, but a failed lookup still stops the flow: the update cannot be
//! confirmed against an order that cannot be read.

use std::sync::Arc;
use std::time::Duration;

use checkout_core::{
    CheckoutError, CommerceGateway, OrderDetails, OrderId, Result, Stage, StoreCredentials,
};

use super::bounded;

pub struct OrderDetailFetcher {
    gateway: Arc<dyn CommerceGateway>,
    timeout: Duration,
}

impl OrderDetailFetcher {
    pub fn new(gateway: Arc<dyn CommerceGateway>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    pub async fn fetch(
        &self,
        credentials: &StoreCredentials,
        order_id: &OrderId,
    ) -> Result<OrderDetails> {
        credentials.validate()?;
        if order_id.is_blank() {
            return Err(CheckoutError::Validation("orderId is required".into()));
        }

        let response = bounded(
            Stage::OrderDetails,
            self.timeout,
            self.gateway.get_order(credentials, order_id),
        )
        .await?;

        if !response.is_success() {
            return Err(CheckoutError::OrderDetailsUnavailable {
                status: response.status,
                body: response.body,
            });
        }

        Ok(OrderDetails::from_response(response.body, order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_gateway::{Endpoint, SimulatedGateway};
    use serde_json::json;

    fn creds() -> StoreCredentials {
        StoreCredentials::new("abc123", "tok")
    }

    #[tokio::test]
    async fn test_fetch_decodes_details() {
        let fetcher = OrderDetailFetcher::new(Arc::new(SimulatedGateway::new()), Duration::from_secs(1));
        let details = fetcher.fetch(&creds(), &OrderId::new("123456")).await.unwrap();

        assert_eq!(details.id.as_str(), "123456");
        assert_eq!(details.status_id, Some(0));
        assert_eq!(details.status.as_deref(), Some("Incomplete"));
    }

    #[tokio::test]
    async fn test_not_found_is_unavailable() {
        let gateway = SimulatedGateway::new()
            .with_response(Endpoint::GetOrder, 404, json!([{"status": 404, "message": "The requested resource was not found."}]));
        let fetcher = OrderDetailFetcher::new(Arc::new(gateway), Duration::from_secs(1));
        let err = fetcher.fetch(&creds(), &OrderId::new("1")).await.unwrap_err();

        assert!(matches!(err, CheckoutError::OrderDetailsUnavailable { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_blank_order_id_rejected() {
        let gateway = Arc::new(SimulatedGateway::new());
        let fetcher = OrderDetailFetcher::new(gateway.clone(), Duration::from_secs(1));
        let err = fetcher.fetch(&creds(), &OrderId::new("")).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Validation(_)));
        assert!(gateway.calls().is_empty());
    }
}
