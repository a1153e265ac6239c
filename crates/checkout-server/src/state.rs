//! Application State

use std::sync::Arc;

use checkout_core::CommerceGateway;
use checkout_flow::{
    CheckoutInspector, ExternalPaymentFlow, FlowConfig, OrderConverter, OrderDetailFetcher,
    OrderUpdater, TokenProvider,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// BigCommerce gateway (real or simulated)
    pub gateway: Arc<dyn CommerceGateway>,

    /// Read-only checkout lookups
    pub inspector: Arc<CheckoutInspector>,

    /// Full external payment pipeline
    pub flow: Arc<ExternalPaymentFlow>,

    // Individual stages, exposed one endpoint each
    pub tokens: Arc<TokenProvider>,
    pub converter: Arc<OrderConverter>,
    pub details: Arc<OrderDetailFetcher>,
    pub updater: Arc<OrderUpdater>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn CommerceGateway>, config: FlowConfig) -> Self {
        let timeout = config.stage_timeout;
        Self {
            inspector: Arc::new(CheckoutInspector::new(gateway.clone())),
            tokens: Arc::new(TokenProvider::new(gateway.clone(), timeout)),
            converter: Arc::new(OrderConverter::new(gateway.clone(), timeout)),
            details: Arc::new(OrderDetailFetcher::new(gateway.clone(), timeout)),
            updater: Arc::new(OrderUpdater::new(gateway.clone(), timeout)),
            flow: Arc::new(ExternalPaymentFlow::new(gateway.clone(), config)),
            gateway,
        }
    }
}
