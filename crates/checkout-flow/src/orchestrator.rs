//! External Payment Flow
//!
//! Sequences the token, conversion, detail and update stages for one
//! checkout and assembles the order confirmation URL.
//!
//! ```text
//! Init ─▶ TokenPending ─▶ OrderPending ─▶ DetailsPending ─▶ UpdatePending ─▶ Completed
//!   │          │               │                │                 │
//!   └──────────┴───────────────┴────────────────┴─────────────────┴──────▶ Failed
//! ```
//!
//! Stages never overlap and are never retried. The token stage absorbs its own
//! upstream failures; any other failure ends the run in `Failed`, keeping the
//! log written so far. A created order is not rolled back when a later stage
//! fails; its id stays on the outcome.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use checkout_core::{
    CheckoutError, CheckoutId, CommerceGateway, FlowLog, OrderId, OrderUpdate, SessionToken,
    Stage, StoreCredentials, TokenOrigin,
};

use crate::config::FlowConfig;
use crate::stages::{OrderConverter, OrderDetailFetcher, OrderUpdater, TokenProvider};

/// Flow state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Init,
    TokenPending,
    OrderPending,
    DetailsPending,
    UpdatePending,
    Completed,
    Failed,
}

impl FlowState {
    /// Successor on success; terminal states are absorbing
    pub const fn next(self) -> Self {
        match self {
            Self::Init => Self::TokenPending,
            Self::TokenPending => Self::OrderPending,
            Self::OrderPending => Self::DetailsPending,
            Self::DetailsPending => Self::UpdatePending,
            Self::UpdatePending | Self::Completed => Self::Completed,
            Self::Failed => Self::Failed,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Stage executed while in this state
    pub const fn stage(self) -> Option<Stage> {
        match self {
            Self::Init => Some(Stage::Init),
            Self::TokenPending => Some(Stage::Token),
            Self::OrderPending => Some(Stage::OrderCreate),
            Self::DetailsPending => Some(Stage::OrderDetails),
            Self::UpdatePending => Some(Stage::OrderUpdate),
            Self::Completed | Self::Failed => None,
        }
    }
}

/// Input for one flow invocation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowRequest {
    pub credentials: StoreCredentials,
    pub checkout_id: CheckoutId,
    #[serde(default)]
    pub order_update: OrderUpdate,
    /// Overrides the configured storefront origin
    #[serde(default)]
    pub store_base_url: Option<String>,
}

impl FlowRequest {
    pub fn new(credentials: StoreCredentials, checkout_id: impl Into<String>) -> Self {
        Self {
            credentials,
            checkout_id: CheckoutId::new(checkout_id),
            order_update: OrderUpdate::default(),
            store_base_url: None,
        }
    }

    pub fn with_update(mut self, update: OrderUpdate) -> Self {
        self.order_update = update;
        self
    }

    pub fn with_store_base_url(mut self, url: impl Into<String>) -> Self {
        self.store_base_url = Some(url.into());
        self
    }

    /// Presence checks performed before any remote call
    pub fn validate(&self) -> Result<(), CheckoutError> {
        self.credentials.validate()?;
        if self.checkout_id.is_blank() {
            return Err(CheckoutError::Validation("checkoutId is required".into()));
        }
        if self.order_update.payment_method.trim().is_empty() {
            return Err(CheckoutError::Validation("payment_method is required".into()));
        }
        if self.order_update.payment_provider_id.trim().is_empty() {
            return Err(CheckoutError::Validation("payment_provider_id is required".into()));
        }
        Ok(())
    }
}

/// Terminal outcome of a flow invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlowOutcome {
    Completed {
        confirmation_url: String,
        order_id: OrderId,
        token: String,
        token_origin: TokenOrigin,
    },
    Failed {
        stage: Stage,
        message: String,
        /// Set when an order was created before the failure
        #[serde(skip_serializing_if = "Option::is_none")]
        order_id: Option<OrderId>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowResult {
    pub state: FlowState,
    pub log: FlowLog,
    pub outcome: FlowOutcome,
}

impl FlowResult {
    pub const fn is_completed(&self) -> bool {
        matches!(self.outcome, FlowOutcome::Completed { .. })
    }

    pub fn confirmation_url(&self) -> Option<&str> {
        match &self.outcome {
            FlowOutcome::Completed { confirmation_url, .. } => Some(confirmation_url),
            FlowOutcome::Failed { .. } => None,
        }
    }

    pub const fn failed_stage(&self) -> Option<Stage> {
        match &self.outcome {
            FlowOutcome::Failed { stage, .. } => Some(*stage),
            FlowOutcome::Completed { .. } => None,
        }
    }

    /// An order exists upstream but the flow did not finish
    pub const fn is_partial(&self) -> bool {
        matches!(&self.outcome, FlowOutcome::Failed { order_id: Some(_), .. })
    }
}

/// `{base}/checkout/order-confirmation/{order_id}?t={token}`
pub fn confirmation_url(store_base_url: &str, order_id: &OrderId, token: &SessionToken) -> String {
    format!(
        "{}/checkout/order-confirmation/{}?t={}",
        store_base_url.trim_end_matches('/'),
        order_id,
        token
    )
}

/// Mutable bookkeeping for a single run
struct Run {
    state: FlowState,
    log: FlowLog,
    order_id: Option<OrderId>,
}

impl Run {
    fn new() -> Self {
        Self {
            state: FlowState::Init,
            log: FlowLog::new(),
            order_id: None,
        }
    }

    fn advance(&mut self) {
        self.state = self.state.next();
    }

    fn fail(mut self, error: &CheckoutError) -> FlowResult {
        let stage = self.state.stage().unwrap_or(Stage::Init);
        let message = error.to_string();

        self.log.error(stage, format!("Error: {message}"));
        if let Some(body) = error.upstream_body() {
            self.log.error(stage, format!("Error details: {body}"));
        }
        if let Some(order_id) = &self.order_id {
            self.log.error(
                stage,
                format!("Order {order_id} was created but the flow did not complete; no rollback was performed"),
            );
        }

        self.state = FlowState::Failed;
        FlowResult {
            state: self.state,
            log: self.log,
            outcome: FlowOutcome::Failed {
                stage,
                message,
                order_id: self.order_id,
            },
        }
    }
}

/// Checkout to order conversion driven by an external payment
pub struct ExternalPaymentFlow {
    tokens: TokenProvider,
    converter: OrderConverter,
    details: OrderDetailFetcher,
    updater: OrderUpdater,
    config: FlowConfig,
}

impl ExternalPaymentFlow {
    pub fn new(gateway: Arc<dyn CommerceGateway>, config: FlowConfig) -> Self {
        let timeout = config.stage_timeout;
        Self {
            tokens: TokenProvider::new(gateway.clone(), timeout),
            converter: OrderConverter::new(gateway.clone(), timeout),
            details: OrderDetailFetcher::new(gateway.clone(), timeout),
            updater: OrderUpdater::new(gateway, timeout),
            config,
        }
    }

    pub const fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Run every stage in order, stopping at the first fatal failure
    pub async fn run(&self, request: FlowRequest) -> FlowResult {
        let mut run = Run::new();
        let credentials = &request.credentials;
        let checkout_id = &request.checkout_id;

        run.log.info(Stage::Init, "Starting payment middleware flow...");
        run.log.info(Stage::Init, format!("Checkout ID: {checkout_id}"));
        if let Err(e) = request.validate() {
            return run.fail(&e);
        }

        run.advance();
        run.log.info(Stage::Token, "Step 1: Generating checkout token...");
        let token = match self.tokens.issue(credentials, checkout_id, &mut run.log).await {
            Ok(token) => token,
            Err(e) => return run.fail(&e),
        };

        run.advance();
        run.log.info(Stage::OrderCreate, "Step 2: Converting checkout to order...");
        let order = match self.converter.convert(credentials, checkout_id).await {
            Ok(order) => order,
            Err(e) => return run.fail(&e),
        };
        run.log.info(
            Stage::OrderCreate,
            format!("Order created successfully with ID: {}", order.id),
        );
        run.order_id = Some(order.id.clone());

        run.advance();
        run.log.info(Stage::OrderDetails, "Step 3: Fetching order details...");
        match self.details.fetch(credentials, &order.id).await {
            Ok(details) => run.log.info(Stage::OrderDetails, details.describe()),
            Err(e) => return run.fail(&e),
        }

        run.advance();
        let update = &request.order_update;
        run.log.info(Stage::OrderUpdate, "Step 4: Updating order with payment information...");
        run.log.info(
            Stage::OrderUpdate,
            format!(
                "Payment method: {}, provider ID: {}, status: {}",
                update.payment_method,
                update.payment_provider_id,
                update.status_label()
            ),
        );
        if let Err(e) = self.updater.apply(credentials, &order.id, update).await {
            return run.fail(&e);
        }
        run.log.info(Stage::OrderUpdate, "Order updated successfully");

        run.advance();
        run.log.info(
            Stage::Confirmation,
            "Step 5: Flow completed - generating confirmation URL",
        );
        let base = request
            .store_base_url
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(&self.config.store_base_url);
        let url = confirmation_url(base, &order.id, &token);
        run.log.info(Stage::Confirmation, "Payment middleware flow completed successfully");

        FlowResult {
            state: run.state,
            log: run.log,
            outcome: FlowOutcome::Completed {
                confirmation_url: url,
                order_id: order.id,
                token: token.as_str().to_string(),
                token_origin: token.origin(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use checkout_core::LogKind;
    use checkout_gateway::{Endpoint, SimulatedGateway};
    use serde_json::json;

    const CHECKOUT: &str = "306d57d7-124e-4112-82cd-35e060c0d4d9";

    fn request() -> FlowRequest {
        FlowRequest::new(StoreCredentials::new("abc123", "tok"), CHECKOUT)
    }

    fn flow(gateway: &Arc<SimulatedGateway>) -> ExternalPaymentFlow {
        ExternalPaymentFlow::new(gateway.clone(), FlowConfig::default())
    }

    fn assert_stage_order(result: &FlowResult) {
        let stages = result.log.stages();
        let mut sorted = stages.clone();
        sorted.sort();
        assert_eq!(stages, sorted, "log stages out of order: {stages:?}");
    }

    #[test]
    fn test_state_transitions() {
        let mut state = FlowState::Init;
        let mut visited = vec![state];
        while !state.is_terminal() {
            state = state.next();
            visited.push(state);
        }
        assert_eq!(
            visited,
            vec![
                FlowState::Init,
                FlowState::TokenPending,
                FlowState::OrderPending,
                FlowState::DetailsPending,
                FlowState::UpdatePending,
                FlowState::Completed,
            ]
        );
        assert_eq!(FlowState::Failed.next(), FlowState::Failed);
    }

    #[test]
    fn test_confirmation_url_format() {
        let token = SessionToken::issued("tok-1", CheckoutId::new(CHECKOUT));
        assert_eq!(
            confirmation_url("https://shop.example.com/", &OrderId::new("100"), &token),
            "https://shop.example.com/checkout/order-confirmation/100?t=tok-1"
        );
    }

    #[tokio::test]
    async fn test_all_stages_succeed() {
        let gateway = Arc::new(
            SimulatedGateway::new()
                .with_response(Endpoint::CreateCheckoutToken, 200, json!({"token": "api-token-1"}))
                .with_response(Endpoint::CreateOrder, 200, json!({"data": {"id": 246810}})),
        );
        let update = OrderUpdate {
            status_id: 11,
            ..Default::default()
        };
        let result = flow(&gateway).run(request().with_update(update)).await;

        assert_eq!(result.state, FlowState::Completed);
        assert_eq!(
            result.confirmation_url(),
            Some("https://yourstore.example.com/checkout/order-confirmation/246810?t=api-token-1")
        );
        match &result.outcome {
            FlowOutcome::Completed { token_origin, order_id, .. } => {
                assert_eq!(*token_origin, TokenOrigin::ApiIssued);
                assert_eq!(order_id.as_str(), "246810");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(
            result.log.stages(),
            vec![
                Stage::Init,
                Stage::Token,
                Stage::OrderCreate,
                Stage::OrderDetails,
                Stage::OrderUpdate,
                Stage::Confirmation,
            ]
        );
        assert!(result.log.lines().iter().any(|l| l.contains("Awaiting Fulfillment (ID: 11)")));
        assert_eq!(
            gateway.calls(),
            vec![
                Endpoint::CreateCheckoutToken,
                Endpoint::CreateOrder,
                Endpoint::GetOrder,
                Endpoint::UpdateOrder,
            ]
        );
    }

    #[tokio::test]
    async fn test_token_outage_still_completes() {
        let gateway = Arc::new(
            SimulatedGateway::new()
                .with_response(Endpoint::CreateCheckoutToken, 503, json!("Service Unavailable")),
        );
        let result = flow(&gateway).run(request()).await;

        assert_eq!(result.state, FlowState::Completed);
        assert!(result.log.contains_kind(LogKind::FallbackUsed));
        match &result.outcome {
            FlowOutcome::Completed { token, token_origin, confirmation_url, order_id } => {
                assert_eq!(*token_origin, TokenOrigin::LocallySynthesized);
                assert!(token.starts_with(|c: char| c.is_ascii_digit()));
                assert!(confirmation_url.ends_with(&format!("/checkout/order-confirmation/{order_id}?t={token}")));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_stage_order(&result);
    }

    #[tokio::test]
    async fn test_unreachable_token_api_still_completes() {
        let gateway = Arc::new(SimulatedGateway::new().with_unreachable(Endpoint::CreateCheckoutToken));
        let result = flow(&gateway).run(request()).await;
        assert!(result.is_completed());
        assert!(gateway.was_called(Endpoint::UpdateOrder));
    }

    #[tokio::test]
    async fn test_order_create_rejection_short_circuits() {
        let gateway = Arc::new(
            SimulatedGateway::new()
                .with_response(Endpoint::CreateOrder, 422, json!({"title": "Unprocessable Entity"})),
        );
        let result = flow(&gateway).run(request()).await;

        assert_eq!(result.state, FlowState::Failed);
        assert_eq!(result.failed_stage(), Some(Stage::OrderCreate));
        assert_eq!(result.failed_stage().map(Stage::as_str), Some("order-create"));
        assert!(!result.is_partial());
        assert!(result.confirmation_url().is_none());

        assert!(!gateway.was_called(Endpoint::GetOrder));
        assert!(!gateway.was_called(Endpoint::UpdateOrder));

        let stages = result.log.stages();
        assert_eq!(stages.last(), Some(&Stage::OrderCreate));
        assert!(!stages.contains(&Stage::OrderDetails));
        assert!(!stages.contains(&Stage::OrderUpdate));
        assert!(result.log.lines().iter().any(|l| l.contains("Unprocessable Entity")));
    }

    #[tokio::test]
    async fn test_details_failure_keeps_order_id() {
        let gateway = Arc::new(
            SimulatedGateway::new()
                .with_response(Endpoint::CreateOrder, 200, json!({"data": {"id": 777}}))
                .with_response(Endpoint::GetOrder, 500, json!({"title": "Internal Server Error"})),
        );
        let result = flow(&gateway).run(request()).await;

        assert_eq!(result.failed_stage(), Some(Stage::OrderDetails));
        assert!(result.is_partial());
        assert!(!gateway.was_called(Endpoint::UpdateOrder));
        assert_stage_order(&result);
    }

    #[tokio::test]
    async fn test_update_failure_leaves_partial_order_visible() {
        let gateway = Arc::new(
            SimulatedGateway::new()
                .with_response(Endpoint::CreateOrder, 200, json!({"data": {"id": 888}}))
                .with_response(Endpoint::UpdateOrder, 400, json!({"title": "Bad Request"})),
        );
        let result = flow(&gateway).run(request()).await;

        assert_eq!(result.state, FlowState::Failed);
        match &result.outcome {
            FlowOutcome::Failed { stage, order_id, message } => {
                assert_eq!(*stage, Stage::OrderUpdate);
                assert_eq!(order_id.as_ref().map(OrderId::as_str), Some("888"));
                assert!(message.contains("400"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(result.log.lines().iter().any(|l| l.contains("Order 888 was created")));
        assert!(!result.log.stages().contains(&Stage::Confirmation));
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_any_call() {
        let gateway = Arc::new(SimulatedGateway::new());
        let request = FlowRequest::new(StoreCredentials::new("abc123", ""), CHECKOUT);
        let result = flow(&gateway).run(request).await;

        assert_eq!(result.failed_stage(), Some(Stage::Init));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stage_timeout_is_fatal_after_token() {
        let gateway = Arc::new(
            SimulatedGateway::new().with_delay(Endpoint::CreateOrder, Duration::from_millis(300)),
        );
        let config = FlowConfig::default().with_stage_timeout(Duration::from_millis(30));
        let result = ExternalPaymentFlow::new(gateway.clone(), config).run(request()).await;

        assert_eq!(result.failed_stage(), Some(Stage::OrderCreate));
        match &result.outcome {
            FlowOutcome::Failed { message, .. } => assert!(message.contains("timed out")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!gateway.was_called(Endpoint::GetOrder));
    }

    #[tokio::test]
    async fn test_caller_store_base_url_wins() {
        let gateway = Arc::new(
            SimulatedGateway::new()
                .with_response(Endpoint::CreateCheckoutToken, 200, json!({"token": "t"}))
                .with_response(Endpoint::CreateOrder, 200, json!({"data": {"id": 5}})),
        );
        let result = flow(&gateway)
            .run(request().with_store_base_url("https://shop.test"))
            .await;
        assert_eq!(
            result.confirmation_url(),
            Some("https://shop.test/checkout/order-confirmation/5?t=t")
        );
    }

    #[tokio::test]
    async fn test_outcome_serialization() {
        let gateway = Arc::new(
            SimulatedGateway::new()
                .with_response(Endpoint::CreateOrder, 422, json!({"title": "nope"})),
        );
        let result = flow(&gateway).run(request()).await;
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["state"], "failed");
        assert_eq!(json["outcome"]["status"], "failed");
        assert_eq!(json["outcome"]["stage"], "order-create");
        assert!(json["outcome"].get("order_id").is_none());
        assert!(json["log"].is_array());
    }
}
