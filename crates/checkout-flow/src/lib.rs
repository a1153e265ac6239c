//! # checkout-flow
//!
//! Turns a BigCommerce checkout into a paid order on behalf of an external
//! payment processor, and builds the storefront confirmation link.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  Token   │──▶│ Order create │──▶│ Order detail │──▶│ Order update │──▶ confirmation URL
//! └──────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//!      │                │                  │                  │
//!  falls back to     fatal              fatal              fatal
//!  a local token
//! ```
//!
//! - **Token never blocks the flow** - an unavailable token API yields a
//!   locally synthesized token and a `FallbackUsed` log entry
//! - **Stages are sequential** - the first fatal failure stops the run
//! - **No rollback** - an order created before a later failure is left in
//!   place and reported on the outcome
//!
//! Every run returns its full [`FlowLog`](checkout_core::FlowLog), including
//! the entries written before a failure.

pub mod config;
pub mod inspect;
pub mod orchestrator;
pub mod stages;

pub use config::FlowConfig;
pub use inspect::CheckoutInspector;
pub use orchestrator::{
    confirmation_url, ExternalPaymentFlow, FlowOutcome, FlowRequest, FlowResult, FlowState,
};
pub use stages::{OrderConverter, OrderDetailFetcher, OrderUpdater, TokenProvider};
