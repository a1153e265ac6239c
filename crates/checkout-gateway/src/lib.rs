//! # checkout-gateway
//!
//! `CommerceGateway` implementations for the checkout explorer.
//!
//! ## Gateways
//!
//! - **RealGateway**: live BigCommerce REST API over `reqwest`
//! - **SimulatedGateway** (default): in-process demo store, scriptable for tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_gateway::GatewayConfig;
//!
//! // GATEWAY_MODE=real selects the live API
//! let gateway = GatewayConfig::from_env()?.build()?;
//! let response = gateway.get_checkout(&credentials, &checkout_id).await?;
//! ```

pub mod config;
pub mod real;
pub mod simulated;

pub use config::{GatewayConfig, GatewayMode};
pub use real::RealGateway;
pub use simulated::{Endpoint, SimulatedGateway};

// Re-export core types for convenience
pub use checkout_core::{CommerceGateway, StoreCredentials, UpstreamResponse};
