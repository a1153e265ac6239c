//! # checkout-core
//!
//! Domain types and the gateway abstraction for the BigCommerce checkout
//! explorer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    External payment flow                      │
//! │  ┌─────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐    │
//! │  │  Token  │─▶│  Order   │─▶│  Order   │─▶│    Order     │─▶ URL
//! │  │ Provider│  │ Converter│  │  Details │  │   Updater    │    │
//! │  └─────────┘  └──────────┘  └──────────┘  └──────────────┘    │
//! │        └──────────────┬─────────────────────────┘             │
//! │                CommerceGateway (Strategy)                     │
//! │                 Real  /  Simulated                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `CommerceGateway` trait lets the flow run against the live BigCommerce
//! API or a simulated store without changing flow logic.

pub mod checkout;
pub mod error;
pub mod gateway;
pub mod log;
pub mod order;
pub mod token;

pub use checkout::{Checkout, CheckoutEnvelope, CheckoutId, CheckoutSummary};
pub use error::{CheckoutError, Result};
pub use gateway::{CommerceGateway, StoreCredentials, UpstreamResponse};
pub use log::{FlowLog, LogEntry, LogKind, Stage};
pub use order::{CreatedOrder, OrderDetails, OrderId, OrderStatus, OrderUpdate};
pub use token::{SessionToken, TokenOrigin, TokenResponse};
