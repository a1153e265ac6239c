//! Flow Stages
//!
//! One component per remote step of the external payment flow. Each stage
//! runs under a time budget; a timeout is reported like any other failure of
//! that stage.

mod convert;
mod details;
mod token;
mod update;

pub use convert::OrderConverter;
pub use details::OrderDetailFetcher;
pub use token::TokenProvider;
pub use update::OrderUpdater;

use std::future::Future;
use std::time::Duration;

use checkout_core::{CheckoutError, Result, Stage};

/// Run `call`, mapping an elapsed budget to `CheckoutError::Timeout`
pub(crate) async fn bounded<T>(
    stage: Stage,
    limit: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| CheckoutError::Timeout {
            stage: stage.as_str().to_string(),
            millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        })?
}
