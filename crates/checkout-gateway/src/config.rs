//! Gateway Configuration
//!
//! Selects between the live BigCommerce API and the simulated store.

use std::str::FromStr;
use std::sync::Arc;

use checkout_core::{CheckoutError, CommerceGateway, Result};

use crate::real::RealGateway;
use crate::simulated::SimulatedGateway;

pub const DEFAULT_API_BASE: &str = "https://api.bigcommerce.com";

/// Which gateway implementation to run against
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatewayMode {
    Real,
    Simulated,
}

impl GatewayMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Simulated => "simulated",
        }
    }
}

impl FromStr for GatewayMode {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "real" | "live" => Ok(Self::Real),
            "simulated" | "mock" | "demo" => Ok(Self::Simulated),
            other => Err(CheckoutError::Config(format!(
                "unknown GATEWAY_MODE '{other}' (expected 'real' or 'simulated')"
            ))),
        }
    }
}

/// Gateway configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub mode: GatewayMode,

    /// BigCommerce API origin, without the `/stores/{hash}` part
    pub api_base: String,

    /// HTTP client timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: GatewayMode::Simulated,
            api_base: DEFAULT_API_BASE.into(),
            timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let mode = match std::env::var("GATEWAY_MODE") {
            Ok(value) => value.parse()?,
            Err(_) => GatewayMode::Simulated,
        };
        let api_base = std::env::var("BIGCOMMERCE_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let timeout_secs = std::env::var("GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            mode,
            api_base,
            timeout_secs,
        })
    }

    /// Build the configured gateway
    pub fn build(&self) -> Result<Arc<dyn CommerceGateway>> {
        let gateway: Arc<dyn CommerceGateway> = match self.mode {
            GatewayMode::Real => Arc::new(RealGateway::from_config(self)?),
            GatewayMode::Simulated => Arc::new(SimulatedGateway::new()),
        };
        tracing::debug!(gateway = gateway.name(), "gateway initialized");
        Ok(gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.mode, GatewayMode::Simulated);
        assert_eq!(config.api_base, "https://api.bigcommerce.com");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("real".parse::<GatewayMode>().unwrap(), GatewayMode::Real);
        assert_eq!(" Mock ".parse::<GatewayMode>().unwrap(), GatewayMode::Simulated);
        assert!(matches!(
            "sandbox".parse::<GatewayMode>(),
            Err(CheckoutError::Config(_))
        ));
    }

    #[test]
    fn test_build_selects_strategy() {
        let simulated = GatewayConfig::default().build().unwrap();
        assert_eq!(simulated.name(), "SimulatedGateway");

        let real = GatewayConfig {
            mode: GatewayMode::Real,
            ..Default::default()
        }
        .build()
        .unwrap();
        assert_eq!(real.name(), "RealGateway");
    }
}
