//! Flow Configuration

use std::time::Duration;

pub const DEFAULT_STORE_BASE_URL: &str = "https://yourstore.example.com";

/// Settings shared by every flow invocation
#[derive(Clone, Debug)]
pub struct FlowConfig {
    /// Storefront origin used for confirmation URLs when the caller gives none
    pub store_base_url: String,

    /// Upper bound on each remote stage
    pub stage_timeout: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            store_base_url: DEFAULT_STORE_BASE_URL.into(),
            stage_timeout: Duration::from_secs(15),
        }
    }
}

impl FlowConfig {
    pub fn from_env() -> Self {
        let store_base_url = std::env::var("STORE_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_BASE_URL.into());
        let stage_timeout = std::env::var("STAGE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(Duration::from_secs(15), Duration::from_secs);

        Self {
            store_base_url,
            stage_timeout,
        }
    }

    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    pub fn with_store_base_url(mut self, url: impl Into<String>) -> Self {
        self.store_base_url = url.into();
        self
    }
}
