//! Checkout Explorer HTTP Server
//!
//! Axum server proxying the BigCommerce checkout, token and order endpoints,
//! plus a server-side run of the whole external payment flow.

mod app;
mod handlers;
mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_flow::FlowConfig;
use checkout_gateway::{GatewayConfig, GatewayMode};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before anything reads it
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let gateway_config = GatewayConfig::from_env()?;
    let gateway = gateway_config.build()?;
    let flow_config = FlowConfig::from_env();

    match gateway_config.mode {
        GatewayMode::Real => {
            tracing::info!("✓ Using live BigCommerce API at {}", gateway_config.api_base);
        }
        GatewayMode::Simulated => {
            tracing::warn!("⚠ Simulated gateway - no requests reach BigCommerce");
            tracing::warn!("  Set GATEWAY_MODE=real in .env to use the live API");
        }
    }
    tracing::info!(
        store_base_url = %flow_config.store_base_url,
        stage_timeout_secs = flow_config.stage_timeout.as_secs(),
        "flow configured"
    );

    let app = app::router(AppState::new(gateway, flow_config));

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 checkout explorer running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                            - Health check");
    tracing::info!("  POST /api/bigcommerce/validate          - Check API credentials");
    tracing::info!("  POST /api/bigcommerce/checkout          - Raw checkout");
    tracing::info!("  POST /api/bigcommerce/checkout-summary  - Formatted checkout");
    tracing::info!("  POST /api/bigcommerce/token-generate    - Checkout token");
    tracing::info!("  POST /api/bigcommerce/order-create      - Checkout to order");
    tracing::info!("  POST /api/bigcommerce/order-details     - Order lookup");
    tracing::info!("  POST /api/bigcommerce/order-update      - Apply payment to order");
    tracing::info!("  POST /api/bigcommerce/external-payment  - Run the full flow");

    axum::serve(listener, app).await?;

    Ok(())
}
