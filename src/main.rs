use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use swapdesk::config::Settings;
use swapdesk::error::log_error;
use swapdesk::monitoring::{check_gateway_health, init_logging, ComponentStatus};
use swapdesk::quote::{calculate_minimum_received, calculate_price_impact, get_route_summary};
use swapdesk::{JupiterClient, QuoteRequest, QuoteService, RpcGateway};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first
    dotenv().ok();

    let settings = Settings::from_env().context("Failed to load configuration")?;

    let _guard = init_logging(&settings.log_config(std::env::var("RUST_LOG").ok()))?;

    info!("Starting swapdesk gateway probe...");

    let gateway = Arc::new(RpcGateway::new(settings.endpoints()?, &settings.gateway_config()?)?);
    for (i, endpoint) in gateway.endpoints().iter().enumerate() {
        info!(position = i, name = endpoint.name(), url = endpoint.url(), "Configured RPC endpoint");
    }

    let health = check_gateway_health(&gateway).await;
    match &health.status {
        ComponentStatus::Ok => info!(component = %health.name, "Healthy"),
        ComponentStatus::Warning(msg) => warn!(component = %health.name, "{}", msg),
        ComponentStatus::Error(msg) => error!(component = %health.name, "{}", msg),
    }

    let (Some(input_mint), Some(output_mint)) = (&settings.probe_input_mint, &settings.probe_output_mint) else {
        info!("No probe pair configured (PROBE_INPUT_MINT / PROBE_OUTPUT_MINT), done");
        return Ok(());
    };

    let aggregator = Arc::new(JupiterClient::new(&settings.jupiter_config())?);
    let quotes = QuoteService::new(aggregator);
    let request = QuoteRequest::new(
        input_mint.clone(),
        output_mint.clone(),
        settings.probe_amount.unwrap_or(1_000_000_000),
        settings.probe_slippage_bps.unwrap_or(50),
    );

    match quotes.get_quote(&request).await {
        Ok(quote) => {
            let price_impact = calculate_price_impact(&quote)
                .map(|p| p.to_string())
                .unwrap_or_else(|e| e.to_string());
            info!(
                in_amount = quote.in_amount,
                out_amount = quote.out_amount,
                minimum_received = calculate_minimum_received(&quote),
                price_impact = %price_impact,
                route = ?get_route_summary(&quote),
                "Probe quote"
            );
        }
        Err(e) => log_error(&e, "Probe quote"),
    }

    info!("swapdesk probe finished");
    Ok(())
}
