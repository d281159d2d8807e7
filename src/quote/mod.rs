pub mod metrics;

pub use metrics::{calculate_minimum_received, calculate_price_impact, get_route_summary, minimum_received};

use crate::error::{log_error, Result, SwapDeskError};
use crate::jupiter_client::SwapAggregator;
use metrics::MAX_SLIPPAGE_BPS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use swapdesk_types::{Quote, SwapMode};
use tracing::{info, warn};

/// Restrictions on how the aggregator may route a swap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConstraints {
    pub only_direct_routes: bool,
    pub restrict_intermediate_tokens: Option<bool>,
    pub max_accounts: Option<u16>,
    /// Only route through these venues (empty = any)
    pub dexes: Vec<String>,
    pub exclude_dexes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    /// Base units of the input asset (output asset for `ExactOut`).
    pub amount: u64,
    pub slippage_bps: u16,
    pub swap_mode: SwapMode,
    pub constraints: RoutingConstraints,
}

impl QuoteRequest {
    pub fn new(
        input_mint: impl Into<String>,
        output_mint: impl Into<String>,
        amount: u64,
        slippage_bps: u16,
    ) -> Self {
        Self {
            input_mint: input_mint.into(),
            output_mint: output_mint.into(),
            amount,
            slippage_bps,
            swap_mode: SwapMode::ExactIn,
            constraints: RoutingConstraints::default(),
        }
    }

    pub fn with_swap_mode(mut self, swap_mode: SwapMode) -> Self {
        self.swap_mode = swap_mode;
        self
    }

    pub fn with_constraints(mut self, constraints: RoutingConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Caller errors. These are never sent upstream and never retried.
    pub fn validate(&self) -> Result<()> {
        if self.input_mint.trim().is_empty() || self.output_mint.trim().is_empty() {
            return Err(SwapDeskError::InvalidRequest(
                "input and output assets are required".to_string(),
            ));
        }
        if self.input_mint == self.output_mint {
            return Err(SwapDeskError::InvalidRequest(format!(
                "input and output asset are both {}",
                self.input_mint
            )));
        }
        if self.amount == 0 {
            return Err(SwapDeskError::InvalidRequest(
                "amount must be a positive number of base units".to_string(),
            ));
        }
        if self.slippage_bps > MAX_SLIPPAGE_BPS {
            return Err(SwapDeskError::InvalidRequest(format!(
                "slippage {} bps is outside 0..={}",
                self.slippage_bps, MAX_SLIPPAGE_BPS
            )));
        }
        Ok(())
    }
}

/// Fetches one best-effort quote per request. Retrying, debouncing and
/// re-quoting on parameter changes are left to the caller.
pub struct QuoteService {
    aggregator: Arc<dyn SwapAggregator>,
}

impl QuoteService {
    pub fn new(aggregator: Arc<dyn SwapAggregator>) -> Self {
        Self { aggregator }
    }

    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote> {
        request.validate()?;

        let quote = match self.aggregator.quote(request).await {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                return Err(SwapDeskError::QuoteUnavailable(
                    "Aggregator returned no quote".to_string(),
                ))
            }
            Err(SwapDeskError::QuoteUnavailable(message)) => {
                return Err(SwapDeskError::QuoteUnavailable(message))
            }
            Err(e) => {
                log_error(&e, "Quote request");
                return Err(SwapDeskError::QuoteUnavailable(e.to_string()));
            }
        };

        check_threshold(&quote)?;

        info!(
            input_mint = %quote.input_mint,
            output_mint = %quote.output_mint,
            in_amount = quote.in_amount,
            out_amount = quote.out_amount,
            slippage_bps = quote.slippage_bps,
            hops = quote.route_plan.len(),
            "Quote received"
        );
        Ok(quote)
    }

    pub fn calculate_minimum_received(&self, quote: &Quote) -> u64 {
        metrics::calculate_minimum_received(quote)
    }

    pub fn calculate_price_impact(&self, quote: &Quote) -> Result<f64> {
        metrics::calculate_price_impact(quote)
    }

    pub fn get_route_summary(&self, quote: &Quote) -> Vec<String> {
        metrics::get_route_summary(quote)
    }
}

/// For `ExactIn` the threshold is the least output the route may deliver, so
/// it can never exceed `out_amount`. For `ExactOut` it bounds the input and is
/// not comparable.
fn check_threshold(quote: &Quote) -> Result<()> {
    match (quote.swap_mode, quote.other_amount_threshold) {
        (SwapMode::ExactIn, Some(threshold)) if threshold > quote.out_amount => {
            warn!(
                threshold,
                out_amount = quote.out_amount,
                "Discarding malformed quote"
            );
            Err(SwapDeskError::QuoteUnavailable(format!(
                "Malformed quote: otherAmountThreshold {} exceeds outAmount {}",
                threshold, quote.out_amount
            )))
        }
        _ => Ok(()),
    }
}
