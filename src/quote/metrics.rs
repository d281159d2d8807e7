//! Pure figures derived from a quote. Used by both the quote service and the
//! swap orchestrator.

use crate::error::{Result, SwapDeskError};
use swapdesk_types::Quote;

pub const MAX_SLIPPAGE_BPS: u16 = 10_000;

/// Route label for hops the aggregator did not name.
pub const UNKNOWN_VENUE: &str = "Unknown";

const AGGREGATOR: &str = "jupiter";

/// `floor(out_amount * (1 - slippage_bps / 10000))`, in base units.
///
/// Computed from the quote's own `out_amount` and `slippage_bps` rather than
/// trusting `otherAmountThreshold`, which may be missing or stale.
pub fn minimum_received(out_amount: u64, slippage_bps: u16) -> u64 {
    let kept_bps = u128::from(MAX_SLIPPAGE_BPS.saturating_sub(slippage_bps));
    let floored = u128::from(out_amount) * kept_bps / u128::from(MAX_SLIPPAGE_BPS);
    // floored <= out_amount, so this never truncates
    floored as u64
}

pub fn calculate_minimum_received(quote: &Quote) -> u64 {
    minimum_received(quote.out_amount, quote.slippage_bps)
}

/// Parses `priceImpactPct` as reported by the aggregator. A value that is
/// not a finite number is bad upstream data, not a caller error.
pub fn calculate_price_impact(quote: &Quote) -> Result<f64> {
    let raw = quote.price_impact_pct.trim();
    let impact: f64 = raw.parse().map_err(|e| {
        SwapDeskError::api(AGGREGATOR, format!("Invalid priceImpactPct '{}': {}", raw, e), None)
    })?;
    if !impact.is_finite() {
        return Err(SwapDeskError::api(
            AGGREGATOR,
            format!("Invalid priceImpactPct '{}': not a finite number", raw),
            None,
        ));
    }
    Ok(impact)
}

/// Venue label of every hop, in route order. Venues the route revisits appear
/// once per visit.
pub fn get_route_summary(quote: &Quote) -> Vec<String> {
    quote
        .route_plan
        .iter()
        .map(|step| {
            step.swap_info
                .label
                .clone()
                .filter(|label| !label.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_VENUE.to_string())
        })
        .collect()
}
