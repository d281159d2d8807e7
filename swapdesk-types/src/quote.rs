use serde::{Deserialize, Serialize};

/// Whether `amount` fixes the input side or the output side of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwapMode {
    #[default]
    ExactIn,
    ExactOut,
}

impl SwapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapMode::ExactIn => "ExactIn",
            SwapMode::ExactOut => "ExactOut",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlatformFee {
    #[serde(with = "crate::amount")]
    pub amount: u64,
    #[serde(rename = "feeBps")]
    pub fee_bps: u16,
}

/// One venue-level exchange step of a route.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SwapInfo {
    #[serde(rename = "ammKey")]
    pub amm_key: String,
    pub label: Option<String>,
    #[serde(rename = "inputMint")]
    pub input_mint: String,
    #[serde(rename = "outputMint")]
    pub output_mint: String,
    #[serde(rename = "inAmount", with = "crate::amount")]
    pub in_amount: u64,
    #[serde(rename = "outAmount", with = "crate::amount")]
    pub out_amount: u64,
    #[serde(rename = "feeAmount", with = "crate::amount")]
    pub fee_amount: u64,
    #[serde(rename = "feeMint")]
    pub fee_mint: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoutePlanStep {
    #[serde(rename = "swapInfo")]
    pub swap_info: SwapInfo,
    pub percent: u8,
}

/// A priced route at one point in time.
///
/// Quotes are immutable values; a changed amount, slippage or asset pair means
/// fetching a new one. The struct round-trips the aggregator's JSON so it can be
/// handed back unchanged when requesting the swap transaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Quote {
    #[serde(rename = "inputMint")]
    pub input_mint: String,
    #[serde(rename = "inAmount", with = "crate::amount")]
    pub in_amount: u64,
    #[serde(rename = "outputMint")]
    pub output_mint: String,
    #[serde(rename = "outAmount", with = "crate::amount")]
    pub out_amount: u64,
    #[serde(
        rename = "otherAmountThreshold",
        default,
        with = "crate::amount::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub other_amount_threshold: Option<u64>,
    #[serde(rename = "swapMode", default)]
    pub swap_mode: SwapMode,
    #[serde(rename = "slippageBps")]
    pub slippage_bps: u16,
    #[serde(rename = "platformFee", default)]
    pub platform_fee: Option<PlatformFee>,
    #[serde(rename = "priceImpactPct")]
    pub price_impact_pct: String,
    #[serde(rename = "routePlan")]
    pub route_plan: Vec<RoutePlanStep>,
    #[serde(rename = "contextSlot", default)]
    pub context_slot: Option<u64>,
    #[serde(rename = "timeTaken", default)]
    pub time_taken: Option<f64>,
}

impl Quote {
    /// A quote with no route and nothing out is what the aggregator returns
    /// when it could not price the pair.
    pub fn is_empty(&self) -> bool {
        self.route_plan.is_empty() && self.out_amount == 0
    }
}
