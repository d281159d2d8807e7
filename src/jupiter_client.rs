use crate::error::{handle_reqwest_error, Result, SwapDeskError};
use crate::executor::SwapOptions;
use crate::quote::QuoteRequest;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::VersionedTransaction;
use std::time::Duration;
use swapdesk_types::Quote;
use tracing::{debug, info};

pub const DEFAULT_JUPITER_API_URL: &str = "https://quote-api.jup.ag/v6";

const SERVICE: &str = "jupiter";

/// Everything the aggregator needs to build the unsigned swap transaction.
#[derive(Debug, Clone)]
pub struct SwapBuildRequest {
    pub quote: Quote,
    pub user_public_key: Pubkey,
    pub options: SwapOptions,
}

/// The swap aggregator as seen by this crate.
#[async_trait]
pub trait SwapAggregator: Send + Sync {
    /// Best route for the request, or `None` when the aggregator answered with
    /// nothing usable.
    async fn quote(&self, request: &QuoteRequest) -> Result<Option<Quote>>;

    /// Base64 serialized unsigned transaction, or `None` when the response
    /// carried no transaction.
    async fn build_swap_transaction(&self, request: &SwapBuildRequest) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct JupiterConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_JUPITER_API_URL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(15),
        }
    }
}

// Error bodies come back as `{ "error": "...", "errorCode": "..." }`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum QuoteApiResponse {
    Quote(Box<Quote>),
    Error {
        error: String,
        #[serde(rename = "errorCode", default)]
        error_code: Option<String>,
    },
}

// SwapRequest is only ever built by JupiterClient::build_swap_transaction
#[derive(Serialize, Debug)]
struct SwapRequest<'a> {
    #[serde(rename = "userPublicKey")]
    user_public_key: String,
    #[serde(rename = "wrapAndUnwrapSol")]
    wrap_and_unwrap_sol: bool,
    #[serde(rename = "dynamicComputeUnitLimit")]
    dynamic_compute_unit_limit: bool,
    #[serde(rename = "computeUnitPriceMicroLamports", skip_serializing_if = "Option::is_none")]
    compute_unit_price_micro_lamports: Option<u64>,
    #[serde(rename = "prioritizationFeeLamports", skip_serializing_if = "Option::is_none")]
    prioritization_fee_lamports: Option<u64>,
    #[serde(rename = "asLegacyTransaction")]
    as_legacy_transaction: bool,
    #[serde(rename = "quoteResponse")]
    quote_response: &'a Quote,
}

#[derive(Deserialize, Debug)]
struct SwapResponse {
    #[serde(rename = "swapTransaction", default)]
    swap_transaction: Option<String>,
    #[serde(rename = "lastValidBlockHeight", default)]
    last_valid_block_height: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

/// Jupiter v6 swap API client
#[derive(Clone)]
pub struct JupiterClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for JupiterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JupiterClient")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl JupiterClient {
    /// Create a new Jupiter API client
    pub fn new(config: &JupiterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| handle_reqwest_error(e, "Building Jupiter HTTP client"))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("x-api-key", key),
            None => builder,
        }
    }

    async fn read_body(response: reqwest::Response, context: &str) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| handle_reqwest_error(e, context))?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(SwapDeskError::api(SERVICE, format!("{}: {}", context, message), Some(status.as_u16())));
        }
        Ok(body)
    }
}

/// Query string for `GET /quote`.
pub fn quote_query(request: &QuoteRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("inputMint", request.input_mint.clone()),
        ("outputMint", request.output_mint.clone()),
        ("amount", request.amount.to_string()),
        ("slippageBps", request.slippage_bps.to_string()),
        ("swapMode", request.swap_mode.as_str().to_string()),
    ];

    let constraints = &request.constraints;
    if constraints.only_direct_routes {
        query.push(("onlyDirectRoutes", "true".to_string()));
    }
    if let Some(restrict) = constraints.restrict_intermediate_tokens {
        query.push(("restrictIntermediateTokens", restrict.to_string()));
    }
    if let Some(max_accounts) = constraints.max_accounts {
        query.push(("maxAccounts", max_accounts.to_string()));
    }
    if !constraints.dexes.is_empty() {
        query.push(("dexes", constraints.dexes.join(",")));
    }
    if !constraints.exclude_dexes.is_empty() {
        query.push(("excludeDexes", constraints.exclude_dexes.join(",")));
    }
    query
}

/// Interprets a successful `GET /quote` body.
pub fn parse_quote_body(body: &str) -> Result<Option<Quote>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }

    match serde_json::from_str::<QuoteApiResponse>(trimmed)? {
        QuoteApiResponse::Quote(quote) if quote.is_empty() => Ok(None),
        QuoteApiResponse::Quote(quote) => Ok(Some(*quote)),
        QuoteApiResponse::Error { error, error_code } => {
            let message = match error_code {
                Some(code) => format!("{} ({})", error, code),
                None => error,
            };
            Err(SwapDeskError::QuoteUnavailable(message))
        }
    }
}

/// Decodes the aggregator's base64 bincode payload into a transaction.
pub fn decode_swap_transaction(payload: &str) -> Result<VersionedTransaction> {
    let bytes = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| SwapDeskError::Build(format!("Failed to decode base64 swap transaction: {}", e)))?;
    bincode::deserialize(&bytes)
        .map_err(|e| SwapDeskError::Build(format!("Failed to deserialize transaction: {}", e)))
}

#[async_trait]
impl SwapAggregator for JupiterClient {
    async fn quote(&self, request: &QuoteRequest) -> Result<Option<Quote>> {
        let url = format!("{}/quote", self.api_url);
        debug!(
            input_mint = %request.input_mint,
            output_mint = %request.output_mint,
            amount = request.amount,
            slippage_bps = request.slippage_bps,
            "Requesting Jupiter quote"
        );

        let response = self
            .with_auth(self.http.get(&url).query(&quote_query(request)))
            .send()
            .await
            .map_err(|e| handle_reqwest_error(e, "Jupiter quote request"))?;

        let body = Self::read_body(response, "Jupiter quote API failed").await?;
        parse_quote_body(&body)
    }

    async fn build_swap_transaction(&self, request: &SwapBuildRequest) -> Result<Option<String>> {
        let url = format!("{}/swap", self.api_url);
        let options = &request.options;
        let swap_request = SwapRequest {
            user_public_key: request.user_public_key.to_string(),
            wrap_and_unwrap_sol: options.wrap_and_unwrap_sol,
            dynamic_compute_unit_limit: options.dynamic_compute_unit_limit,
            compute_unit_price_micro_lamports: options.compute_unit_price_micro_lamports,
            prioritization_fee_lamports: options.prioritization_fee_lamports,
            as_legacy_transaction: options.as_legacy_transaction,
            quote_response: &request.quote,
        };

        let response = self
            .with_auth(self.http.post(&url).json(&swap_request))
            .send()
            .await
            .map_err(|e| handle_reqwest_error(e, "Jupiter swap request"))?;

        let body = Self::read_body(response, "Jupiter swap API failed").await?;
        let parsed: SwapResponse = serde_json::from_str(&body)
            .map_err(|e| SwapDeskError::Build(format!("Failed to parse Jupiter swap response: {}", e)))?;

        if let Some(error) = parsed.error {
            return Err(SwapDeskError::Build(error));
        }

        match parsed.swap_transaction {
            Some(tx) if !tx.trim().is_empty() => {
                info!(
                    user = %request.user_public_key,
                    last_valid_block_height = ?parsed.last_valid_block_height,
                    "Received swap transaction from Jupiter"
                );
                Ok(Some(tx))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::RoutingConstraints;
    use pretty_assertions::assert_eq;
    use solana_sdk::{message::Message, signature::Keypair, signer::Signer, system_instruction, transaction::Transaction};

    fn request() -> QuoteRequest {
        QuoteRequest::new(
            "So11111111111111111111111111111111111111112",
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            1_000_000_000,
            50,
        )
    }

    #[test]
    fn test_quote_query_includes_constraints() {
        let mut req = request();
        req.constraints = RoutingConstraints {
            only_direct_routes: true,
            restrict_intermediate_tokens: Some(true),
            max_accounts: Some(64),
            dexes: vec!["Whirlpool".into(), "Raydium CLMM".into()],
            exclude_dexes: vec![],
        };

        let query = quote_query(&req);
        assert_eq!(query[2], ("amount", "1000000000".to_string()));
        assert_eq!(query[3], ("slippageBps", "50".to_string()));
        assert!(query.contains(&("onlyDirectRoutes", "true".to_string())));
        assert!(query.contains(&("maxAccounts", "64".to_string())));
        assert!(query.contains(&("dexes", "Whirlpool,Raydium CLMM".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "excludeDexes"));
    }

    #[test]
    fn test_parse_quote_body_empty_and_error() {
        assert!(parse_quote_body("").unwrap().is_none());
        assert!(parse_quote_body(" null ").unwrap().is_none());

        let err = parse_quote_body(r#"{"error":"Could not find any route","errorCode":"COULD_NOT_FIND_ANY_ROUTE"}"#)
            .unwrap_err();
        match err {
            SwapDeskError::QuoteUnavailable(msg) => {
                assert_eq!(msg, "Could not find any route (COULD_NOT_FIND_ANY_ROUTE)")
            }
            other => panic!("Expected QuoteUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_quote_body_quote() {
        let body = r#"{
            "inputMint": "So11111111111111111111111111111111111111112",
            "inAmount": "1000000000",
            "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "outAmount": "100000000",
            "otherAmountThreshold": "99500000",
            "swapMode": "ExactIn",
            "slippageBps": 50,
            "priceImpactPct": "0.01",
            "routePlan": [{"swapInfo": {"ammKey": "k", "label": "Meteora DLMM",
                "inputMint": "So11111111111111111111111111111111111111112",
                "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                "inAmount": "1000000000", "outAmount": "100000000",
                "feeAmount": "0", "feeMint": "So11111111111111111111111111111111111111112"}, "percent": 100}],
            "contextSlot": 1, "timeTaken": 0.5
        }"#;
        let quote = parse_quote_body(body).unwrap().unwrap();
        assert_eq!(quote.out_amount, 100_000_000);
        assert_eq!(quote.other_amount_threshold, Some(99_500_000));
        assert_eq!(
            Some(crate::quote::calculate_minimum_received(&quote)),
            quote.other_amount_threshold
        );
        assert_eq!(quote.route_plan[0].swap_info.label.as_deref(), Some("Meteora DLMM"));
    }

    #[test]
    fn test_swap_request_wire_format() {
        let quote = parse_quote_body(
            r#"{"inputMint":"A","inAmount":"5","outputMint":"B","outAmount":"4","slippageBps":10,
                "priceImpactPct":"0","routePlan":[{"swapInfo":{"ammKey":"k","label":null,"inputMint":"A",
                "outputMint":"B","inAmount":"5","outAmount":"4","feeAmount":"0","feeMint":"A"},"percent":100}]}"#,
        )
        .unwrap()
        .unwrap();
        let body = SwapRequest {
            user_public_key: "Owner".to_string(),
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
            compute_unit_price_micro_lamports: None,
            prioritization_fee_lamports: Some(10_000),
            as_legacy_transaction: false,
            quote_response: &quote,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["userPublicKey"], "Owner");
        assert_eq!(json["prioritizationFeeLamports"], 10_000);
        assert!(json.get("computeUnitPriceMicroLamports").is_none());
        assert_eq!(json["quoteResponse"]["inAmount"], "5");
    }

    #[test]
    fn test_decode_swap_transaction() {
        let payer = Keypair::new();
        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        let tx = VersionedTransaction::from(Transaction::new_unsigned(Message::new(&[ix], Some(&payer.pubkey()))));
        let payload = BASE64_STANDARD.encode(bincode::serialize(&tx).unwrap());

        let decoded = decode_swap_transaction(&payload).unwrap();
        assert_eq!(decoded.message, tx.message);

        assert!(matches!(decode_swap_transaction("%%%"), Err(SwapDeskError::Build(_))));
        assert!(matches!(decode_swap_transaction("AAAA"), Err(SwapDeskError::Build(_))));
    }
}
