use crate::error::{Result, SwapDeskError};
use crate::executor::ConfirmationPolicy;
use crate::gateway::{parse_endpoint_list, Endpoint, GatewayConfig};
use crate::jupiter_client::{JupiterConfig, DEFAULT_JUPITER_API_URL};
use crate::monitoring::LogConfig;
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    // Chain RPC
    /// `name=url` pairs separated by commas; unset means the built-in list
    pub rpc_endpoints: Option<String>,
    pub rpc_attempt_timeout_ms: u64,
    pub rpc_commitment: String,

    // Aggregator
    pub jupiter_api_url: String,
    pub jupiter_api_key: Option<String>,
    pub jupiter_request_timeout_ms: u64,

    // Confirmation tracking
    pub confirmation_poll_interval_ms: u64,
    pub confirmation_max_attempts: u32,

    // Logging
    pub log_dir: String,
    pub log_level: Option<String>,

    // Optional quote probe run by the binary
    pub probe_input_mint: Option<String>,
    pub probe_output_mint: Option<String>,
    pub probe_amount: Option<u64>,
    pub probe_slippage_bps: Option<u16>,
}

impl Settings {
    pub fn from_env() -> std::result::Result<Self, config::ConfigError> {
        let config_builder = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .set_default("rpc_attempt_timeout_ms", 10_000)?
            .set_default("rpc_commitment", "confirmed")?
            .set_default("jupiter_api_url", DEFAULT_JUPITER_API_URL)?
            .set_default("jupiter_request_timeout_ms", 15_000)?
            .set_default("confirmation_poll_interval_ms", 2_000)?
            .set_default("confirmation_max_attempts", 30)?
            .set_default("log_dir", "./logs")?;

        let settings = config_builder.build()?;
        settings.try_deserialize()
    }

    /// Configured endpoints; empty means "use the defaults".
    pub fn endpoints(&self) -> Result<Vec<Endpoint>> {
        match self.rpc_endpoints.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_endpoint_list(raw),
            _ => Ok(Vec::new()),
        }
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        match self.rpc_commitment.to_lowercase().as_str() {
            "processed" => Ok(CommitmentConfig::processed()),
            "confirmed" => Ok(CommitmentConfig::confirmed()),
            "finalized" => Ok(CommitmentConfig::finalized()),
            other => Err(SwapDeskError::InvalidConfig(format!(
                "Invalid commitment level: {}",
                other
            ))),
        }
    }

    pub fn gateway_config(&self) -> Result<GatewayConfig> {
        if self.rpc_attempt_timeout_ms == 0 {
            return Err(SwapDeskError::InvalidConfig(
                "rpc_attempt_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(GatewayConfig {
            attempt_timeout: Duration::from_millis(self.rpc_attempt_timeout_ms),
            commitment: self.commitment()?,
        })
    }

    pub fn confirmation_policy(&self) -> Result<ConfirmationPolicy> {
        if self.confirmation_max_attempts == 0 {
            return Err(SwapDeskError::InvalidConfig(
                "confirmation_max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(ConfirmationPolicy {
            poll_interval: Duration::from_millis(self.confirmation_poll_interval_ms),
            max_attempts: self.confirmation_max_attempts,
            commitment: self.commitment()?,
        })
    }

    /// Console verbosity comes from `RUST_LOG` when set, then `LOG_LEVEL`.
    /// The file always records debug.
    pub fn log_config(&self, rust_log: Option<String>) -> LogConfig {
        let console_level = rust_log
            .filter(|level| !level.trim().is_empty())
            .or_else(|| self.log_level.clone())
            .unwrap_or_else(|| "info".to_string());
        LogConfig {
            dir: self.log_dir.clone(),
            console_level,
            ..LogConfig::default()
        }
    }

    pub fn jupiter_config(&self) -> JupiterConfig {
        JupiterConfig {
            api_url: self.jupiter_api_url.clone(),
            api_key: self.jupiter_api_key.clone(),
            request_timeout: Duration::from_millis(self.jupiter_request_timeout_ms),
        }
    }
}
