use thiserror::Error;
use std::fmt;
use reqwest::StatusCode;

mod utils;
pub use utils::*;

/// One endpoint's failure inside a failover sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFailure {
    pub endpoint_name: String,
    pub endpoint_url: String,
    pub reason: String,
}

impl fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.endpoint_name, self.endpoint_url, self.reason)
    }
}

/// Every endpoint tried during one call, in attempt order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailoverReport(pub Vec<EndpointFailure>);

impl FailoverReport {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn failures(&self) -> &[EndpointFailure] {
        &self.0
    }

    pub fn endpoint_names(&self) -> Vec<&str> {
        self.0.iter().map(|f| f.endpoint_name.as_str()).collect()
    }
}

impl fmt::Display for FailoverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum SwapDeskError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Solana RPC error: {0}")]
    SolanaRpc(String),

    #[error("All {} RPC endpoints failed during {operation}: {report}", .report.len())]
    AllEndpointsFailed {
        operation: String,
        report: FailoverReport,
    },

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("API error: {service} - {message}")]
    Api {
        service: String,
        message: String,
        status: Option<u16>,
    },

    #[error("Swap build error: {0}")]
    Build(String),

    #[error("Broadcast error: {0}")]
    Broadcast(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {status} - {message}")]
    HttpError {
        status: StatusCode,
        message: String,
    },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, SwapDeskError>;

impl SwapDeskError {
    pub fn api(service: impl Into<String>, message: impl Into<String>, status: Option<u16>) -> Self {
        SwapDeskError::Api {
            service: service.into(),
            message: message.into(),
            status,
        }
    }

    pub fn all_endpoints_failed(operation: impl Into<String>, failures: Vec<EndpointFailure>) -> Self {
        SwapDeskError::AllEndpointsFailed {
            operation: operation.into(),
            report: FailoverReport(failures),
        }
    }

    /// Errors a caller may reasonably re-invoke the same operation on.
    /// Nothing inside this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            SwapDeskError::AllEndpointsFailed { .. }
            | SwapDeskError::Timeout(_)
            | SwapDeskError::NetworkError(_)
            | SwapDeskError::QuoteUnavailable(_) => true,
            SwapDeskError::Api { status: Some(status), .. } => *status >= 500 || *status == 429,
            SwapDeskError::HttpError { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SwapDeskError {
    fn from(err: reqwest::Error) -> Self {
        handle_reqwest_error(err, "HTTP request")
    }
}

impl From<solana_client::client_error::ClientError> for SwapDeskError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        SwapDeskError::SolanaRpc(err.to_string())
    }
}
