use super::SwapDeskError;
use tracing::{error, warn};

/// Logs an error with appropriate severity based on the error type.
///
/// # Arguments
/// * `error` - The SwapDeskError to log
/// * `context` - Additional context about where/how the error occurred
pub fn log_error(error: &SwapDeskError, context: &str) {
    match error {
        SwapDeskError::HttpError { status, message } => {
            if status.is_server_error() {
                error!("{} - HTTP error {}: {}", context, status, message);
            } else {
                warn!("{} - HTTP error {}: {}", context, status, message);
            }
        }
        SwapDeskError::NetworkError(msg) | SwapDeskError::Timeout(msg) => {
            warn!("{} - Network error: {}", context, msg);
        }
        SwapDeskError::QuoteUnavailable(msg) => {
            warn!("{} - Quote unavailable: {}", context, msg);
        }
        SwapDeskError::InvalidRequest(msg) => {
            warn!("{} - Invalid request: {}", context, msg);
        }
        SwapDeskError::AllEndpointsFailed { operation, report } => {
            error!(
                endpoints = report.len(),
                "{} - All RPC endpoints failed during {}: {}", context, operation, report
            );
        }
        SwapDeskError::InvalidConfig(msg) => {
            error!("{} - Configuration error: {}", context, msg);
        }
        SwapDeskError::InternalError(msg) => {
            error!("{} - Internal error: {}", context, msg);
        }
        _ => error!("{} - Unexpected error: {}", context, error),
    }
}

/// Converts a reqwest error to a SwapDeskError with additional context.
///
/// # Arguments
/// * `error` - The reqwest error to convert
/// * `context` - Additional context about the request that failed
pub fn handle_reqwest_error(error: reqwest::Error, context: &str) -> SwapDeskError {
    if error.is_timeout() {
        SwapDeskError::Timeout(format!("{}: Request timed out - {}", context, error))
    } else if let Some(status) = error.status() {
        SwapDeskError::HttpError {
            status,
            message: format!("{}: {}", context, error),
        }
    } else if error.is_decode() {
        SwapDeskError::api(context, format!("Malformed response body: {}", error), None)
    } else {
        SwapDeskError::NetworkError(format!("{}: {}", context, error))
    }
}

/// Collapses an error into the one-line reason recorded for a failed endpoint.
pub fn endpoint_failure_reason(error: &SwapDeskError) -> String {
    match error {
        SwapDeskError::SolanaRpc(msg)
        | SwapDeskError::NetworkError(msg)
        | SwapDeskError::Timeout(msg) => msg.clone(),
        other => other.to_string(),
    }
}
