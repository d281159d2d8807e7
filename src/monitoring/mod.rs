use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use std::path::Path;
use crate::error::{Result, SwapDeskError};
use crate::gateway::RpcGateway;
use tracing::{info, warn};

pub const LOG_FILE_PREFIX: &str = "swapdesk.log";

/// Where logs go and how verbose each sink is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub dir: String,
    pub file_prefix: String,
    /// `EnvFilter` directives for the JSON file, e.g. `debug,reqwest=info`
    pub file_level: String,
    pub console_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: "./logs".to_string(),
            file_prefix: LOG_FILE_PREFIX.to_string(),
            file_level: "debug".to_string(),
            console_level: "info".to_string(),
        }
    }
}

fn build_filter(directives: &str, sink: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| {
        SwapDeskError::InvalidConfig(format!("Invalid {} log filter '{}': {}", sink, directives, e))
    })
}

/// Installs the global subscriber: daily-rolled JSON file plus plain console.
/// The returned guard flushes the file writer on drop, so keep it alive.
pub fn init_logging(config: &LogConfig) -> Result<WorkerGuard> {
    // Validate both filters before touching the filesystem.
    let file_filter = build_filter(&config.file_level, "file")?;
    let console_filter = build_filter(&config.console_level, "console")?;

    std::fs::create_dir_all(Path::new(&config.dir))?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(rolling::daily(&config.dir, &config.file_prefix));

    // Span timings (one per confirmation task) go to the file only.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .json()
        .with_current_span(true)
        .with_filter(file_filter);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SwapDeskError::InternalError(format!("Failed to initialize tracing subscriber: {}", e)))?;

    info!(dir = %config.dir, file = %config.file_prefix, "Logging initialized");
    Ok(guard)
}

// --- Health Monitoring ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentStatus {
    Ok,
    Warning(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct ComponentHealth {
    pub name: String,
    pub status: ComponentStatus,
}

/// Probes the chain through the gateway.
///
/// `Warning` when the answer came from a fallback endpoint, `Error` when no
/// endpoint answered.
pub async fn check_gateway_health(gateway: &RpcGateway) -> ComponentHealth {
    let name = "Solana RPC".to_string();
    info!(target: "health_check", component = name.as_str(), "Running check...");

    match gateway.get_current_slot().await {
        Ok(slot) => {
            let endpoint = gateway.current_endpoint();
            if gateway.current_index() == 0 {
                info!(target: "health_check", slot, endpoint = endpoint.name(), "RPC healthy");
                ComponentHealth { name, status: ComponentStatus::Ok }
            } else {
                warn!(target: "health_check", slot, endpoint = endpoint.name(), "RPC served by fallback endpoint");
                ComponentHealth {
                    name,
                    status: ComponentStatus::Warning(format!(
                        "Primary unavailable, serving from {} at slot {}",
                        endpoint, slot
                    )),
                }
            }
        }
        Err(e) => ComponentHealth {
            name,
            status: ComponentStatus::Error(format!("Failed RPC check: {}", e)),
        },
    }
}
