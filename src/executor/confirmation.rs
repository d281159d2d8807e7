use super::handle::ResultWriter;
use crate::gateway::RpcGateway;
use futures::FutureExt;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use swapdesk_types::{SwapFailure, SwapFailureKind};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// How long a broadcast swap is watched before it is reported as failed.
#[derive(Debug, Clone)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    pub max_attempts: u32,
    pub commitment: CommitmentConfig,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        // 30 polls, 2s apart: about a minute, past the ~150 block blockhash expiry
        Self {
            poll_interval: Duration::from_secs(2),
            max_attempts: 30,
            commitment: CommitmentConfig::confirmed(),
        }
    }
}

/// Polls until the signature settles, then writes the outcome. Never panics
/// out and never returns an error; every outcome ends up in the result.
pub(crate) async fn track_confirmation(
    gateway: Arc<RpcGateway>,
    signature: Signature,
    policy: ConfirmationPolicy,
    writer: ResultWriter,
) {
    let outcome = AssertUnwindSafe(poll_until_settled(&gateway, &signature, &policy))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => {
            info!(%signature, "Swap confirmed");
            writer.confirm();
        }
        Ok(Err(failure)) => {
            warn!(%signature, kind = ?failure.kind, error = %failure.message, "Swap failed after broadcast");
            writer.fail(failure);
        }
        Err(_) => {
            warn!(%signature, "Confirmation task panicked");
            writer.fail(SwapFailure::new(
                SwapFailureKind::ConfirmationPoll,
                "Confirmation task panicked",
            ));
        }
    }
}

async fn poll_until_settled(
    gateway: &RpcGateway,
    signature: &Signature,
    policy: &ConfirmationPolicy,
) -> Result<(), SwapFailure> {
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        match gateway.get_signature_status(signature).await {
            Ok(Some(status)) => {
                if let Some(err) = status.err {
                    return Err(SwapFailure::new(
                        SwapFailureKind::OnChain,
                        format!("Transaction failed on-chain: {}", err),
                    ));
                }
                if status.satisfies_commitment(policy.commitment) {
                    return Ok(());
                }
                debug!(%signature, attempt, confirmation = ?status.confirmation_status, "Awaiting commitment");
            }
            Ok(None) => {
                debug!(%signature, attempt, "Signature not yet seen by cluster");
            }
            Err(e) => {
                return Err(SwapFailure::new(
                    SwapFailureKind::ConfirmationPoll,
                    format!("Failed to poll transaction status: {}", e),
                ));
            }
        }

        if attempt < attempts {
            sleep(policy.poll_interval).await;
        }
    }

    Err(SwapFailure::new(
        SwapFailureKind::ConfirmationTimeout,
        format!(
            "Transaction not confirmed after {} status checks ({} ms apart)",
            attempts,
            policy.poll_interval.as_millis()
        ),
    ))
}
