mod confirmation;
mod handle;

pub use confirmation::ConfirmationPolicy;
pub use handle::SwapHandle;

use crate::error::{Result, SwapDeskError};
use crate::gateway::RpcGateway;
use crate::jupiter_client::{decode_swap_transaction, SwapAggregator, SwapBuildRequest};
use crate::quote::metrics;
use crate::wallet::WalletSigner;
use serde::{Deserialize, Serialize};
use solana_sdk::signature::Signature;
use std::sync::Arc;
use swapdesk_types::{Quote, SwapFailure, SwapFailureKind, SwapResult};
use tracing::{info, info_span, warn, Instrument};

/// Reported when the aggregator's build response carries no transaction.
pub const NO_SWAP_TRANSACTION: &str = "No swap transaction received";

/// Transaction-build options forwarded to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOptions {
    pub wrap_and_unwrap_sol: bool,
    pub dynamic_compute_unit_limit: bool,
    pub compute_unit_price_micro_lamports: Option<u64>,
    pub prioritization_fee_lamports: Option<u64>,
    pub as_legacy_transaction: bool,
}

impl Default for SwapOptions {
    fn default() -> Self {
        Self {
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
            compute_unit_price_micro_lamports: None,
            prioritization_fee_lamports: None,
            as_legacy_transaction: false,
        }
    }
}

/// Drives a quote to an on-chain outcome: build, sign, broadcast, confirm.
pub struct SwapOrchestrator {
    gateway: Arc<RpcGateway>,
    aggregator: Arc<dyn SwapAggregator>,
    confirmation: ConfirmationPolicy,
}

impl std::fmt::Debug for SwapOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapOrchestrator")
            .field("gateway", &self.gateway)
            .field("aggregator", &"<SwapAggregator>")
            .field("confirmation", &self.confirmation)
            .finish()
    }
}

impl SwapOrchestrator {
    pub fn new(gateway: Arc<RpcGateway>, aggregator: Arc<dyn SwapAggregator>) -> Self {
        Self {
            gateway,
            aggregator,
            confirmation: ConfirmationPolicy::default(),
        }
    }

    pub fn with_confirmation_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.confirmation = policy;
        self
    }

    pub fn gateway(&self) -> &Arc<RpcGateway> {
        &self.gateway
    }

    pub fn confirmation_policy(&self) -> &ConfirmationPolicy {
        &self.confirmation
    }

    /// Executes a swap for `quote` signed by `wallet`.
    ///
    /// Returns as soon as the transaction is broadcast, with the result
    /// `Pending`; a background task then settles the same result. Failures
    /// before broadcast come back already `Failed` with an empty signature
    /// and no background task. This never returns an error.
    pub async fn execute_swap(
        &self,
        quote: &Quote,
        wallet: &dyn WalletSigner,
        options: &SwapOptions,
    ) -> SwapHandle {
        let input_amount = quote.in_amount;
        let output_amount = quote.out_amount;

        let signature = match self.submit(quote, wallet, options).await {
            Ok(signature) => signature,
            Err(failure) => {
                warn!(
                    kind = ?failure.kind,
                    error = %failure.message,
                    input_mint = %quote.input_mint,
                    output_mint = %quote.output_mint,
                    "Swap failed before broadcast"
                );
                return SwapHandle::settled(SwapResult::rejected(failure, input_amount, output_amount));
            }
        };

        info!(
            %signature,
            input_amount,
            output_amount,
            endpoint = self.gateway.current_endpoint().name(),
            "Swap broadcast, awaiting confirmation"
        );

        let (mut handle, writer) =
            SwapHandle::pending(SwapResult::pending(signature.to_string(), input_amount, output_amount));

        let task = tokio::spawn(
            confirmation::track_confirmation(
                Arc::clone(&self.gateway),
                signature,
                self.confirmation.clone(),
                writer,
            )
            .instrument(info_span!("swap_confirmation", signature = %signature)),
        );
        handle.attach_tracker(task.abort_handle());
        handle
    }

    /// Build, sign and broadcast. Every error here is terminal for the swap.
    async fn submit(
        &self,
        quote: &Quote,
        wallet: &dyn WalletSigner,
        options: &SwapOptions,
    ) -> std::result::Result<Signature, SwapFailure> {
        let request = SwapBuildRequest {
            quote: quote.clone(),
            user_public_key: wallet.public_key(),
            options: options.clone(),
        };

        let payload = match self.aggregator.build_swap_transaction(&request).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return Err(SwapFailure::new(SwapFailureKind::Build, NO_SWAP_TRANSACTION)),
            Err(e) => return Err(SwapFailure::new(SwapFailureKind::Build, failure_message(&e))),
        };

        let unsigned = decode_swap_transaction(&payload)
            .map_err(|e| SwapFailure::new(SwapFailureKind::Build, failure_message(&e)))?;

        let signed = wallet
            .sign_transaction(unsigned)
            .await
            .map_err(|e| SwapFailure::new(e.failure_kind(), e.to_string()))?;

        if signed
            .signatures
            .first()
            .map_or(true, |signature| *signature == Signature::default())
        {
            return Err(SwapFailure::new(
                SwapFailureKind::Signing,
                "Wallet returned an unsigned transaction",
            ));
        }

        self.gateway
            .send_transaction(&signed)
            .await
            .map_err(|e| SwapFailure::new(SwapFailureKind::Broadcast, failure_message(&e)))
    }

    pub fn calculate_price_impact(&self, quote: &Quote) -> Result<f64> {
        metrics::calculate_price_impact(quote)
    }

    pub fn calculate_minimum_received(&self, quote: &Quote) -> u64 {
        metrics::calculate_minimum_received(quote)
    }

    pub fn get_route_summary(&self, quote: &Quote) -> Vec<String> {
        metrics::get_route_summary(quote)
    }
}

fn failure_message(error: &SwapDeskError) -> String {
    match error {
        SwapDeskError::Build(msg) | SwapDeskError::Broadcast(msg) => msg.clone(),
        other => other.to_string(),
    }
}
