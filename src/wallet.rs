use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::VersionedTransaction;
use swapdesk_types::SwapFailureKind;
use thiserror::Error;

/// Why a wallet did not return a signed transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    /// The user declined or cancelled the signing prompt.
    #[error("User rejected the transaction: {0}")]
    UserRejected(String),

    #[error("Failed to sign transaction: {0}")]
    Failed(String),
}

impl SignError {
    pub fn failure_kind(&self) -> SwapFailureKind {
        match self {
            SignError::UserRejected(_) => SwapFailureKind::UserRejected,
            SignError::Failed(_) => SwapFailureKind::Signing,
        }
    }
}

/// An externally owned wallet session. This crate never sees private keys;
/// it only hands transactions to the wallet and gets them back signed.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn public_key(&self) -> Pubkey;

    async fn sign_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> std::result::Result<VersionedTransaction, SignError>;
}
