use crate::error::Result;
use async_trait::async_trait;
use solana_account_decoder::parse_token::UiTokenAmount;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_request::TokenAccountsFilter,
    rpc_response::RpcKeyedAccount,
};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use solana_transaction_status::TransactionStatus;
use std::time::Duration;

/// SPL Token program, used to scope token-account lookups.
pub const TOKEN_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// The chain operations the gateway needs from a single endpoint.
///
/// Implementations talk to exactly one endpoint and never fail over on their
/// own; any error they return is treated as that endpoint being unavailable.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn get_slot(&self) -> Result<u64>;

    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<Account>>;

    async fn get_token_accounts_by_owner(&self, owner: &Pubkey) -> Result<Vec<RpcKeyedAccount>>;

    async fn get_token_supply(&self, mint: &Pubkey) -> Result<UiTokenAmount>;

    async fn send_transaction(&self, transaction: &VersionedTransaction) -> Result<Signature>;

    /// `None` while the cluster has not seen the signature yet.
    async fn get_signature_status(&self, signature: &Signature) -> Result<Option<TransactionStatus>>;
}

/// [`ChainRpc`] over the Solana JSON-RPC HTTP client.
pub struct SolanaRpc {
    client: RpcClient,
}

impl SolanaRpc {
    pub fn new(url: &str, timeout: Duration, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(url.to_string(), timeout, commitment),
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

impl std::fmt::Debug for SolanaRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpc")
            .field("url", &self.client.url())
            .finish()
    }
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    async fn get_slot(&self) -> Result<u64> {
        Ok(self.client.get_slot().await?)
    }

    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<Account>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_token_accounts_by_owner(&self, owner: &Pubkey) -> Result<Vec<RpcKeyedAccount>> {
        Ok(self
            .client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(TOKEN_PROGRAM_ID))
            .await?)
    }

    async fn get_token_supply(&self, mint: &Pubkey) -> Result<UiTokenAmount> {
        Ok(self.client.get_token_supply(mint).await?)
    }

    async fn send_transaction(&self, transaction: &VersionedTransaction) -> Result<Signature> {
        Ok(self.client.send_transaction(transaction).await?)
    }

    async fn get_signature_status(&self, signature: &Signature) -> Result<Option<TransactionStatus>> {
        let response = self.client.get_signature_statuses(&[*signature]).await?;
        Ok(response.value.into_iter().next().flatten())
    }
}
