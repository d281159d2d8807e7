//! Failover gateway over a pool of interchangeable RPC endpoints.
//!
//! Every call sweeps the pool once, starting at the current endpoint:
//! a success makes the answering endpoint current (sticky), a total outage
//! resets the pool to the primary so the next call starts from the top.

mod client;
mod endpoint;

pub use client::{ChainRpc, SolanaRpc, TOKEN_PROGRAM_ID};
pub use endpoint::{default_endpoints, parse_endpoint_list, Endpoint, EndpointPool, DEFAULT_ENDPOINTS};

use crate::error::{endpoint_failure_reason, EndpointFailure, Result, SwapDeskError};
use solana_account_decoder::parse_token::UiTokenAmount;
use solana_client::rpc_response::RpcKeyedAccount;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use solana_transaction_status::TransactionStatus;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Upper bound for a single attempt against a single endpoint.
    pub attempt_timeout: Duration,
    pub commitment: CommitmentConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(10),
            commitment: CommitmentConfig::confirmed(),
        }
    }
}

pub struct RpcGateway {
    pool: EndpointPool,
    clients: Vec<Arc<dyn ChainRpc>>,
    attempt_timeout: Duration,
}

impl std::fmt::Debug for RpcGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcGateway")
            .field("pool", &self.pool)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl RpcGateway {
    /// Builds a gateway with one Solana JSON-RPC client per endpoint. An empty
    /// list falls back to [`DEFAULT_ENDPOINTS`].
    pub fn new(endpoints: Vec<Endpoint>, config: &GatewayConfig) -> Result<Self> {
        let endpoints = if endpoints.is_empty() {
            default_endpoints()
        } else {
            endpoints
        };

        let routes = endpoints
            .into_iter()
            .map(|endpoint| {
                let client: Arc<dyn ChainRpc> = Arc::new(SolanaRpc::new(
                    endpoint.url(),
                    config.attempt_timeout,
                    config.commitment,
                ));
                (endpoint, client)
            })
            .collect();

        Self::from_clients(routes, config.attempt_timeout)
    }

    pub fn with_default_endpoints(config: &GatewayConfig) -> Result<Self> {
        Self::new(default_endpoints(), config)
    }

    /// Builds a gateway over caller-supplied clients, in failover order.
    pub fn from_clients(
        routes: Vec<(Endpoint, Arc<dyn ChainRpc>)>,
        attempt_timeout: Duration,
    ) -> Result<Self> {
        let (endpoints, clients): (Vec<_>, Vec<_>) = routes.into_iter().unzip();
        let pool = EndpointPool::new(endpoints)?;

        info!(
            endpoints = pool.len(),
            primary = %pool.current(),
            attempt_timeout_ms = attempt_timeout.as_millis() as u64,
            "RPC gateway initialized"
        );

        Ok(Self {
            pool,
            clients,
            attempt_timeout,
        })
    }

    pub fn current_endpoint(&self) -> Endpoint {
        self.pool.current().clone()
    }

    pub fn current_index(&self) -> usize {
        self.pool.current_index()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        self.pool.endpoints()
    }

    pub async fn get_current_slot(&self) -> Result<u64> {
        self.with_failover("getSlot", |client| async move { client.get_slot().await })
            .await
    }

    pub async fn get_account_info(&self, address: &Pubkey) -> Result<Option<Account>> {
        let address = *address;
        self.with_failover("getAccountInfo", move |client| async move {
            client.get_account_info(&address).await
        })
        .await
    }

    pub async fn get_token_accounts_by_owner(&self, owner: &Pubkey) -> Result<Vec<RpcKeyedAccount>> {
        let owner = *owner;
        self.with_failover("getTokenAccountsByOwner", move |client| async move {
            client.get_token_accounts_by_owner(&owner).await
        })
        .await
    }

    pub async fn get_token_supply(&self, mint: &Pubkey) -> Result<UiTokenAmount> {
        let mint = *mint;
        self.with_failover("getTokenSupply", move |client| async move {
            client.get_token_supply(&mint).await
        })
        .await
    }

    /// Broadcasts a signed transaction. Endpoints are still tried one after
    /// another, never in parallel.
    pub async fn send_transaction(&self, transaction: &VersionedTransaction) -> Result<Signature> {
        let transaction = Arc::new(transaction.clone());
        self.with_failover("sendTransaction", move |client| {
            let transaction = Arc::clone(&transaction);
            async move { client.send_transaction(&transaction).await }
        })
        .await
    }

    pub async fn get_signature_status(&self, signature: &Signature) -> Result<Option<TransactionStatus>> {
        let signature = *signature;
        self.with_failover("getSignatureStatuses", move |client| async move {
            client.get_signature_status(&signature).await
        })
        .await
    }

    /// Runs `call` against each endpoint at most once, starting from the
    /// current one, until one succeeds.
    async fn with_failover<T, F, Fut>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Fn(Arc<dyn ChainRpc>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let total = self.pool.len();
        // One snapshot per call; concurrent calls never see each other's
        // half-finished sweep.
        let start = self.pool.current_index();
        let mut failures = Vec::with_capacity(total);

        for attempt in 0..total {
            let index = (start + attempt) % total;
            let endpoint = self.pool.get(index);
            let client = Arc::clone(&self.clients[index]);

            debug!(
                operation,
                endpoint = endpoint.name(),
                attempt = attempt + 1,
                "Trying RPC endpoint"
            );

            let outcome = match timeout(self.attempt_timeout, call(client)).await {
                Ok(result) => result,
                Err(_) => Err(SwapDeskError::Timeout(format!(
                    "timed out after {} ms",
                    self.attempt_timeout.as_millis()
                ))),
            };

            match outcome {
                Ok(value) => {
                    if index != start {
                        info!(
                            operation,
                            from = self.pool.get(start).name(),
                            to = endpoint.name(),
                            "Switched current RPC endpoint"
                        );
                    }
                    self.pool.select(index);
                    return Ok(value);
                }
                Err(e) => {
                    let reason = endpoint_failure_reason(&e);
                    warn!(
                        operation,
                        endpoint = endpoint.name(),
                        url = endpoint.url(),
                        attempt = attempt + 1,
                        error = %reason,
                        "RPC endpoint failed"
                    );
                    failures.push(EndpointFailure {
                        endpoint_name: endpoint.name().to_string(),
                        endpoint_url: endpoint.url().to_string(),
                        reason,
                    });
                }
            }
        }

        self.pool.reset();
        error!(
            operation,
            endpoints = total,
            "All RPC endpoints failed, resetting to primary"
        );
        Err(SwapDeskError::all_endpoints_failed(operation, failures))
    }
}
