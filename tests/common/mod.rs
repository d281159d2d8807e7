// Scripted collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use parking_lot::Mutex;
use solana_account_decoder::parse_token::UiTokenAmount;
use solana_client::rpc_response::RpcKeyedAccount;
use solana_sdk::{
    account::Account,
    instruction::InstructionError,
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_instruction,
    transaction::{Transaction, TransactionError, VersionedTransaction},
};
use solana_transaction_status::{TransactionConfirmationStatus, TransactionStatus};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use swapdesk::jupiter_client::{SwapAggregator, SwapBuildRequest};
use swapdesk::{
    ChainRpc, Endpoint, Quote, QuoteRequest, Result, RpcGateway, SignError, SwapDeskError, WalletSigner,
};
use swapdesk_types::{RoutePlanStep, SwapInfo, SwapMode};

pub const SOL: &str = "So11111111111111111111111111111111111111112";
pub const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// Names of endpoints in the order they were called, shared by a test's fakes.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// What the next `getSignatureStatuses` poll reports.
#[derive(Debug, Clone)]
pub enum StatusScript {
    Unseen,
    Processed,
    Confirmed,
    OnChainError,
    RpcError,
}

pub struct ScriptedRpc {
    name: String,
    slot: u64,
    healthy: AtomicBool,
    hang: AtomicBool,
    calls: AtomicUsize,
    log: CallLog,
    statuses: Mutex<VecDeque<StatusScript>>,
}

impl ScriptedRpc {
    pub fn new(name: &str, slot: u64, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            slot,
            healthy: AtomicBool::new(true),
            hang: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            log: Arc::clone(log),
            statuses: Mutex::new(VecDeque::new()),
        })
    }

    pub fn failing(name: &str, log: &CallLog) -> Arc<Self> {
        let rpc = Self::new(name, 0, log);
        rpc.set_healthy(false);
        rpc
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn set_hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn script_statuses(&self, statuses: impl IntoIterator<Item = StatusScript>) {
        self.statuses.lock().extend(statuses);
    }

    async fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push(self.name.clone());
        if self.hang.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SwapDeskError::SolanaRpc(format!("{}: connection refused", self.name)))
        }
    }
}

fn status(err: Option<TransactionError>, confirmation: TransactionConfirmationStatus) -> TransactionStatus {
    TransactionStatus {
        slot: 1_000,
        confirmations: Some(1),
        status: match &err {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        },
        err,
        confirmation_status: Some(confirmation),
    }
}

#[async_trait]
impl ChainRpc for ScriptedRpc {
    async fn get_slot(&self) -> Result<u64> {
        self.enter().await?;
        Ok(self.slot)
    }

    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<Account>> {
        self.enter().await?;
        if *address == Pubkey::default() {
            return Ok(None);
        }
        Ok(Some(Account::new(42, 0, &Pubkey::default())))
    }

    async fn get_token_accounts_by_owner(&self, _owner: &Pubkey) -> Result<Vec<RpcKeyedAccount>> {
        self.enter().await?;
        Ok(Vec::new())
    }

    async fn get_token_supply(&self, _mint: &Pubkey) -> Result<UiTokenAmount> {
        self.enter().await?;
        Ok(UiTokenAmount {
            ui_amount: Some(1_000.0),
            decimals: 6,
            amount: "1000000000".to_string(),
            ui_amount_string: "1000".to_string(),
        })
    }

    async fn send_transaction(&self, transaction: &VersionedTransaction) -> Result<Signature> {
        self.enter().await?;
        Ok(transaction.signatures[0])
    }

    async fn get_signature_status(&self, _signature: &Signature) -> Result<Option<TransactionStatus>> {
        self.enter().await?;
        let next = self.statuses.lock().pop_front().unwrap_or(StatusScript::Unseen);
        match next {
            StatusScript::Unseen => Ok(None),
            StatusScript::Processed => Ok(Some(status(None, TransactionConfirmationStatus::Processed))),
            StatusScript::Confirmed => Ok(Some(status(None, TransactionConfirmationStatus::Confirmed))),
            StatusScript::OnChainError => Ok(Some(status(
                Some(TransactionError::InstructionError(0, InstructionError::Custom(6001))),
                TransactionConfirmationStatus::Confirmed,
            ))),
            StatusScript::RpcError => Err(SwapDeskError::SolanaRpc("node is behind".to_string())),
        }
    }
}

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn gateway(rpcs: &[Arc<ScriptedRpc>], attempt_timeout: Duration) -> RpcGateway {
    let routes = rpcs
        .iter()
        .map(|rpc| {
            let client: Arc<dyn ChainRpc> = rpc.clone();
            (Endpoint::new(rpc.name.clone(), format!("https://{}.rpc.test", rpc.name.to_lowercase())), client)
        })
        .collect();
    RpcGateway::from_clients(routes, attempt_timeout).unwrap()
}

pub fn hop(label: &str, in_amount: u64, out_amount: u64) -> RoutePlanStep {
    RoutePlanStep {
        swap_info: SwapInfo {
            amm_key: Pubkey::new_unique().to_string(),
            label: Some(label.to_string()),
            input_mint: SOL.to_string(),
            output_mint: USDC.to_string(),
            in_amount,
            out_amount,
            fee_amount: 25,
            fee_mint: SOL.to_string(),
        },
        percent: 100,
    }
}

pub fn sample_quote(out_amount: u64, slippage_bps: u16) -> Quote {
    Quote {
        input_mint: SOL.to_string(),
        in_amount: 1_000_000_000,
        output_mint: USDC.to_string(),
        out_amount,
        other_amount_threshold: None,
        swap_mode: SwapMode::ExactIn,
        slippage_bps,
        platform_fee: None,
        price_impact_pct: "0.0042".to_string(),
        route_plan: vec![hop("Whirlpool", 1_000_000_000, out_amount)],
        context_slot: Some(301_000_000),
        time_taken: Some(0.02),
    }
}

pub enum QuoteScript {
    Quote(Quote),
    Empty,
    Unavailable(String),
    Transport(String),
}

pub enum BuildScript {
    Transaction,
    Empty,
    Error(String),
    Garbage,
}

pub struct FakeAggregator {
    quote: QuoteScript,
    build: BuildScript,
    quote_calls: AtomicUsize,
    build_calls: AtomicUsize,
}

impl FakeAggregator {
    pub fn new(quote: QuoteScript, build: BuildScript) -> Arc<Self> {
        Arc::new(Self {
            quote,
            build,
            quote_calls: AtomicUsize::new(0),
            build_calls: AtomicUsize::new(0),
        })
    }

    pub fn building(build: BuildScript) -> Arc<Self> {
        Self::new(QuoteScript::Empty, build)
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn build_calls(&self) -> usize {
        self.build_calls.load(Ordering::SeqCst)
    }
}

pub fn unsigned_swap_payload(payer: &Pubkey) -> String {
    let ix = system_instruction::transfer(payer, &Pubkey::new_unique(), 1_000);
    let tx = VersionedTransaction::from(Transaction::new_unsigned(Message::new(&[ix], Some(payer))));
    BASE64_STANDARD.encode(bincode::serialize(&tx).unwrap())
}

#[async_trait]
impl SwapAggregator for FakeAggregator {
    async fn quote(&self, _request: &QuoteRequest) -> Result<Option<Quote>> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        match &self.quote {
            QuoteScript::Quote(quote) => Ok(Some(quote.clone())),
            QuoteScript::Empty => Ok(None),
            QuoteScript::Unavailable(msg) => Err(SwapDeskError::QuoteUnavailable(msg.clone())),
            QuoteScript::Transport(msg) => Err(SwapDeskError::NetworkError(msg.clone())),
        }
    }

    async fn build_swap_transaction(&self, request: &SwapBuildRequest) -> Result<Option<String>> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        match &self.build {
            BuildScript::Transaction => Ok(Some(unsigned_swap_payload(&request.user_public_key))),
            BuildScript::Empty => Ok(None),
            BuildScript::Error(msg) => Err(SwapDeskError::Build(msg.clone())),
            BuildScript::Garbage => Ok(Some("bm90IGEgdHJhbnNhY3Rpb24=".to_string())),
        }
    }
}

pub enum WalletMode {
    Sign,
    Reject,
    Fail,
    ReturnUnsigned,
}

pub struct TestWallet {
    keypair: Keypair,
    mode: WalletMode,
    sign_calls: AtomicUsize,
}

impl TestWallet {
    pub fn new(mode: WalletMode) -> Self {
        Self {
            keypair: Keypair::new(),
            mode,
            sign_calls: AtomicUsize::new(0),
        }
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletSigner for TestWallet {
    fn public_key(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> std::result::Result<VersionedTransaction, SignError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            WalletMode::Sign => VersionedTransaction::try_new(transaction.message, &[&self.keypair])
                .map_err(|e| SignError::Failed(e.to_string())),
            WalletMode::Reject => Err(SignError::UserRejected("User rejected the request.".to_string())),
            WalletMode::Fail => Err(SignError::Failed("Ledger device disconnected".to_string())),
            WalletMode::ReturnUnsigned => Ok(transaction),
        }
    }
}
