use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Confirmed,
    Failed,
}

impl SwapStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SwapStatus::Pending)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Where in the pipeline a swap failed.
///
/// Everything up to `Broadcast` happens before the transaction reaches the
/// chain and leaves `signature` empty. The remaining kinds are reported after
/// broadcast, with the signature kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapFailureKind {
    Build,
    UserRejected,
    Signing,
    Broadcast,
    OnChain,
    ConfirmationPoll,
    ConfirmationTimeout,
}

impl SwapFailureKind {
    pub fn is_pre_broadcast(&self) -> bool {
        matches!(
            self,
            Self::Build | Self::UserRejected | Self::Signing | Self::Broadcast
        )
    }
}

impl fmt::Display for SwapFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => write!(f, "Swap build failed"),
            Self::UserRejected => write!(f, "Rejected by user"),
            Self::Signing => write!(f, "Signing failed"),
            Self::Broadcast => write!(f, "Broadcast failed"),
            Self::OnChain => write!(f, "Transaction failed on-chain"),
            Self::ConfirmationPoll => write!(f, "Confirmation polling failed"),
            Self::ConfirmationTimeout => write!(f, "Confirmation timed out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapFailure {
    pub kind: SwapFailureKind,
    pub message: String,
}

impl SwapFailure {
    pub fn new(kind: SwapFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SwapFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// One execution attempt of a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapResult {
    /// Base58 transaction signature, empty until broadcast succeeds.
    pub signature: String,
    pub status: SwapStatus,
    pub input_amount: u64,
    pub output_amount: u64,
    pub timestamp: DateTime<Utc>,
    pub error: Option<SwapFailure>,
}

impl SwapResult {
    pub fn pending(signature: impl Into<String>, input_amount: u64, output_amount: u64) -> Self {
        Self {
            signature: signature.into(),
            status: SwapStatus::Pending,
            input_amount,
            output_amount,
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// A result that failed before anything reached the chain.
    pub fn rejected(failure: SwapFailure, input_amount: u64, output_amount: u64) -> Self {
        Self {
            signature: String::new(),
            status: SwapStatus::Failed,
            input_amount,
            output_amount,
            timestamp: Utc::now(),
            error: Some(failure),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}
