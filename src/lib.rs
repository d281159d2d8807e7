// Public modules that are part of the API
pub mod config;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod jupiter_client;
pub mod monitoring;
pub mod quote;
pub mod wallet;

// Re-export common types
pub use gateway::{
    ChainRpc,
    Endpoint,
    GatewayConfig,
    RpcGateway,
};

pub use executor::{
    ConfirmationPolicy,
    SwapHandle,
    SwapOptions,
    SwapOrchestrator,
};

pub use jupiter_client::{
    JupiterClient,
    SwapAggregator,
};

pub use quote::{
    QuoteRequest,
    QuoteService,
    RoutingConstraints,
};

pub use wallet::{
    SignError,
    WalletSigner,
};

pub use error::{
    Result,
    SwapDeskError,
};

pub use swapdesk_types::{
    Quote,
    SwapFailure,
    SwapFailureKind,
    SwapResult,
    SwapStatus,
};
