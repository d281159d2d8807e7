pub mod amount;
pub mod quote;
pub mod swap;

pub use quote::{PlatformFee, Quote, RoutePlanStep, SwapInfo, SwapMode};
pub use swap::{SwapFailure, SwapFailureKind, SwapResult, SwapStatus};
