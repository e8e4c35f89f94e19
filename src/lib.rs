//! # alloy-deployer
//!
//! Contract deployment and method calls driven by plain-text arguments,
//! built on Alloy.
//!
//! ## Core Features
//!
//! - **Type Grammar**: Parses contract type tokens (`uint24`, `bytes32[4]`, `(address,uint256)[]`)
//! - **Argument Decoding**: Turns text values into typed values, recursively over arrays and tuples
//! - **Interface Synthesis**: Builds a one-entry interface document from a bare `name(type,...)` signature
//! - **Submission Retry**: Resubmits on transient node errors (replacement underpriced, nonce too low)
//! - **Node Error Diagnostics**: Explains insufficient funds failures in ETH for the failing signer
//!
//! ## Usage
//!
//! ```ignore
//! use alloy_deployer::ext::*;
//!
//! let client = ContractClient::connect(rpc_url, parse_signer(key)?, ClientConfig::default())?;
//! let deployment = client.deploy(&Artifact::from_json(&json)?, &["Token", "TKN"]).await?;
//! client.transact(deployment.address, "mint(address,uint256)", &[to, "100"]).await?;
//! ```

// ============================================================================
// Internal Module Declarations
// ============================================================================

/// Compiled contract artifacts (bytecode and constructor types)
mod artifact;

/// Text argument decoding and conversion to encoder values
mod decoder;

/// Human-readable diagnostics for permanent node errors
mod diagnostic;

/// Argument, artifact and submission errors; node error classification
mod error;

/// Interface descriptors synthesized from bare signatures
mod interface;

/// Contract client tying decoding, encoding and submission together
mod provider;

/// Submission retry loop with injected sleeper and cancellation
mod retry;

/// Bracket-aware splitting and signature parsing
mod signature;

/// Type token grammar
mod type_grammar;

/// Test harness module (compiled only in test mode)
#[cfg(test)]
pub mod test_harness;

// ============================================================================
// Public Exports
// ============================================================================

/// Re-export all public APIs from the alloy crate.
/// Users can access full alloy functionality directly through alloy_deployer.
pub use alloy::*;

/// Extension module containing the deployer API:
///
/// - `TypeDescriptor` / `parse_type` - Type grammar
/// - `decode_arguments` / `DecodedValue` - Argument decoding
/// - `FunctionDescriptor` - Synthesized interface entries
/// - `SubmissionRetrier` - Transient error retry loop
/// - `ContractClient` - Deploy and transact
pub mod ext {
    pub use super::artifact::*;
    pub use super::decoder::*;
    pub use super::diagnostic::*;
    pub use super::error::*;
    pub use super::interface::*;
    pub use super::provider::*;
    pub use super::retry::*;
    pub use super::signature::*;
    pub use super::type_grammar::*;
}
