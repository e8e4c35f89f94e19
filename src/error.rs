//! Error taxonomy and node error classification.
//!
//! Argument handling fails with [`ArgError`]; submission fails with
//! [`SubmissionError`]. Errors returned by the node are first reduced to
//! their raw message through [`NodeErrorMessage`] and then classified into a
//! [`NodeErrorKind`], which decides whether the submission is retried.

use std::{borrow::Cow, fmt::Display};

use alloy::{
    primitives::Address,
    transports::{RpcError, TransportError},
};

use crate::ext::NodeDiagnostic;

// ============================================================================
// Argument Errors
// ============================================================================

/// Failure while parsing type tokens, signatures or argument values.
///
/// Decoding stops at the first failing element; no partial results are
/// returned alongside one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    #[error("invalid type '{0}'")]
    InvalidTypeGrammar(String),

    #[error("found {found} arguments, expected {expected} from ABI")]
    ArityMismatch { found: usize, expected: usize },

    #[error("invalid value: {0}")]
    ValueTypeMismatch(String),

    #[error("expected data of length {expected}, got {found}")]
    InvalidByteLength { expected: usize, found: usize },

    #[error("unmatched brackets in '{0}'")]
    UnmatchedBrackets(String),
}

impl ArgError {
    pub(crate) fn mismatch(value: &str, reason: impl Display) -> Self {
        ArgError::ValueTypeMismatch(format!("'{value}' {reason}"))
    }
}

/// Failure while reading a compiled contract artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact field '{0}' not found")]
    FieldNotFound(&'static str),

    #[error("artifact field '{field}' has the wrong format: {reason}")]
    WrongFieldFormat { field: &'static str, reason: String },

    #[error("invalid artifact document: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Node Error Classification
// ============================================================================

/// Exact node message for a rejected same-nonce replacement.
pub const REPLACEMENT_UNDERPRICED: &str = "replacement transaction underpriced";

/// Prefix of the node message for an already consumed nonce.
pub const NONCE_TOO_LOW: &str = "nonce too low";

/// Prefix of the node message for a signer that cannot pay for the transaction.
pub const INSUFFICIENT_FUNDS: &str = "insufficient funds";

/// Classified node error kinds for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeErrorKind {
    /// Same-nonce transaction already in the mempool with a higher price
    ReplacementUnderpriced,

    /// Nonce already used on chain (also what a resubmitted duplicate reports)
    NonceTooLow,

    /// Balance does not cover gas * price + value
    InsufficientFunds,

    /// Anything else
    Unknown,
}

impl NodeErrorKind {
    /// Whether resubmitting the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            NodeErrorKind::ReplacementUnderpriced | NodeErrorKind::NonceTooLow
        )
    }
}

/// Classify a raw node message.
///
/// Matching is case-sensitive on the node's verbatim texts: the replacement
/// message must be equal, the others are prefixes.
pub fn classify_node_error(message: &str) -> NodeErrorKind {
    if message == REPLACEMENT_UNDERPRICED {
        NodeErrorKind::ReplacementUnderpriced
    } else if message.starts_with(NONCE_TOO_LOW) {
        NodeErrorKind::NonceTooLow
    } else if message.starts_with(INSUFFICIENT_FUNDS) {
        NodeErrorKind::InsufficientFunds
    } else {
        NodeErrorKind::Unknown
    }
}

/// Boxed original error kept as the source of a permanent failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Access to the message a node reported, stripped of transport decoration.
///
/// `node_message` drives classification; `into_source` keeps the full
/// original error (codes, revert data) for the caller.
pub trait NodeErrorMessage: Display {
    fn node_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn into_source(self) -> BoxError
    where
        Self: Sized;
}

impl NodeErrorMessage for String {
    fn node_message(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }

    fn into_source(self) -> BoxError {
        self.into()
    }
}

impl NodeErrorMessage for &str {
    fn node_message(&self) -> Cow<'_, str> {
        Cow::Borrowed(*self)
    }

    fn into_source(self) -> BoxError {
        self.into()
    }
}

impl NodeErrorMessage for anyhow::Error {
    fn into_source(self) -> BoxError {
        self.into()
    }
}

impl NodeErrorMessage for TransportError {
    fn node_message(&self) -> Cow<'_, str> {
        match self {
            RpcError::ErrorResp(payload) => Cow::Borrowed(payload.message.as_ref()),
            other => Cow::Owned(other.to_string()),
        }
    }

    fn into_source(self) -> BoxError {
        Box::new(self)
    }
}

// ============================================================================
// Submission Errors
// ============================================================================

/// Failure surfaced by the submission retrier.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The node rejected the call for a reason retrying will not change.
    #[error("transaction error for signer {signer}: {message}{}", diagnostic_suffix(.diagnostic))]
    Permanent {
        signer: Address,
        kind: NodeErrorKind,
        message: String,
        attempts: u32,
        diagnostic: Option<NodeDiagnostic>,
        /// The error as returned by the last attempt
        #[source]
        source: BoxError,
    },

    /// The cancellation signal fired between attempts.
    #[error("submission cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

impl SubmissionError {
    pub fn kind(&self) -> Option<NodeErrorKind> {
        match self {
            SubmissionError::Permanent { kind, .. } => Some(*kind),
            SubmissionError::Cancelled { .. } => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&NodeDiagnostic> {
        match self {
            SubmissionError::Permanent { diagnostic, .. } => diagnostic.as_ref(),
            SubmissionError::Cancelled { .. } => None,
        }
    }

    /// The original error of a permanent failure.
    pub fn node_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            SubmissionError::Permanent { source, .. } => Some(source.as_ref()),
            SubmissionError::Cancelled { .. } => None,
        }
    }
}

fn diagnostic_suffix(diagnostic: &Option<NodeDiagnostic>) -> String {
    diagnostic
        .as_ref()
        .map(|d| format!("\n{d}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_transient_patterns() {
        assert_eq!(
            classify_node_error("replacement transaction underpriced"),
            NodeErrorKind::ReplacementUnderpriced
        );
        assert_eq!(
            classify_node_error("nonce too low: next nonce 5, tx nonce 3"),
            NodeErrorKind::NonceTooLow
        );
        assert!(NodeErrorKind::ReplacementUnderpriced.is_transient());
        assert!(NodeErrorKind::NonceTooLow.is_transient());
    }

    #[test]
    fn test_classify_is_verbatim() {
        // Equality, not containment, for the replacement message
        assert_eq!(
            classify_node_error("error: replacement transaction underpriced"),
            NodeErrorKind::Unknown
        );
        assert_eq!(classify_node_error("Nonce Too Low"), NodeErrorKind::Unknown);
    }

    #[test]
    fn test_classify_permanent() {
        let kind = classify_node_error(
            "insufficient funds for gas * price + value: balance 1, tx cost 2, overshot 1",
        );
        assert_eq!(kind, NodeErrorKind::InsufficientFunds);
        assert!(!kind.is_transient());
        assert!(!NodeErrorKind::Unknown.is_transient());
    }

    #[test]
    fn test_node_message_strips_transport_text() {
        let payload: alloy::rpc::json_rpc::ErrorPayload = serde_json::from_str(
            r#"{"code":-32000,"message":"replacement transaction underpriced"}"#,
        )
        .unwrap();
        let err: TransportError = RpcError::ErrorResp(payload);
        assert_eq!(err.node_message(), REPLACEMENT_UNDERPRICED);
        assert_ne!(err.to_string(), REPLACEMENT_UNDERPRICED);
    }

    #[test]
    fn test_arity_message() {
        let err = ArgError::ArityMismatch {
            found: 3,
            expected: 2,
        };
        assert_eq!(err.to_string(), "found 3 arguments, expected 2 from ABI");
    }
}
