//! Human-actionable diagnostics for node errors.
//!
//! Recognizes node messages that carry enough structure to tell the operator
//! what to do. Currently that is the insufficient funds message:
//!
//! ```text
//! insufficient funds for gas * price + value: balance B, tx cost C, overshot O
//! ```

use std::{fmt, sync::LazyLock};

use alloy::primitives::{utils::format_ether, Address, U256};
use regex::Regex;

static INSUFFICIENT_FUNDS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"insufficient\sfunds\sfor\sgas\s\*\sprice\s\+\svalue:\sbalance\s(\d+),\stx\scost\s(\d+),\sovershot\s(\d+)",
    )
    .expect("insufficient funds regex is valid")
});

/// Structured diagnosis of a permanent node error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeDiagnostic {
    /// Signer balance does not cover gas * price + value. Amounts in wei.
    InsufficientFunds {
        signer: Address,
        balance: U256,
        cost: U256,
        shortfall: U256,
    },
}

impl NodeDiagnostic {
    pub fn signer(&self) -> Address {
        match self {
            NodeDiagnostic::InsufficientFunds { signer, .. } => *signer,
        }
    }
}

impl fmt::Display for NodeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeDiagnostic::InsufficientFunds {
                signer,
                balance,
                cost,
                shortfall,
            } => write!(
                f,
                "Transaction cost {} ETH, have {} ETH\nFund '{}' at least {} ETH",
                wei_to_ether(*cost),
                wei_to_ether(*balance),
                signer,
                wei_to_ether(*shortfall),
            ),
        }
    }
}

/// Diagnose a node error message on behalf of `signer`.
///
/// Returns `None` when the message has no known structure; callers then
/// report the raw message.
pub fn diagnose_node_error(message: &str, signer: Address) -> Option<NodeDiagnostic> {
    let caps = INSUFFICIENT_FUNDS_REGEX.captures(message)?;
    let wei = |i: usize| U256::from_str_radix(&caps[i], 10).ok();

    Some(NodeDiagnostic::InsufficientFunds {
        signer,
        balance: wei(1)?,
        cost: wei(2)?,
        shortfall: wei(3)?,
    })
}

/// Convert wei to the display unit (1 ether = 10^18 wei).
pub fn wei_to_ether(wei: U256) -> f64 {
    format_ether(wei).parse().unwrap_or(0.0)
}
