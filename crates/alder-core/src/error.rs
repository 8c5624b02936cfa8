//! Error types shared by the Alder crates.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")] Empty,
    #[error("invalid character {0:?} in amount")] InvalidCharacter(char),
    #[error("more than one decimal point")] MultipleDecimalPoints,
    #[error("too many decimals: {got} > {max}")] TooManyDecimals { got: usize, max: usize },
    #[error("amount overflow")] Overflow,
    #[error("amount must be greater than zero")] Zero,
    #[error("invalid integer: {0}")] InvalidInteger(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("empty address")] Empty,
    #[error("invalid base58: {0}")] InvalidBase58(String),
    #[error("invalid length: {0} bytes")] InvalidLength(usize),
    #[error("locked balance {locked} exceeds balance {balance}")] LockedExceedsBalance { balance: u128, locked: u128 },
}

/// Failures reported by a [`NodeClient`](crate::traits::NodeClient).
///
/// The core never inspects transport details; it only distinguishes the
/// node asking for a consolidation from every other failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("transport: {0}")]
    Transport(String),

    /// The node answered with an error status.
    #[error("node rejected request ({status}): {detail}")]
    Rejected {
        /// HTTP-like status code reported by the node.
        status: u16,
        /// Human readable detail from the node.
        detail: String,
    },

    /// The source address holds too many inputs for a single transfer.
    #[error("consolidation required: {0}")]
    ConsolidationRequired(String),

    /// The node answered with a payload that could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Signing was refused by the wallet (locked wallet, unknown address).
    #[error("signing failed: {0}")]
    Signing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_too_many_decimals() {
        let e = AmountError::TooManyDecimals { got: 19, max: 18 };
        assert_eq!(e.to_string(), "too many decimals: 19 > 18");
    }

    #[test]
    fn display_locked_exceeds_balance() {
        let e = AddressError::LockedExceedsBalance { balance: 5, locked: 6 };
        assert_eq!(e.to_string(), "locked balance 6 exceeds balance 5");
    }

    #[test]
    fn display_rejected() {
        let e = ClientError::Rejected {
            status: 400,
            detail: "bad gas".into(),
        };
        assert_eq!(e.to_string(), "node rejected request (400): bad gas");
    }

    #[test]
    fn clone_and_eq() {
        let e1 = ClientError::Transport("refused".into());
        assert_eq!(e1.clone(), e1);
    }
}
