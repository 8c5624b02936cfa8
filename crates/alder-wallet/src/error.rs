//! Pipeline error types.

use alder_core::error::{AddressError, AmountError, ClientError};
use thiserror::Error;

use crate::modal::ModalStep;

/// Errors raised while turning form input into unsigned transactions.
///
/// A build error never changes the session's context; the form stays
/// editable and the error is shown next to it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Requested amount could not be parsed or is zero.
    #[error("invalid amount: {0}")]
    InvalidAmount(AmountError),

    /// Destination address is malformed.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// Gas amount override is malformed or below the minimum.
    #[error("invalid gas amount: {0}")]
    InvalidGasAmount(String),

    /// Gas price override is malformed or below the minimum.
    #[error("invalid gas price: {0}")]
    InvalidGasPrice(String),

    /// Requested amount exceeds the spendable balance.
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Spendable balance in smallest units.
        available: u128,
        /// Requested amount in smallest units.
        requested: u128,
    },

    /// Source address has nothing spendable to sweep.
    #[error("nothing to sweep")]
    NothingToSweep,

    /// Script bytecode is not valid hex.
    #[error("invalid bytecode: {0}")]
    InvalidBytecode(String),

    /// The node answered a sweep request with no transactions.
    #[error("node returned an empty sweep")]
    EmptySweep,

    /// `gas_amount * gas_price` does not fit in 128 bits.
    #[error("fee overflow")]
    FeeOverflow,

    /// Node client failure, passed through unchanged.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Errors raised while signing and broadcasting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The single transaction of a non-sweep send failed.
    #[error("broadcast failed: {0}")]
    Broadcast(ClientError),

    /// A sweep stopped part-way. Transactions before `position` are
    /// committed on chain; a retry resumes at `position`.
    #[error("sweep transaction {position} of {total} failed after {sent} sent: {source}")]
    SweepInterrupted {
        /// 1-based position of the failing transaction.
        position: usize,
        /// Number of transactions in the sweep.
        total: usize,
        /// Transactions broadcast so far, across attempts.
        sent: usize,
        /// Node failure.
        source: ClientError,
    },
}

/// Errors surfaced by [`TxModal`](crate::modal::TxModal).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    /// Build step failed; the session stays in `Build`.
    #[error("build failed: {0}")]
    Build(#[from] BuildError),

    /// Send was requested without a completed build.
    #[error("nothing to confirm in {0} step")]
    ConfirmationMissing(ModalStep),

    /// Send step failed; the session moved to `Failed`.
    #[error("send failed: {0}")]
    Send(#[from] SendError),

    /// A wallet-connect result was requested without a single unsigned
    /// transaction.
    #[error("no unsigned transaction available")]
    NoUnsignedTransaction,

    /// Operation not permitted in the current step.
    #[error("operation not allowed in {0} step")]
    WrongStep(ModalStep),

    /// A newer operation on the same session replaced this one.
    #[error("superseded by a newer request")]
    Superseded,

    /// The session was closed before the operation finished.
    #[error("transaction modal closed")]
    Closed,
}
