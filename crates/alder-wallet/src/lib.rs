//! # alder-wallet: staged transaction pipeline.
//!
//! Every send goes through the same state machine ([`TxModal`]): the user's
//! form is turned into one or more unsigned transactions by the node
//! (build), summarized for confirmation (check), then signed and broadcast
//! (send). What differs between transaction kinds is captured by a
//! [`TxStrategy`] implementation.
//!
//! # Modules
//!
//! - [`error`]: `BuildError`, `SendError`, `TxError`
//! - [`gas`]: gas override parsing and validation
//! - [`context`]: per-session `TxContext`
//! - [`strategy`]: `TxStrategy` trait and `SendPlan`
//! - [`sender`]: sequential sign-and-broadcast loop
//! - [`checker`]: confirmation summary
//! - [`transfer`], [`consolidation`], [`contract`]: strategies
//! - [`walletconnect`]: signing result for wallet-connect sessions
//! - [`modal`]: the state machine

pub mod checker;
pub mod consolidation;
pub mod context;
pub mod contract;
pub mod error;
pub mod gas;
pub mod modal;
pub mod sender;
pub mod strategy;
pub mod transfer;
pub mod walletconnect;

#[cfg(test)]
mod test_support;

// Re-exports for convenient access
pub use checker::TxSummary;
pub use consolidation::{ConsolidationData, ConsolidationTx};
pub use context::{BuildOutcome, BuiltTx, TxContext};
pub use contract::{ContractCallData, ContractCallTx};
pub use error::{BuildError, SendError, TxError};
pub use gas::GasSettings;
pub use modal::{ModalStep, TxModal};
pub use sender::{Halt, SendReport};
pub use strategy::{SendPlan, TxStrategy};
pub use transfer::{BuildTransferTxData, TransferTx};
pub use walletconnect::get_wallet_connect_result;
