//! Transaction payloads exchanged with the node client and the records the
//! wallet keeps about sent transactions.
//!
//! All monetary values are in smallest units. Raw transaction bytes are
//! carried hex-encoded, exactly as the node returns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::AddressHash;
use crate::constants::Network;

/// Kind of a wallet transaction, also the tag passed to sign-and-broadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Sweep of an address into itself.
    Consolidation,
    /// Partial send to another address.
    Transfer,
    /// Sweep of an address into another address.
    Sweep,
    /// Script or contract execution.
    Contract,
}

impl TransactionType {
    /// Lowercase tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consolidation => "consolidation",
            Self::Transfer => "transfer",
            Self::Sweep => "sweep",
            Self::Contract => "contract",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confirmation state of a transaction record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Broadcast by this wallet, not yet seen in a block.
    Pending,
    /// Included in a block.
    Confirmed,
}

/// A single transaction built by the node, awaiting a signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTx {
    /// Transaction id (hex).
    pub tx_id: String,
    /// Serialized unsigned transaction (hex).
    pub unsigned_tx: String,
    /// Shard group of the inputs.
    pub from_group: u32,
    /// Shard group of the main output.
    pub to_group: u32,
    /// Gas units reserved for the transaction.
    pub gas_amount: u64,
    /// Price per gas unit in smallest units.
    pub gas_price: u128,
}

impl UnsignedTx {
    /// Fee in smallest units: `gas_amount * gas_price`.
    ///
    /// Returns `None` on overflow.
    pub fn fee(&self) -> Option<u128> {
        (self.gas_amount as u128).checked_mul(self.gas_price)
    }
}

/// One transaction of a sweep batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepTx {
    /// Transaction id (hex).
    pub tx_id: String,
    /// Serialized unsigned transaction (hex).
    pub unsigned_tx: String,
}

/// Result of asking the node to sweep an address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepBuild {
    /// Transactions in the order they must be broadcast.
    pub unsigned_txs: Vec<SweepTx>,
    /// Aggregate fee of all transactions.
    pub fees: u128,
}

/// Parameters for building a partial transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    /// Source address.
    pub from: AddressHash,
    /// Source public key (hex).
    pub from_public_key: String,
    /// Destination address.
    pub to: AddressHash,
    /// Amount in smallest units.
    pub amount: u128,
    /// Gas amount override.
    pub gas_amount: Option<u64>,
    /// Gas price override in smallest units.
    pub gas_price: Option<u128>,
}

/// Parameters for building a script execution transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCallRequest {
    /// Calling address.
    pub from: AddressHash,
    /// Calling address public key (hex).
    pub from_public_key: String,
    /// Compiled script bytecode (hex).
    pub bytecode: String,
    /// Coins attached to the call, in smallest units.
    pub amount: Option<u128>,
    /// Gas amount override.
    pub gas_amount: Option<u64>,
    /// Gas price override in smallest units.
    pub gas_price: Option<u128>,
}

/// One sign-and-broadcast call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignAndSendRequest {
    /// Address whose key signs the transaction.
    pub from: AddressHash,
    /// Transaction id to sign.
    pub tx_id: String,
    /// Serialized unsigned transaction (hex).
    pub unsigned_tx: String,
    /// Recipient recorded in the pending entry.
    pub destination: AddressHash,
    /// Transaction tag.
    pub tx_type: TransactionType,
    /// Network the transaction is broadcast on.
    pub network: Network,
    /// Amount sent, when meaningful for the tag.
    pub amount: Option<u128>,
}

/// A transaction accepted by the node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentTx {
    /// Transaction id as reported by the node.
    pub tx_id: String,
    /// Signature produced for the transaction (hex).
    pub signature: String,
}

/// A transaction as shown in the history list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction id.
    pub tx_id: String,
    /// Source address.
    pub from_address: String,
    /// Destination address.
    pub to_address: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Kind of transaction.
    pub tx_type: TransactionType,
    /// Network the transaction lives on.
    pub network: Network,
    /// Pending or confirmed.
    pub status: TransactionStatus,
    /// Amount moved, in smallest units.
    pub amount: Option<u128>,
    /// Time until which the outputs are locked.
    pub lock_time: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    /// Optimistic entry for a transaction this wallet just broadcast.
    pub fn pending(request: &SignAndSendRequest, sent: &SentTx, timestamp: DateTime<Utc>) -> Self {
        Self {
            tx_id: sent.tx_id.clone(),
            from_address: request.from.to_string(),
            to_address: request.destination.to_string(),
            timestamp: timestamp.timestamp_millis(),
            tx_type: request.tx_type,
            network: request.network,
            status: TransactionStatus::Pending,
            amount: request.amount,
            lock_time: None,
        }
    }

    /// Whether the record is still waiting for confirmation.
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}

/// Signing result handed back to a wallet-connect session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTransferTxResult {
    /// Shard group of the inputs.
    pub from_group: u32,
    /// Shard group of the main output.
    pub to_group: u32,
    /// Serialized unsigned transaction (hex).
    pub unsigned_tx: String,
    /// Transaction id.
    pub tx_id: String,
    /// Signature (hex).
    pub signature: String,
    /// Gas units reserved.
    pub gas_amount: u64,
    /// Price per gas unit in smallest units.
    pub gas_price: u128,
}

/// Severity of a user-facing notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    /// Neutral progress information.
    Info,
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Alert,
}

/// Snackbar-style message for the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub kind: NotificationKind,
    /// Message text.
    pub text: String,
}

impl Notification {
    /// Informational message.
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Info, text: text.into() }
    }

    /// Success message.
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, text: text.into() }
    }

    /// Failure message.
    pub fn alert(text: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Alert, text: text.into() }
    }
}

/// Emitted once when a send session completes successfully.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendCompletion {
    /// Kind of the last transaction sent.
    pub tx_type: TransactionType,
    /// Ids of every transaction broadcast by the session, in order.
    pub tx_ids: Vec<String>,
    /// Signature of the transaction, for single-transaction sends.
    pub signature: Option<String>,
    /// Signing result for a wallet-connect request, when one was made.
    pub wallet_connect: Option<SignTransferTxResult>,
}
