//! Collaborator interfaces consumed by the send pipeline.
//!
//! - [`NodeClient`]: builds, signs and broadcasts transactions (the node
//!   plus whatever wallet holds the keys)
//! - [`AddressStore`]: the host's address and transaction store
//! - [`UiSink`]: notifications and completion events for the UI
//!
//! The pipeline never blocks on these beyond awaiting `NodeClient` calls.
//! Store and sink callbacks are synchronous and must return quickly.

use async_trait::async_trait;

use crate::address::{Address, AddressHash};
use crate::error::ClientError;
use crate::types::{
    ContractCallRequest, Notification, SendCompletion, SentTx, SignAndSendRequest, SweepBuild,
    TransactionRecord, TransferRequest, UnsignedTx,
};

/// Remote node and signing wallet.
///
/// Implementations own timeouts and retries; the pipeline calls each method
/// at most once per step and treats any error as final for that step.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Build every transaction needed to move the whole balance of `from`
    /// to `to`, in broadcast order, with their aggregate fee.
    async fn build_sweep_transactions(
        &self,
        from: &Address,
        to: &AddressHash,
    ) -> Result<SweepBuild, ClientError>;

    /// Build one unsigned transfer.
    async fn create_transaction(&self, request: &TransferRequest) -> Result<UnsignedTx, ClientError>;

    /// Build one unsigned script execution.
    async fn build_contract_call(
        &self,
        request: &ContractCallRequest,
    ) -> Result<UnsignedTx, ClientError>;

    /// Sign `request.tx_id` with the key of `request.from` and broadcast it.
    async fn sign_and_send_transaction(
        &self,
        request: &SignAndSendRequest,
    ) -> Result<SentTx, ClientError>;
}

/// The host's address book and transaction history.
pub trait AddressStore: Send + Sync {
    /// Record a transaction that was just broadcast.
    fn add_pending_transaction(&self, record: TransactionRecord);

    /// Hint that the balance of `hash` changed and should be fetched again.
    fn refresh_address(&self, hash: &AddressHash);
}

/// User-facing output of the pipeline.
pub trait UiSink: Send + Sync {
    /// Show a snackbar-style message.
    fn notify(&self, notification: Notification);

    /// A send session finished successfully.
    fn send_completed(&self, completion: &SendCompletion);
}
