//! The seam between the shared state machine and per-kind behavior.

use async_trait::async_trait;

use alder_core::traits::NodeClient;
use alder_core::types::{SignAndSendRequest, TransactionType};

use crate::checker::TxSummary;
use crate::context::{BuildOutcome, TxContext};
use crate::error::BuildError;

/// Build, check and send behavior of one transaction kind.
///
/// Implementations are stateless; everything session specific lives in the
/// form data and the [`TxContext`] owned by the modal.
#[async_trait]
pub trait TxStrategy: Send + Sync + 'static {
    /// Form input for this kind.
    type Data: Clone + Send + Sync + 'static;

    /// Kind used for non-sweep sends and log fields.
    fn kind(&self) -> TransactionType;

    /// Turn form input into unsigned transaction(s).
    ///
    /// Must not assume anything about `ctx` beyond the network; the result
    /// is committed by the caller only if the session is still open.
    async fn build(
        &self,
        client: &dyn NodeClient,
        data: &Self::Data,
        ctx: &TxContext,
    ) -> Result<BuildOutcome, BuildError>;

    /// Summarize a committed build for confirmation.
    fn check(&self, data: &Self::Data, ctx: &TxContext) -> TxSummary;

    /// Calls to make, in order. `None` when the context has nothing to send.
    fn plan_send(&self, data: &Self::Data, ctx: &TxContext) -> Option<SendPlan>;
}

/// Ordered sign-and-broadcast calls for one confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendPlan {
    /// One transaction; its signature is the send result.
    Single(SignAndSendRequest),
    /// A sweep batch; no single signature exists.
    Sweep(Vec<SignAndSendRequest>),
}

impl SendPlan {
    /// All calls in broadcast order.
    pub fn steps(&self) -> &[SignAndSendRequest] {
        match self {
            Self::Single(request) => std::slice::from_ref(request),
            Self::Sweep(requests) => requests,
        }
    }

    /// Whether the plan produces a signature for external consumers.
    pub fn yields_signature(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// Tag shared by the plan's calls.
    pub fn tx_type(&self) -> Option<TransactionType> {
        self.steps().first().map(|r| r.tx_type)
    }
}
