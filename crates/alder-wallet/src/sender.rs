//! Sequential sign-and-broadcast.
//!
//! Sweep transactions spend outputs of the same address, so they are sent
//! strictly one after another and the loop stops at the first failure.
//! Every transaction reported in [`SendReport::sent`] was accepted by the
//! node and is committed; a retry starts at [`SendReport::next_index`].

use std::ops::ControlFlow;

use tracing::{info, warn};

use alder_core::address::{Address, AddressHash};
use alder_core::error::ClientError;
use alder_core::traits::NodeClient;
use alder_core::types::{SentTx, SignAndSendRequest, TransactionType};

use crate::context::TxContext;
use crate::strategy::SendPlan;

/// Why a send loop stopped early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Halt {
    /// The call at `index` failed; later calls were not attempted.
    Failed {
        /// 0-based index into the plan.
        index: usize,
        /// Node failure.
        error: ClientError,
    },
    /// The caller asked to stop before `index` was attempted.
    Abandoned {
        /// 0-based index of the first unattempted call.
        index: usize,
    },
}

/// Outcome of [`send_sequentially`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendReport {
    /// Number of calls in the plan.
    pub total: usize,
    /// Index the loop started at.
    pub start: usize,
    /// Accepted transactions, covering indices `start..start + sent.len()`.
    pub sent: Vec<SentTx>,
    /// Early stop, if any.
    pub halt: Option<Halt>,
}

impl SendReport {
    /// Whether every call from `start` on succeeded.
    pub fn is_complete(&self) -> bool {
        self.halt.is_none()
    }

    /// First index not yet accepted by the node.
    pub fn next_index(&self) -> usize {
        self.start + self.sent.len()
    }

    /// Calls that were never attempted.
    pub fn unattempted(&self) -> usize {
        match &self.halt {
            None => 0,
            Some(Halt::Failed { index, .. }) => self.total - index - 1,
            Some(Halt::Abandoned { index }) => self.total - index,
        }
    }
}

/// Send `steps[start..]` one at a time.
///
/// `on_sent` runs after each accepted transaction; returning
/// `ControlFlow::Break` stops the loop before the next call.
pub async fn send_sequentially<F>(
    client: &dyn NodeClient,
    steps: &[SignAndSendRequest],
    start: usize,
    mut on_sent: F,
) -> SendReport
where
    F: FnMut(usize, &SignAndSendRequest, &SentTx) -> ControlFlow<()> + Send,
{
    let mut report = SendReport {
        total: steps.len(),
        start,
        sent: Vec::new(),
        halt: None,
    };

    for (index, request) in steps.iter().enumerate().skip(start) {
        match client.sign_and_send_transaction(request).await {
            Ok(sent) => {
                info!(
                    index,
                    total = steps.len(),
                    tx_id = %sent.tx_id,
                    tx_type = %request.tx_type,
                    "transaction broadcast"
                );
                let flow = on_sent(index, request, &sent);
                report.sent.push(sent);
                if flow.is_break() && index + 1 < steps.len() {
                    report.halt = Some(Halt::Abandoned { index: index + 1 });
                    break;
                }
            }
            Err(error) => {
                warn!(index, total = steps.len(), %error, "broadcast failed");
                report.halt = Some(Halt::Failed { index, error });
                break;
            }
        }
    }

    report
}

/// Plan the remaining transactions of a sweep.
///
/// The destination is the source address when the context requires a
/// consolidation, `target` otherwise. Already-sent transactions are kept in
/// the plan so indices stay stable; the caller starts at
/// [`TxContext::sent_count`].
pub fn sweep_plan(from: &Address, target: &AddressHash, ctx: &TxContext) -> Option<SendPlan> {
    let txs = ctx.sweep_unsigned_txs();
    if txs.is_empty() {
        return None;
    }
    let (destination, tx_type) = if ctx.consolidation_required() {
        (from.hash.clone(), TransactionType::Consolidation)
    } else {
        (target.clone(), TransactionType::Sweep)
    };
    let steps = txs
        .iter()
        .map(|tx| SignAndSendRequest {
            from: from.hash.clone(),
            tx_id: tx.tx_id.clone(),
            unsigned_tx: tx.unsigned_tx.clone(),
            destination: destination.clone(),
            tx_type,
            network: ctx.current_network(),
            amount: None,
        })
        .collect();
    Some(SendPlan::Sweep(steps))
}
