//! The build → check → send state machine shared by every transaction kind.
//!
//! A [`TxModal`] owns one session: its step, its [`TxContext`] and the form
//! data of the last successful build. Session state sits behind a mutex
//! that is never held across an await. Each build or send takes a ticket
//! (the session generation) before suspending; a result whose ticket is no
//! longer current, or that arrives after [`TxModal::close`], is dropped
//! without touching the context, the store or the sink. Store and sink
//! calls are made with the session unlocked, so they may call back into
//! the modal, including [`TxModal::close`].

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, info, warn};

use alder_core::constants::Network;
use alder_core::traits::{AddressStore, NodeClient, UiSink};
use alder_core::types::{
    Notification, SendCompletion, SignTransferTxResult, TransactionRecord,
};

use crate::checker::TxSummary;
use crate::context::TxContext;
use crate::error::{SendError, TxError};
use crate::sender::{Halt, send_sequentially};
use crate::strategy::{SendPlan, TxStrategy};
use crate::walletconnect::get_wallet_connect_result;

/// Where a session stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModalStep {
    /// Editing the form.
    Build,
    /// Reviewing a built transaction.
    Check,
    /// Signing and broadcasting.
    Sending,
    /// Everything was broadcast.
    Sent,
    /// Broadcast failed; retry or close.
    Failed,
    /// Session discarded.
    Closed,
}

impl ModalStep {
    /// Lowercase name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Check => "check",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ModalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Session<D> {
    step: ModalStep,
    context: TxContext,
    data: Option<D>,
    generation: u64,
}

impl<D> Session<D> {
    /// Reject stale results.
    fn check_ticket(&self, ticket: u64) -> Result<(), TxError> {
        if self.step == ModalStep::Closed {
            return Err(TxError::Closed);
        }
        if self.generation != ticket {
            return Err(TxError::Superseded);
        }
        Ok(())
    }
}

/// Result of a send, decided under the session lock and reported after it.
enum Settled {
    Sent {
        completion: SendCompletion,
        unanswered: Option<TxError>,
    },
    Failed(SendError),
}

/// One send session for the transaction kind `S`.
///
/// All methods take `&self`; the modal can be shared behind an `Arc` between
/// the task driving it and the one that may close it.
pub struct TxModal<S: TxStrategy> {
    strategy: S,
    client: Arc<dyn NodeClient>,
    store: Arc<dyn AddressStore>,
    sink: Arc<dyn UiSink>,
    wallet_connect: bool,
    session: Mutex<Session<S::Data>>,
    emitting: ReentrantMutex<()>,
}

impl<S: TxStrategy> TxModal<S> {
    /// Open a session on `network`, starting in [`ModalStep::Build`].
    pub fn new(
        strategy: S,
        client: Arc<dyn NodeClient>,
        store: Arc<dyn AddressStore>,
        sink: Arc<dyn UiSink>,
        network: Network,
    ) -> Self {
        Self {
            strategy,
            client,
            store,
            sink,
            wallet_connect: false,
            session: Mutex::new(Session {
                step: ModalStep::Build,
                context: TxContext::new(network),
                data: None,
                generation: 0,
            }),
            emitting: ReentrantMutex::new(()),
        }
    }

    /// Serve a wallet-connect signing request: completion carries a
    /// [`SignTransferTxResult`].
    pub fn with_wallet_connect(mut self) -> Self {
        self.wallet_connect = true;
        self
    }

    /// Current step.
    pub fn step(&self) -> ModalStep {
        self.session.lock().step
    }

    /// Snapshot of the session context.
    pub fn context(&self) -> TxContext {
        self.session.lock().context.clone()
    }

    /// Form data of the last successful build.
    pub fn data(&self) -> Option<S::Data> {
        self.session.lock().data.clone()
    }

    /// Build from `data` and move to [`ModalStep::Check`].
    ///
    /// On failure the session stays in `Build` with its context unchanged.
    pub async fn advance_to_check(&self, data: S::Data) -> Result<TxSummary, TxError> {
        let (ticket, snapshot) = {
            let mut session = self.session.lock();
            match session.step {
                ModalStep::Build => {}
                ModalStep::Closed => return Err(TxError::Closed),
                step => return Err(TxError::WrongStep(step)),
            }
            session.generation += 1;
            (session.generation, session.context.clone())
        };

        let result = self.strategy.build(self.client.as_ref(), &data, &snapshot).await;

        let mut session = self.session.lock();
        if let Err(e) = session.check_ticket(ticket) {
            debug!(tx_type = %self.strategy.kind(), error = %e, "build result dropped");
            return Err(e);
        }
        let outcome = result.map_err(|e| {
            debug!(tx_type = %self.strategy.kind(), error = %e, "build failed");
            TxError::Build(e)
        })?;

        session.context.commit(outcome);
        session.step = ModalStep::Check;
        let summary = self.strategy.check(&data, &session.context);
        session.data = Some(data);
        info!(
            tx_type = %summary.tx_type,
            tx_count = summary.tx_count,
            fees = %summary.fees,
            "transaction built"
        );
        Ok(summary)
    }

    /// Sign and broadcast the built transaction(s).
    ///
    /// Accepted from [`ModalStep::Check`] and, as a retry, from
    /// [`ModalStep::Failed`]. A retried sweep resumes at the first
    /// transaction the node has not accepted yet.
    pub async fn confirm_and_send(&self) -> Result<SendCompletion, TxError> {
        let (ticket, plan, start) = {
            let mut guard = self.session.lock();
            let session = &mut *guard;
            match session.step {
                ModalStep::Check | ModalStep::Failed => {}
                ModalStep::Closed => return Err(TxError::Closed),
                ModalStep::Build => return Err(TxError::ConfirmationMissing(ModalStep::Build)),
                step => return Err(TxError::WrongStep(step)),
            }
            let plan = session
                .data
                .as_ref()
                .and_then(|data| self.strategy.plan_send(data, &session.context))
                .ok_or(TxError::ConfirmationMissing(session.step))?;
            session.generation += 1;
            session.step = ModalStep::Sending;
            (session.generation, plan, session.context.sent_count())
        };

        let total = plan.steps().len();
        if start > 0 {
            info!(start, total, "resuming sweep");
            self.emit(ticket, || {
                self.sink.notify(Notification::info(format!(
                    "Resuming at transaction {} of {total}",
                    start + 1
                )))
            });
        } else {
            info!(total, tx_type = ?plan.tx_type(), "sending");
        }

        let report = send_sequentially(self.client.as_ref(), plan.steps(), start, |_, request, sent| {
            {
                let mut session = self.session.lock();
                if session.check_ticket(ticket).is_err() {
                    debug!(tx_id = %sent.tx_id, "broadcast accepted after session ended, not recorded");
                    return ControlFlow::Break(());
                }
                session.context.record_sent(sent.tx_id.clone());
            }
            let record = TransactionRecord::pending(request, sent, Utc::now());
            if self.emit(ticket, || self.store.add_pending_transaction(record))
                && self.emit(ticket, || self.store.refresh_address(&request.from))
            {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        })
        .await;

        let settled = {
            let mut session = self.session.lock();
            if let Err(e) = session.check_ticket(ticket) {
                debug!(sent = report.sent.len(), "send result dropped");
                return Err(e);
            }
            if report.is_complete() {
                session.step = ModalStep::Sent;
                let signature = if plan.yields_signature() {
                    report.sent.last().map(|s| s.signature.clone())
                } else {
                    None
                };
                let (wallet_connect, unanswered) =
                    match self.wallet_connect_for(&session.context, signature.as_deref()) {
                        Ok(result) => (result, None),
                        Err(e) => (None, Some(e)),
                    };
                Settled::Sent {
                    completion: SendCompletion {
                        tx_type: plan.tx_type().unwrap_or_else(|| self.strategy.kind()),
                        tx_ids: session.context.sent_tx_ids().to_vec(),
                        signature,
                        wallet_connect,
                    },
                    unanswered,
                }
            } else if let Some(Halt::Failed { error, .. }) = &report.halt {
                session.step = ModalStep::Failed;
                let error = match &plan {
                    SendPlan::Single(_) => SendError::Broadcast(error.clone()),
                    SendPlan::Sweep(_) => SendError::SweepInterrupted {
                        position: report.next_index() + 1,
                        total,
                        sent: session.context.sent_count(),
                        source: error.clone(),
                    },
                };
                warn!(%error, unattempted = report.unattempted(), "send failed");
                Settled::Failed(error)
            } else {
                // The callback only stops the loop for a stale ticket, which
                // was handled above.
                return Err(TxError::Superseded);
            }
        };

        match settled {
            Settled::Sent { completion, unanswered } => {
                info!(tx_type = %completion.tx_type, count = completion.tx_ids.len(), "send complete");
                if let Some(e) = unanswered {
                    warn!(error = %e, "wallet-connect request left unanswered");
                    self.emit(ticket, || self.sink.notify(Notification::alert(e.to_string())));
                }
                let text = match completion.tx_ids.as_slice() {
                    [one] => format!("Transaction sent: {one}"),
                    many => format!("{} transactions sent", many.len()),
                };
                self.emit(ticket, || self.sink.notify(Notification::success(text)));
                self.emit(ticket, || self.sink.send_completed(&completion));
                Ok(completion)
            }
            Settled::Failed(error) => {
                self.emit(ticket, || self.sink.notify(Notification::alert(error.to_string())));
                Err(error.into())
            }
        }
    }

    /// Run one store or sink call unless `ticket` went stale.
    ///
    /// The session lock is released while the collaborator runs, so it may
    /// call back into the modal. Emissions are serialized against
    /// [`close`](Self::close): once `close` returns, nothing more is written.
    fn emit(&self, ticket: u64, write: impl FnOnce()) -> bool {
        let _emitting = self.emitting.lock();
        let current = self.session.lock().check_ticket(ticket).is_ok();
        if current {
            write();
        }
        current
    }

    fn wallet_connect_for(
        &self,
        ctx: &TxContext,
        signature: Option<&str>,
    ) -> Result<Option<SignTransferTxResult>, TxError> {
        if !self.wallet_connect {
            return Ok(None);
        }
        let signature = signature.ok_or(TxError::NoUnsignedTransaction)?;
        get_wallet_connect_result(ctx, signature).map(Some)
    }

    /// Wallet-connect result for the current build.
    pub fn wallet_connect_result(&self, signature: &str) -> Result<SignTransferTxResult, TxError> {
        let session = self.session.lock();
        if session.step == ModalStep::Closed {
            return Err(TxError::Closed);
        }
        get_wallet_connect_result(&session.context, signature)
    }

    /// Leave [`ModalStep::Failed`] for the confirmation view.
    pub fn back_to_check(&self) -> Result<TxSummary, TxError> {
        let mut session = self.session.lock();
        match session.step {
            ModalStep::Failed => {}
            ModalStep::Closed => return Err(TxError::Closed),
            step => return Err(TxError::WrongStep(step)),
        }
        let summary = session
            .data
            .as_ref()
            .map(|data| self.strategy.check(data, &session.context))
            .ok_or(TxError::ConfirmationMissing(ModalStep::Failed))?;
        session.step = ModalStep::Check;
        Ok(summary)
    }

    /// Return to the form, discarding the build.
    ///
    /// Not allowed once any transaction of the build was broadcast.
    pub fn back_to_build(&self) -> Result<(), TxError> {
        let mut session = self.session.lock();
        match session.step {
            ModalStep::Check => {}
            ModalStep::Failed if session.context.sent_count() == 0 => {}
            ModalStep::Closed => return Err(TxError::Closed),
            step => return Err(TxError::WrongStep(step)),
        }
        session.context.clear_build();
        session.step = ModalStep::Build;
        Ok(())
    }

    /// Discard the session. In-flight calls finish but their results are
    /// ignored.
    pub fn close(&self) {
        let _emitting = self.emitting.lock();
        let mut session = self.session.lock();
        if session.step == ModalStep::Closed {
            return;
        }
        info!(step = %session.step, tx_type = %self.strategy.kind(), "transaction modal closed");
        session.step = ModalStep::Closed;
        session.generation += 1;
        session.context.clear_build();
        session.data = None;
    }
}
