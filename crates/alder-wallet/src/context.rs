//! Per-session transaction context.
//!
//! A [`TxContext`] lives exactly as long as one open modal. Builders only
//! ever see it read-only and return a [`BuildOutcome`]; the modal commits
//! the outcome in one step, so a failed or abandoned build leaves the
//! context untouched.

use alder_core::constants::Network;
use alder_core::types::{SweepBuild, SweepTx, UnsignedTx};

use crate::error::BuildError;

/// What a successful build produced. Exactly one shape, never both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuiltTx {
    /// One transaction covering a partial transfer or a call.
    Single {
        /// The unsigned transaction.
        unsigned: UnsignedTx,
        /// `gas_amount * gas_price`.
        fees: u128,
    },
    /// An ordered, non-empty batch emptying the source address.
    Sweep {
        /// Transactions in broadcast order.
        txs: Vec<SweepTx>,
        /// Aggregate fee.
        fees: u128,
    },
}

impl BuiltTx {
    /// Total fee of the build.
    pub fn fees(&self) -> u128 {
        match self {
            Self::Single { fees, .. } | Self::Sweep { fees, .. } => *fees,
        }
    }

    /// Number of transactions that will be broadcast.
    pub fn tx_count(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::Sweep { txs, .. } => txs.len(),
        }
    }
}

/// Result returned by a builder, committed by the modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOutcome {
    /// The built transaction(s).
    pub tx: BuiltTx,
    /// Sweep destination is the source address itself.
    pub consolidation_required: bool,
}

impl BuildOutcome {
    /// Wrap a single unsigned transaction, computing its fee.
    pub fn single(unsigned: UnsignedTx) -> Result<Self, BuildError> {
        let fees = unsigned.fee().ok_or(BuildError::FeeOverflow)?;
        Ok(Self {
            tx: BuiltTx::Single { unsigned, fees },
            consolidation_required: false,
        })
    }

    /// Wrap a sweep batch. An empty batch is rejected.
    pub fn sweep(build: SweepBuild, consolidation_required: bool) -> Result<Self, BuildError> {
        if build.unsigned_txs.is_empty() {
            return Err(BuildError::EmptySweep);
        }
        Ok(Self {
            tx: BuiltTx::Sweep {
                txs: build.unsigned_txs,
                fees: build.fees,
            },
            consolidation_required,
        })
    }
}

/// Mutable state of one send session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxContext {
    network: Network,
    built: Option<BuiltTx>,
    consolidation_required: bool,
    /// Ids of transactions broadcast so far, in plan order.
    sent: Vec<String>,
    refresh_requested: bool,
}

impl TxContext {
    /// Fresh context for a newly opened session.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            built: None,
            consolidation_required: false,
            sent: Vec::new(),
            refresh_requested: false,
        }
    }

    pub(crate) fn commit(&mut self, outcome: BuildOutcome) {
        self.built = Some(outcome.tx);
        self.consolidation_required = outcome.consolidation_required;
        self.sent.clear();
        self.refresh_requested = false;
    }

    pub(crate) fn clear_build(&mut self) {
        *self = Self::new(self.network);
    }

    pub(crate) fn record_sent(&mut self, tx_id: String) {
        self.sent.push(tx_id);
        self.refresh_requested = true;
    }

    /// Network the session signs and broadcasts on.
    pub fn current_network(&self) -> Network {
        self.network
    }

    /// The built transaction(s), if a build completed.
    pub fn built(&self) -> Option<&BuiltTx> {
        self.built.as_ref()
    }

    /// Whether a build completed.
    pub fn has_build(&self) -> bool {
        self.built.is_some()
    }

    /// The single unsigned transaction of a non-sweep build.
    pub fn unsigned_transaction(&self) -> Option<&UnsignedTx> {
        match &self.built {
            Some(BuiltTx::Single { unsigned, .. }) => Some(unsigned),
            _ => None,
        }
    }

    /// Id of the single unsigned transaction.
    pub fn unsigned_tx_id(&self) -> Option<&str> {
        self.unsigned_transaction().map(|tx| tx.tx_id.as_str())
    }

    /// Sweep batch in broadcast order; empty unless sweeping.
    pub fn sweep_unsigned_txs(&self) -> &[SweepTx] {
        match &self.built {
            Some(BuiltTx::Sweep { txs, .. }) => txs,
            _ => &[],
        }
    }

    /// Whether the build chose the sweep path.
    pub fn is_sweeping(&self) -> bool {
        matches!(self.built, Some(BuiltTx::Sweep { .. }))
    }

    /// Whether the sweep goes back into the source address.
    pub fn consolidation_required(&self) -> bool {
        self.consolidation_required
    }

    /// Total fee, present once a build completed.
    pub fn fees(&self) -> Option<u128> {
        self.built.as_ref().map(BuiltTx::fees)
    }

    /// Number of planned transactions already broadcast.
    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    /// Ids of broadcast transactions, in order.
    pub fn sent_tx_ids(&self) -> &[String] {
        &self.sent
    }

    /// Sweep transactions not yet broadcast.
    pub fn unsent_sweep_txs(&self) -> &[SweepTx] {
        let txs = self.sweep_unsigned_txs();
        &txs[self.sent.len().min(txs.len())..]
    }

    /// Whether a send succeeded and the source balance is stale.
    pub fn refresh_requested(&self) -> bool {
        self.refresh_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned(gas_amount: u64, gas_price: u128) -> UnsignedTx {
        UnsignedTx {
            tx_id: "tx".into(),
            unsigned_tx: "00".into(),
            from_group: 0,
            to_group: 0,
            gas_amount,
            gas_price,
        }
    }

    fn sweep_txs(n: usize) -> Vec<SweepTx> {
        (0..n)
            .map(|i| SweepTx {
                tx_id: format!("s{i}"),
                unsigned_tx: format!("{i:02x}"),
            })
            .collect()
    }

    #[test]
    fn fresh_context_is_empty() {
        let ctx = TxContext::new(Network::Testnet);
        assert!(!ctx.has_build());
        assert!(!ctx.is_sweeping());
        assert_eq!(ctx.fees(), None);
        assert_eq!(ctx.current_network(), Network::Testnet);
    }

    #[test]
    fn single_commit_populates_only_unsigned() {
        let mut ctx = TxContext::new(Network::Mainnet);
        ctx.commit(BuildOutcome::single(unsigned(20_000, 100)).unwrap());
        assert_eq!(ctx.unsigned_tx_id(), Some("tx"));
        assert!(ctx.sweep_unsigned_txs().is_empty());
        assert!(!ctx.is_sweeping());
        assert_eq!(ctx.fees(), Some(2_000_000));
    }

    #[test]
    fn sweep_commit_populates_only_batch() {
        let mut ctx = TxContext::new(Network::Mainnet);
        let build = SweepBuild {
            unsigned_txs: sweep_txs(2),
            fees: 7,
        };
        ctx.commit(BuildOutcome::sweep(build, true).unwrap());
        assert!(ctx.unsigned_transaction().is_none());
        assert_eq!(ctx.sweep_unsigned_txs().len(), 2);
        assert!(ctx.is_sweeping());
        assert!(ctx.consolidation_required());
        assert_eq!(ctx.fees(), Some(7));
    }

    #[test]
    fn empty_sweep_rejected() {
        let build = SweepBuild {
            unsigned_txs: vec![],
            fees: 0,
        };
        assert_eq!(BuildOutcome::sweep(build, false), Err(BuildError::EmptySweep));
    }

    #[test]
    fn fee_overflow_rejected() {
        assert_eq!(
            BuildOutcome::single(unsigned(u64::MAX, u128::MAX)),
            Err(BuildError::FeeOverflow)
        );
    }

    #[test]
    fn recording_sends_tracks_progress() {
        let mut ctx = TxContext::new(Network::Mainnet);
        ctx.commit(
            BuildOutcome::sweep(
                SweepBuild {
                    unsigned_txs: sweep_txs(3),
                    fees: 3,
                },
                false,
            )
            .unwrap(),
        );
        ctx.record_sent("s0".into());
        assert_eq!(ctx.sent_count(), 1);
        assert!(ctx.refresh_requested());
        assert_eq!(ctx.unsent_sweep_txs()[0].tx_id, "s1");
    }

    #[test]
    fn recommit_resets_progress() {
        let mut ctx = TxContext::new(Network::Mainnet);
        ctx.commit(BuildOutcome::single(unsigned(1, 1)).unwrap());
        ctx.record_sent("tx".into());
        ctx.commit(BuildOutcome::single(unsigned(2, 1)).unwrap());
        assert_eq!(ctx.sent_count(), 0);
        assert!(!ctx.refresh_requested());
    }

    #[test]
    fn clear_build_keeps_network() {
        let mut ctx = TxContext::new(Network::Localhost);
        ctx.commit(BuildOutcome::single(unsigned(1, 1)).unwrap());
        ctx.clear_build();
        assert_eq!(ctx, TxContext::new(Network::Localhost));
    }
}
