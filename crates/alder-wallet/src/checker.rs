//! Confirmation summary shown between build and send.

use std::fmt;

use alder_core::address::AddressHash;
use alder_core::amount::format_amount;
use alder_core::constants::SYMBOL;
use alder_core::types::TransactionType;

use crate::context::TxContext;
use crate::gas::GasSettings;

/// Read-only digest of a built session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxSummary {
    /// Kind of transaction that will be broadcast.
    pub tx_type: TransactionType,
    /// Source address.
    pub from: AddressHash,
    /// Recipient, when the transaction has one.
    pub to: Option<AddressHash>,
    /// Amount requested, in smallest units.
    pub amount: Option<u128>,
    /// Total fee in smallest units.
    pub fees: u128,
    /// Fee implied by the user's gas overrides, when both were given.
    pub expected_fee: Option<u128>,
    /// Number of transactions to broadcast.
    pub tx_count: usize,
    /// Whether the whole balance moves.
    pub is_sweeping: bool,
    /// Whether funds move back into the source address.
    pub consolidation_required: bool,
}

impl TxSummary {
    /// Summarize a committed context.
    ///
    /// `tx_type` is the kind for a non-sweep send; sweeps are tagged from
    /// the context.
    pub fn from_context(
        tx_type: TransactionType,
        from: &AddressHash,
        to: Option<&AddressHash>,
        amount: Option<u128>,
        ctx: &TxContext,
    ) -> Self {
        let tx_type = match (ctx.is_sweeping(), ctx.consolidation_required()) {
            (true, true) => TransactionType::Consolidation,
            (true, false) => TransactionType::Sweep,
            (false, _) => tx_type,
        };
        let to = if ctx.consolidation_required() {
            Some(from.clone())
        } else {
            to.cloned()
        };
        Self {
            tx_type,
            from: from.clone(),
            to,
            amount,
            fees: ctx.fees().unwrap_or_default(),
            expected_fee: None,
            tx_count: ctx.built().map(|b| b.tx_count()).unwrap_or_default(),
            is_sweeping: ctx.is_sweeping(),
            consolidation_required: ctx.consolidation_required(),
        }
    }

    /// Attach the fee the user's gas overrides imply. Sweeps are priced by
    /// the node alone, so they never carry one.
    pub fn with_gas(mut self, gas: &GasSettings) -> Self {
        if !self.is_sweeping {
            self.expected_fee = gas.expected_fee();
        }
        self
    }
}

impl fmt::Display for TxSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Type:   {}", self.tx_type)?;
        writeln!(f, "From:   {}", self.from)?;
        if let Some(to) = &self.to {
            writeln!(f, "To:     {to}")?;
        }
        if let Some(amount) = self.amount {
            writeln!(f, "Amount: {} {SYMBOL}", format_amount(amount))?;
        }
        writeln!(f, "Fee:    {} {SYMBOL}", format_amount(self.fees))?;
        if let Some(expected) = self.expected_fee {
            writeln!(f, "Expected fee: {} {SYMBOL}", format_amount(expected))?;
        }
        if self.tx_count > 1 {
            writeln!(f, "Transactions: {}", self.tx_count)?;
        }
        if self.consolidation_required {
            write!(
                f,
                "Too many small inputs: funds are consolidated into the source address first."
            )?;
        } else if self.is_sweeping {
            write!(f, "The whole available balance will be sent.")?;
        }
        Ok(())
    }
}
