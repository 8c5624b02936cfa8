//! Sweep of an address into itself.

use async_trait::async_trait;

use alder_core::address::Address;
use alder_core::traits::NodeClient;
use alder_core::types::TransactionType;

use crate::checker::TxSummary;
use crate::context::{BuildOutcome, TxContext};
use crate::error::BuildError;
use crate::sender::sweep_plan;
use crate::strategy::{SendPlan, TxStrategy};

/// Consolidation form input.
#[derive(Clone, Debug)]
pub struct ConsolidationData {
    /// Address whose inputs are merged.
    pub from_address: Address,
}

/// Strategy for [`ConsolidationData`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsolidationTx;

#[async_trait]
impl TxStrategy for ConsolidationTx {
    type Data = ConsolidationData;

    fn kind(&self) -> TransactionType {
        TransactionType::Consolidation
    }

    async fn build(
        &self,
        client: &dyn NodeClient,
        data: &ConsolidationData,
        _ctx: &TxContext,
    ) -> Result<BuildOutcome, BuildError> {
        let from = &data.from_address;
        if from.available_balance() == 0 {
            return Err(BuildError::NothingToSweep);
        }
        let build = client.build_sweep_transactions(from, &from.hash).await?;
        BuildOutcome::sweep(build, true)
    }

    fn check(&self, data: &ConsolidationData, ctx: &TxContext) -> TxSummary {
        let hash = &data.from_address.hash;
        TxSummary::from_context(TransactionType::Consolidation, hash, Some(hash), None, ctx)
    }

    fn plan_send(&self, data: &ConsolidationData, ctx: &TxContext) -> Option<SendPlan> {
        sweep_plan(&data.from_address, &data.from_address.hash, ctx)
    }
}
