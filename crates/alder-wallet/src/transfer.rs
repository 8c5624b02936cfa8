//! Plain value transfer between addresses.
//!
//! Sending the full available balance switches to the sweep path, since one
//! transaction may not be able to spend every input. A node that refuses a
//! partial transfer because the source holds too many small inputs gets a
//! consolidation sweep instead; the user repeats the transfer afterwards.

use async_trait::async_trait;
use tracing::{debug, info};

use alder_core::address::{Address, AddressHash};
use alder_core::amount::parse_amount;
use alder_core::error::{AmountError, ClientError};
use alder_core::traits::NodeClient;
use alder_core::types::{SignAndSendRequest, TransactionType, TransferRequest};

use crate::checker::TxSummary;
use crate::context::{BuildOutcome, TxContext};
use crate::error::BuildError;
use crate::gas::GasSettings;
use crate::sender::sweep_plan;
use crate::strategy::{SendPlan, TxStrategy};

/// Transfer form input.
#[derive(Clone, Debug)]
pub struct BuildTransferTxData {
    /// Source address with its current balances.
    pub from_address: Address,
    /// Destination hash as typed.
    pub to_address: String,
    /// Amount in coins as typed, e.g. `"1.5"`.
    pub amount: String,
    /// Optional gas amount override.
    pub gas_amount: Option<String>,
    /// Optional gas price override, in coins.
    pub gas_price: Option<String>,
}

/// Form input after validation.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ValidTransfer {
    to: AddressHash,
    amount: u128,
    gas: GasSettings,
}

impl BuildTransferTxData {
    fn validate(&self) -> Result<ValidTransfer, BuildError> {
        let to = AddressHash::parse(&self.to_address)?;
        let amount = parse_amount(&self.amount).map_err(BuildError::InvalidAmount)?;
        if amount == 0 {
            return Err(BuildError::InvalidAmount(AmountError::Zero));
        }
        let available = self.from_address.available_balance();
        if amount > available {
            return Err(BuildError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
        let gas = GasSettings::parse(self.gas_amount.as_deref(), self.gas_price.as_deref())?;
        Ok(ValidTransfer { to, amount, gas })
    }
}

/// Strategy for [`BuildTransferTxData`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TransferTx;

#[async_trait]
impl TxStrategy for TransferTx {
    type Data = BuildTransferTxData;

    fn kind(&self) -> TransactionType {
        TransactionType::Transfer
    }

    async fn build(
        &self,
        client: &dyn NodeClient,
        data: &BuildTransferTxData,
        _ctx: &TxContext,
    ) -> Result<BuildOutcome, BuildError> {
        let valid = data.validate()?;
        let from = &data.from_address;

        if valid.amount == from.available_balance() {
            debug!(from = %from.hash, to = %valid.to, "full balance requested, building sweep");
            let build = client.build_sweep_transactions(from, &valid.to).await?;
            return BuildOutcome::sweep(build, false);
        }

        let request = TransferRequest {
            from: from.hash.clone(),
            from_public_key: from.public_key.clone(),
            to: valid.to,
            amount: valid.amount,
            gas_amount: valid.gas.gas_amount,
            gas_price: valid.gas.gas_price,
        };
        match client.create_transaction(&request).await {
            Ok(unsigned) => BuildOutcome::single(unsigned),
            Err(ClientError::ConsolidationRequired(reason)) => {
                info!(from = %from.hash, %reason, "node requires consolidation before transfer");
                let build = client.build_sweep_transactions(from, &from.hash).await?;
                BuildOutcome::sweep(build, true)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn check(&self, data: &BuildTransferTxData, ctx: &TxContext) -> TxSummary {
        let to = AddressHash::parse(&data.to_address).ok();
        let amount = if ctx.consolidation_required() {
            None
        } else {
            parse_amount(&data.amount).ok()
        };
        let gas = GasSettings::parse(data.gas_amount.as_deref(), data.gas_price.as_deref())
            .unwrap_or_default();
        TxSummary::from_context(
            TransactionType::Transfer,
            &data.from_address.hash,
            to.as_ref(),
            amount,
            ctx,
        )
        .with_gas(&gas)
    }

    fn plan_send(&self, data: &BuildTransferTxData, ctx: &TxContext) -> Option<SendPlan> {
        let to = AddressHash::parse(&data.to_address).ok()?;
        if ctx.is_sweeping() {
            return sweep_plan(&data.from_address, &to, ctx);
        }
        let unsigned = ctx.unsigned_transaction()?;
        let amount = parse_amount(&data.amount).ok()?;
        Some(SendPlan::Single(SignAndSendRequest {
            from: data.from_address.hash.clone(),
            tx_id: unsigned.tx_id.clone(),
            unsigned_tx: unsigned.unsigned_tx.clone(),
            destination: to,
            tx_type: TransactionType::Transfer,
            network: ctx.current_network(),
            amount: Some(amount),
        }))
    }
}
