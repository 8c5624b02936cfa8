//! Script execution against a contract.
//!
//! The node compiles nothing here: the caller supplies hex bytecode and the
//! node wraps it into one unsigned transaction sent from the calling
//! address.

use async_trait::async_trait;

use alder_core::address::Address;
use alder_core::amount::parse_amount;
use alder_core::error::AmountError;
use alder_core::traits::NodeClient;
use alder_core::types::{ContractCallRequest, SignAndSendRequest, TransactionType};

use crate::checker::TxSummary;
use crate::context::{BuildOutcome, TxContext};
use crate::error::BuildError;
use crate::gas::GasSettings;
use crate::strategy::{SendPlan, TxStrategy};

/// Script call form input.
#[derive(Clone, Debug)]
pub struct ContractCallData {
    /// Calling address.
    pub from_address: Address,
    /// Hex encoded script bytecode.
    pub bytecode: String,
    /// Optional amount attached to the call, in coins.
    pub amount: Option<String>,
    /// Optional gas amount override.
    pub gas_amount: Option<String>,
    /// Optional gas price override, in coins.
    pub gas_price: Option<String>,
}

impl ContractCallData {
    fn attached_amount(&self) -> Result<Option<u128>, BuildError> {
        let Some(raw) = self.amount.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let amount = parse_amount(raw).map_err(BuildError::InvalidAmount)?;
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
        Ok(Some(amount))
    }

    fn bytecode(&self) -> Result<String, BuildError> {
        let code = self.bytecode.trim();
        if code.is_empty() {
            return Err(BuildError::InvalidBytecode("empty".into()));
        }
        hex::decode(code).map_err(|e| BuildError::InvalidBytecode(e.to_string()))?;
        Ok(code.to_ascii_lowercase())
    }
}

/// Strategy for [`ContractCallData`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ContractCallTx;

#[async_trait]
impl TxStrategy for ContractCallTx {
    type Data = ContractCallData;

    fn kind(&self) -> TransactionType {
        TransactionType::Contract
    }

    async fn build(
        &self,
        client: &dyn NodeClient,
        data: &ContractCallData,
        _ctx: &TxContext,
    ) -> Result<BuildOutcome, BuildError> {
        let bytecode = data.bytecode()?;
        let amount = data.attached_amount()?;
        let gas = GasSettings::parse(data.gas_amount.as_deref(), data.gas_price.as_deref())?;
        let request = ContractCallRequest {
            from: data.from_address.hash.clone(),
            from_public_key: data.from_address.public_key.clone(),
            bytecode,
            amount,
            gas_amount: gas.gas_amount,
            gas_price: gas.gas_price,
        };
        let unsigned = client.build_contract_call(&request).await?;
        BuildOutcome::single(unsigned)
    }

    fn check(&self, data: &ContractCallData, ctx: &TxContext) -> TxSummary {
        let amount = data.attached_amount().ok().flatten();
        let gas = GasSettings::parse(data.gas_amount.as_deref(), data.gas_price.as_deref())
            .unwrap_or_default();
        TxSummary::from_context(TransactionType::Contract, &data.from_address.hash, None, amount, ctx)
            .with_gas(&gas)
    }

    fn plan_send(&self, data: &ContractCallData, ctx: &TxContext) -> Option<SendPlan> {
        let unsigned = ctx.unsigned_transaction()?;
        Some(SendPlan::Single(SignAndSendRequest {
            from: data.from_address.hash.clone(),
            tx_id: unsigned.tx_id.clone(),
            unsigned_tx: unsigned.unsigned_tx.clone(),
            destination: data.from_address.hash.clone(),
            tx_type: TransactionType::Contract,
            network: ctx.current_network(),
            amount: data.attached_amount().ok().flatten(),
        }))
    }
}
