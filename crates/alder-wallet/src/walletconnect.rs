//! Signing result returned to a wallet-connect peer.

use alder_core::types::SignTransferTxResult;

use crate::context::TxContext;
use crate::error::TxError;

/// Combine the built transaction with its signature.
///
/// Only a single unsigned transaction can be answered; sweeps and sessions
/// without a build fail with [`TxError::NoUnsignedTransaction`].
pub fn get_wallet_connect_result(
    ctx: &TxContext,
    signature: &str,
) -> Result<SignTransferTxResult, TxError> {
    let unsigned = ctx.unsigned_transaction().ok_or(TxError::NoUnsignedTransaction)?;
    Ok(SignTransferTxResult {
        from_group: unsigned.from_group,
        to_group: unsigned.to_group,
        unsigned_tx: unsigned.unsigned_tx.clone(),
        tx_id: unsigned.tx_id.clone(),
        signature: signature.to_owned(),
        gas_amount: unsigned.gas_amount,
        gas_price: unsigned.gas_price,
    })
}
