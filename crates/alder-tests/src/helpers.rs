//! Shared test helpers for integration and property tests.

use std::collections::HashMap;
use std::sync::Arc;

use alder_core::address::{Address, AddressHash};
use alder_core::constants::{COIN, Network};
use alder_core::error::ClientError;
use alder_core::traits::{AddressStore, NodeClient, UiSink};
use alder_core::types::*;
use alder_wallet::{TxModal, TxStrategy};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

/// Address hash derived from a seed byte.
pub fn hash(seed: u8) -> AddressHash {
    let mut bytes = vec![0x00];
    bytes.extend_from_slice(&[seed; 32]);
    AddressHash::parse(&bs58::encode(bytes).into_string()).unwrap()
}

/// Address `seed` with `coins` whole coins available.
pub fn address(seed: u8, coins: u128) -> Address {
    address_units(seed, coins * COIN, 0)
}

/// Address `seed` with an exact balance in smallest units.
pub fn address_units(seed: u8, balance: u128, locked: u128) -> Address {
    Address::new(hash(seed), format!("pk{seed}"), balance, locked).unwrap()
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Holds node calls open until the test releases them.
pub struct Gate {
    entered: Semaphore,
    release: Semaphore,
}

impl Gate {
    fn new() -> Self {
        Self {
            entered: Semaphore::new(0),
            release: Semaphore::new(0),
        }
    }

    /// Wait until a call reached the gate.
    pub async fn entered(&self) {
        if let Ok(permit) = self.entered.acquire().await {
            permit.forget();
        }
    }

    /// Let `n` held calls continue.
    pub fn release(&self, n: usize) {
        self.release.add_permits(n);
    }

    async fn pass(&self) {
        self.entered.add_permits(1);
        if let Ok(permit) = self.release.acquire().await {
            permit.forget();
        }
    }
}

// ---------------------------------------------------------------------------
// Scripted node
// ---------------------------------------------------------------------------

/// A call received by [`ScriptedNode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    BuildSweep { from: AddressHash, to: AddressHash },
    CreateTransaction(TransferRequest),
    ContractCall(ContractCallRequest),
    SignAndSend(SignAndSendRequest),
}

/// Node client answering from a fixed script.
///
/// Transfers build `t1` with the configured gas; sweeps build `s0..sN`.
/// Broadcasts succeed with signature `sig-<tx_id>` unless a failure was
/// scripted for that id. Scripted failures fire once.
pub struct ScriptedNode {
    sweep_len: usize,
    sweep_fees: u128,
    gas_amount: u64,
    gas_price: u128,
    consolidation_required: bool,
    failures: Mutex<HashMap<String, ClientError>>,
    calls: Mutex<Vec<Call>>,
    build_gate: Option<Arc<Gate>>,
    send_gate: Option<Arc<Gate>>,
}

impl Default for ScriptedNode {
    fn default() -> Self {
        Self {
            sweep_len: 1,
            sweep_fees: 0,
            gas_amount: 20_000,
            gas_price: 100,
            consolidation_required: false,
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            build_gate: None,
            send_gate: None,
        }
    }
}

impl ScriptedNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sweeps produce `len` transactions with aggregate `fees`.
    pub fn with_sweep(mut self, len: usize, fees: u128) -> Self {
        self.sweep_len = len;
        self.sweep_fees = fees;
        self
    }

    /// Gas reported for built single transactions.
    pub fn with_gas(mut self, gas_amount: u64, gas_price: u128) -> Self {
        self.gas_amount = gas_amount;
        self.gas_price = gas_price;
        self
    }

    /// Refuse transfers until the source is consolidated.
    pub fn requiring_consolidation(mut self) -> Self {
        self.consolidation_required = true;
        self
    }

    /// Fail the next broadcast of `tx_id`.
    pub fn failing(self, tx_id: &str, error: ClientError) -> Self {
        self.failures.lock().insert(tx_id.to_string(), error);
        self
    }

    /// Hold every build call at a gate.
    pub fn gated_builds(mut self) -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::new());
        self.build_gate = Some(gate.clone());
        (self, gate)
    }

    /// Hold every broadcast at a gate.
    pub fn gated_sends(mut self) -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::new());
        self.send_gate = Some(gate.clone());
        (self, gate)
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Broadcasts attempted so far, in order.
    pub fn sends(&self) -> Vec<SignAndSendRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::SignAndSend(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }

    fn sweep(&self) -> SweepBuild {
        SweepBuild {
            unsigned_txs: (0..self.sweep_len)
                .map(|i| SweepTx {
                    tx_id: format!("s{i}"),
                    unsigned_tx: format!("raw-s{i}"),
                })
                .collect(),
            fees: self.sweep_fees,
        }
    }

    fn single(&self, tx_id: &str) -> UnsignedTx {
        UnsignedTx {
            tx_id: tx_id.to_string(),
            unsigned_tx: format!("raw-{tx_id}"),
            from_group: 0,
            to_group: 0,
            gas_amount: self.gas_amount,
            gas_price: self.gas_price,
        }
    }

    async fn hold_build(&self) {
        if let Some(gate) = &self.build_gate {
            gate.pass().await;
        }
    }
}

#[async_trait]
impl NodeClient for ScriptedNode {
    async fn build_sweep_transactions(
        &self,
        from: &Address,
        to: &AddressHash,
    ) -> Result<SweepBuild, ClientError> {
        self.calls.lock().push(Call::BuildSweep {
            from: from.hash.clone(),
            to: to.clone(),
        });
        self.hold_build().await;
        Ok(self.sweep())
    }

    async fn create_transaction(&self, request: &TransferRequest) -> Result<UnsignedTx, ClientError> {
        self.calls.lock().push(Call::CreateTransaction(request.clone()));
        self.hold_build().await;
        if self.consolidation_required {
            return Err(ClientError::ConsolidationRequired("too many inputs".into()));
        }
        Ok(self.single("t1"))
    }

    async fn build_contract_call(
        &self,
        request: &ContractCallRequest,
    ) -> Result<UnsignedTx, ClientError> {
        self.calls.lock().push(Call::ContractCall(request.clone()));
        self.hold_build().await;
        Ok(self.single("c1"))
    }

    async fn sign_and_send_transaction(
        &self,
        request: &SignAndSendRequest,
    ) -> Result<SentTx, ClientError> {
        self.calls.lock().push(Call::SignAndSend(request.clone()));
        if let Some(gate) = &self.send_gate {
            gate.pass().await;
        }
        if let Some(error) = self.failures.lock().remove(&request.tx_id) {
            return Err(error);
        }
        Ok(SentTx {
            tx_id: request.tx_id.clone(),
            signature: format!("sig-{}", request.tx_id),
        })
    }
}

// ---------------------------------------------------------------------------
// Recording store and sink
// ---------------------------------------------------------------------------

/// Address store and UI sink keeping everything they receive.
#[derive(Default)]
pub struct Recorder {
    records: Mutex<Vec<TransactionRecord>>,
    refreshed: Mutex<Vec<AddressHash>>,
    notifications: Mutex<Vec<Notification>>,
    completions: Mutex<Vec<SendCompletion>>,
}

impl Recorder {
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.records.lock().clone()
    }

    pub fn refreshed(&self) -> Vec<AddressHash> {
        self.refreshed.lock().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn completions(&self) -> Vec<SendCompletion> {
        self.completions.lock().clone()
    }

    /// Whether nothing at all was written.
    pub fn is_untouched(&self) -> bool {
        self.records.lock().is_empty()
            && self.refreshed.lock().is_empty()
            && self.notifications.lock().is_empty()
            && self.completions.lock().is_empty()
    }
}

impl AddressStore for Recorder {
    fn add_pending_transaction(&self, record: TransactionRecord) {
        self.records.lock().push(record);
    }

    fn refresh_address(&self, hash: &AddressHash) {
        self.refreshed.lock().push(hash.clone());
    }
}

impl UiSink for Recorder {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }

    fn send_completed(&self, completion: &SendCompletion) {
        self.completions.lock().push(completion.clone());
    }
}

/// A modal on mainnet wired to `node` and a fresh [`Recorder`].
pub fn open_modal<S: TxStrategy>(
    strategy: S,
    node: &Arc<ScriptedNode>,
) -> (Arc<TxModal<S>>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let modal = TxModal::new(
        strategy,
        node.clone(),
        recorder.clone(),
        recorder.clone(),
        Network::Mainnet,
    );
    (Arc::new(modal), recorder)
}
