//! Fixtures shared by the unit tests of this crate.

use async_trait::async_trait;
use mockall::mock;
use parking_lot::Mutex;

use alder_core::address::{Address, AddressHash};
use alder_core::constants::COIN;
use alder_core::error::ClientError;
use alder_core::traits::{AddressStore, NodeClient, UiSink};
use alder_core::types::{
    ContractCallRequest, Notification, SendCompletion, SentTx, SignAndSendRequest, SweepBuild,
    SweepTx, TransactionRecord, TransferRequest, UnsignedTx,
};

mock! {
    pub Node {}

    #[async_trait]
    impl NodeClient for Node {
        async fn build_sweep_transactions(
            &self,
            from: &Address,
            to: &AddressHash,
        ) -> Result<SweepBuild, ClientError>;
        async fn create_transaction(&self, request: &TransferRequest) -> Result<UnsignedTx, ClientError>;
        async fn build_contract_call(
            &self,
            request: &ContractCallRequest,
        ) -> Result<UnsignedTx, ClientError>;
        async fn sign_and_send_transaction(
            &self,
            request: &SignAndSendRequest,
        ) -> Result<SentTx, ClientError>;
    }
}

pub fn hash(seed: u8) -> AddressHash {
    let mut bytes = vec![0x00];
    bytes.extend_from_slice(&[seed; 32]);
    AddressHash::parse(&bs58::encode(bytes).into_string()).unwrap()
}

/// Address `seed` holding `coins` whole coins, nothing locked.
pub fn address(seed: u8, coins: u128) -> Address {
    Address::new(hash(seed), format!("pk{seed}"), coins * COIN, 0).unwrap()
}

pub fn unsigned(tx_id: &str, gas_amount: u64, gas_price: u128) -> UnsignedTx {
    UnsignedTx {
        tx_id: tx_id.into(),
        unsigned_tx: format!("raw-{tx_id}"),
        from_group: 0,
        to_group: 1,
        gas_amount,
        gas_price,
    }
}

pub fn sweep_build(n: usize, fees: u128) -> SweepBuild {
    SweepBuild {
        unsigned_txs: (0..n)
            .map(|i| SweepTx {
                tx_id: format!("s{i}"),
                unsigned_tx: format!("raw-s{i}"),
            })
            .collect(),
        fees,
    }
}

/// Store and sink that keep everything they receive.
#[derive(Default)]
pub struct Recorder {
    pub records: Mutex<Vec<TransactionRecord>>,
    pub refreshed: Mutex<Vec<AddressHash>>,
    pub notifications: Mutex<Vec<Notification>>,
    pub completions: Mutex<Vec<SendCompletion>>,
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
