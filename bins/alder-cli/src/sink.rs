//! Terminal output and the in-memory pending list of one CLI run.

use std::collections::BTreeSet;

use alder_core::address::AddressHash;
use alder_core::amount::format_amount;
use alder_core::constants::SYMBOL;
use alder_core::traits::{AddressStore, UiSink};
use alder_core::types::{Notification, NotificationKind, SendCompletion, TransactionRecord};
use parking_lot::Mutex;
use tracing::info;

/// Prints notifications and remembers what was broadcast.
#[derive(Default)]
pub struct ConsoleSink {
    pending: Mutex<Vec<TransactionRecord>>,
    stale: Mutex<BTreeSet<String>>,
}

impl ConsoleSink {
    /// Transactions broadcast during this run.
    pub fn pending(&self) -> Vec<TransactionRecord> {
        self.pending.lock().clone()
    }

    /// Addresses whose balance changed during this run.
    pub fn stale_addresses(&self) -> Vec<String> {
        self.stale.lock().iter().cloned().collect()
    }
}

impl AddressStore for ConsoleSink {
    fn add_pending_transaction(&self, record: TransactionRecord) {
        let amount = record
            .amount
            .map(|a| format!("{} {SYMBOL}", format_amount(a)))
            .unwrap_or_else(|| "full balance".to_string());
        println!("  broadcast {} ({}, {amount})", record.tx_id, record.tx_type);
        self.pending.lock().push(record);
    }

    fn refresh_address(&self, hash: &AddressHash) {
        if self.stale.lock().insert(hash.to_string()) {
            info!(address = %hash, "balance changed, refresh pending");
        }
    }
}

impl UiSink for ConsoleSink {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Alert => eprintln!("error: {}", notification.text),
            NotificationKind::Info | NotificationKind::Success => println!("{}", notification.text),
        }
    }

    fn send_completed(&self, completion: &SendCompletion) {
        if let Some(signature) = &completion.signature {
            println!("Signature: {signature}");
        }
        if let Some(result) = &completion.wallet_connect {
            match serde_json::to_string_pretty(result) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("error: cannot encode signing result: {e}"),
            }
        }
    }
}
