//! Integration tests for the Alder send pipeline.
//!
//! The tests drive [`alder_wallet::TxModal`] end to end against a scripted
//! node that records every call, can fail chosen broadcasts and can hold a
//! call open so a session can be closed while it is in flight.

pub mod helpers;
