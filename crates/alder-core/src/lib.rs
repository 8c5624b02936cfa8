//! # alder-core
//! Foundation types and collaborator traits for the Alder wallet.
//!
//! All monetary values are integers in the smallest unit (1 ALD = 10^18
//! units) and are carried as `u128`.

pub mod address;
pub mod amount;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
