//! Wallet addresses and their balances.
//!
//! An [`AddressHash`] is the base58 string form of an address: one type byte
//! followed by at least a 32-byte key or script hash. The wallet does not
//! derive addresses itself; it only validates user input before handing it
//! to the node.
//!
//! [`Address`] is the record the host keeps for every wallet address. It is
//! read-only from the send pipeline's perspective.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

/// Minimum decoded length of an address: type byte + 32-byte hash.
pub const MIN_ADDRESS_BYTES: usize = 33;

/// Validated base58 address string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AddressHash(String);

impl AddressHash {
    /// Validate and wrap an address string.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }
        let bytes = bs58::decode(trimmed)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
        if bytes.len() < MIN_ADDRESS_BYTES {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AddressHash {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AddressHash {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AddressHash> for String {
    fn from(hash: AddressHash) -> Self {
        hash.0
    }
}

/// Balance of one token held by an address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    /// Total token balance.
    pub balance: u128,
    /// Portion of `balance` that is time-locked.
    pub locked_balance: u128,
}

/// A wallet address with its balances.
///
/// `balance` is the total; `locked_balance` the time-locked part. The
/// spendable amount is derived, so `balance == available + locked` holds by
/// construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Address {
    /// Address hash.
    pub hash: AddressHash,
    /// Hex-encoded public key used by the node to build transactions.
    pub public_key: String,
    balance: u128,
    locked_balance: u128,
    /// Token balances keyed by token id.
    pub tokens: BTreeMap<String, TokenBalance>,
}

impl Address {
    /// Create an address record. Rejects a locked balance above the total.
    pub fn new(
        hash: AddressHash,
        public_key: impl Into<String>,
        balance: u128,
        locked_balance: u128,
    ) -> Result<Self, AddressError> {
        if locked_balance > balance {
            return Err(AddressError::LockedExceedsBalance {
                balance,
                locked: locked_balance,
            });
        }
        Ok(Self {
            hash,
            public_key: public_key.into(),
            balance,
            locked_balance,
            tokens: BTreeMap::new(),
        })
    }

    /// Attach a token balance (builder style).
    pub fn with_token(mut self, id: impl Into<String>, token: TokenBalance) -> Self {
        self.tokens.insert(id.into(), token);
        self
    }

    /// Total balance in smallest units.
    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// Time-locked balance in smallest units.
    pub fn locked_balance(&self) -> u128 {
        self.locked_balance
    }

    /// Spendable balance: `balance - locked_balance`.
    pub fn available_balance(&self) -> u128 {
        self.balance - self.locked_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hash(seed: u8) -> AddressHash {
        let mut bytes = vec![0x00];
        bytes.extend_from_slice(&[seed; 32]);
        AddressHash::parse(&bs58::encode(bytes).into_string()).unwrap()
    }

    #[test]
    fn parse_valid_hash() {
        let h = sample_hash(7);
        assert!(!h.as_str().is_empty());
        assert_eq!(h.to_string(), h.as_str());
    }

    #[test]
    fn parse_trims_whitespace() {
        let h = sample_hash(1);
        let padded = format!("  {h}  ");
        assert_eq!(AddressHash::parse(&padded).unwrap(), h);
    }

    #[test]
    fn parse_empty_fails() {
        assert_eq!(AddressHash::parse(" "), Err(AddressError::Empty));
    }

    #[test]
    fn parse_non_base58_fails() {
        // '0' and 'l' are not in the base58 alphabet.
        assert!(matches!(
            AddressHash::parse("0l0l0l"),
            Err(AddressError::InvalidBase58(_))
        ));
    }

    #[test]
    fn parse_short_fails() {
        let short = bs58::encode([1u8; 10]).into_string();
        assert_eq!(AddressHash::parse(&short), Err(AddressError::InvalidLength(10)));
    }

    #[test]
    fn serde_validates() {
        let h = sample_hash(3);
        let json = serde_json::to_string(&h).unwrap();
        let back: AddressHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
        assert!(serde_json::from_str::<AddressHash>("\"nope!\"").is_err());
    }

    #[test]
    fn available_is_balance_minus_locked() {
        let a = Address::new(sample_hash(2), "pk", 100, 30).unwrap();
        assert_eq!(a.available_balance(), 70);
        assert_eq!(a.available_balance() + a.locked_balance(), a.balance());
    }

    #[test]
    fn locked_above_balance_rejected() {
        let err = Address::new(sample_hash(2), "pk", 10, 11).unwrap_err();
        assert_eq!(err, AddressError::LockedExceedsBalance { balance: 10, locked: 11 });
    }

    #[test]
    fn tokens_are_attached() {
        let a = Address::new(sample_hash(4), "pk", 1, 0)
            .unwrap()
            .with_token("usdt", TokenBalance { balance: 5, locked_balance: 1 });
        assert_eq!(a.tokens["usdt"].balance, 5);
    }
}
