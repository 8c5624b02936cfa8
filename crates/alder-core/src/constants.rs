//! Protocol and wallet constants. All monetary values in smallest units
//! (1 ALD = 10^18 units).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits of one coin.
pub const DECIMALS: usize = 18;

/// One whole coin in smallest units.
pub const COIN: u128 = 1_000_000_000_000_000_000;

/// Lowest gas amount the node accepts for a transaction.
pub const MINIMAL_GAS_AMOUNT: u64 = 20_000;

/// Lowest gas price the node accepts, in smallest units (0.0000001 ALD).
pub const MINIMAL_GAS_PRICE: u128 = 100_000_000_000;

/// Ticker shown next to formatted amounts.
pub const SYMBOL: &str = "ALD";

/// Network the wallet talks to.
///
/// Controls the default node and explorer endpoints and is passed to every
/// sign-and-broadcast call so pending records are tagged correctly.
///
/// # Examples
///
/// ```
/// use alder_core::constants::Network;
/// let net: Network = "testnet".parse().unwrap();
/// assert_eq!(net, Network::Testnet);
/// assert_eq!(net.to_string(), "testnet");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    #[default]
    Mainnet,
    /// Public test network.
    Testnet,
    /// A devnet node running on this machine.
    Localhost,
    /// User supplied endpoints; no presets.
    Custom,
}

impl Network {
    /// Default node REST endpoint, `None` for [`Network::Custom`].
    ///
    /// # Examples
    ///
    /// ```
    /// use alder_core::constants::Network;
    /// assert_eq!(Network::Localhost.default_node_host(), Some("http://127.0.0.1:22973"));
    /// assert_eq!(Network::Custom.default_node_host(), None);
    /// ```
    pub fn default_node_host(&self) -> Option<&'static str> {
        match self {
            Self::Mainnet => Some("https://node.mainnet.alder-wallet.org"),
            Self::Testnet => Some("https://node.testnet.alder-wallet.org"),
            Self::Localhost => Some("http://127.0.0.1:22973"),
            Self::Custom => None,
        }
    }

    /// Default explorer API endpoint, `None` for [`Network::Custom`].
    pub fn default_explorer_api_host(&self) -> Option<&'static str> {
        match self {
            Self::Mainnet => Some("https://backend.mainnet.alder-wallet.org"),
            Self::Testnet => Some("https://backend.testnet.alder-wallet.org"),
            Self::Localhost => Some("http://127.0.0.1:9090"),
            Self::Custom => None,
        }
    }

    /// Lowercase identifier used in configuration and pending records.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Localhost => "localhost",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "localhost" => Ok(Self::Localhost),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown network: {other}")),
        }
    }
}
