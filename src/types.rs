//! Shared types for the wallet core
//!
//! Data structures that cross module boundaries are defined here
//! for consistent serialization.

use bitcoin::Network;
use serde::{Deserialize, Serialize};

// =============================================================================
// Chain Types
// =============================================================================

/// Supported networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
    #[default]
    Bitcoin,
    BitcoinTestnet,
}

impl Chain {
    pub fn network(&self) -> Network {
        match self {
            Chain::Bitcoin => Network::Bitcoin,
            Chain::BitcoinTestnet => Network::Testnet,
        }
    }

    /// BIP-44 coin type used in derivation paths.
    pub fn coin_type(&self) -> u32 {
        match self {
            Chain::Bitcoin => 0,
            Chain::BitcoinTestnet => 1,
        }
    }

    /// Default Esplora REST endpoint.
    pub fn default_esplora_url(&self) -> &'static str {
        match self {
            Chain::Bitcoin => "https://mempool.space/api",
            Chain::BitcoinTestnet => "https://mempool.space/testnet/api",
        }
    }
}

impl std::str::FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bitcoin" | "mainnet" | "main" => Ok(Chain::Bitcoin),
            "bitcoin-testnet" | "testnet" | "test" => Ok(Chain::BitcoinTestnet),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

// =============================================================================
// Transaction Types
// =============================================================================

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionDirection {
    Incoming,
    Outgoing,
    Self_,
}

/// One transaction touching at least one wallet address, amounts in sats
/// and netted over all of the wallet's addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: String,
    pub direction: TransactionDirection,
    pub amount: u64,
    pub fee: Option<u64>,
    pub timestamp: Option<u64>,
    pub block_height: Option<u64>,
    pub status: TransactionStatus,
}

/// Spendable output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    pub value: u64,
    pub address: String,
    pub confirmed: bool,
    pub block_height: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_parsing() {
        assert_eq!("testnet".parse::<Chain>().unwrap(), Chain::BitcoinTestnet);
        assert_eq!("Bitcoin".parse::<Chain>().unwrap(), Chain::Bitcoin);
        assert!("litecoin".parse::<Chain>().is_err());
    }

    #[test]
    fn test_chain_serde() {
        let json = serde_json::to_string(&Chain::BitcoinTestnet).unwrap();
        assert_eq!(json, "\"bitcoin-testnet\"");
        assert_eq!(Chain::BitcoinTestnet.network(), Network::Testnet);
        assert_eq!(Chain::BitcoinTestnet.coin_type(), 1);
    }
}
