//! Watch-only wallets: a bare address, no keys.

use std::str::FromStr;

use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Network};

use crate::error::{WalletError, WalletResult};

#[derive(Debug, Clone)]
pub struct WatchOnlyWallet {
    network: Network,
    address: Option<String>,
}

impl WatchOnlyWallet {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            address: None,
        }
    }

    /// Accepts any address that parses and belongs to the wallet's network.
    pub fn set_secret(&mut self, address: &str) -> WalletResult<()> {
        self.address = None;

        let unchecked = Address::<NetworkUnchecked>::from_str(address)
            .map_err(|e| WalletError::invalid_address(format!("Invalid address: {}", e)))?;
        let checked = unchecked.require_network(self.network).map_err(|_| {
            WalletError::invalid_address(format!("Address is not valid on {}", self.network))
        })?;

        self.address = Some(checked.to_string());
        Ok(())
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.address.is_some()
    }
}
