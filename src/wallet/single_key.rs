//! Single-key wallets
//!
//! One WIF private key, one address. The legacy form pays to P2PKH of the
//! key exactly as encoded (compressed or not); the SegWit form wraps a
//! P2WPKH program in P2SH and therefore needs a compressed key.

use bitcoin::key::CompressedPublicKey;
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{Address, Network, NetworkKind, PrivateKey};

use crate::error::{WalletError, WalletResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleKeyScript {
    P2pkh,
    P2shP2wpkh,
}

#[derive(Debug, Clone)]
pub struct SingleKeyWallet {
    script: SingleKeyScript,
    network: Network,
    address: Option<String>,
}

impl SingleKeyWallet {
    pub fn new(script: SingleKeyScript, network: Network) -> Self {
        Self {
            script,
            network,
            address: None,
        }
    }

    pub fn script(&self) -> SingleKeyScript {
        self.script
    }

    /// Parse `wif` and derive the address. A failed parse leaves the wallet
    /// without an address.
    pub fn set_secret(&mut self, wif: &str) -> WalletResult<()> {
        self.address = None;

        let key = PrivateKey::from_wif(wif)
            .map_err(|e| WalletError::invalid_private_key(format!("Invalid WIF: {}", e)))?;
        if key.network != NetworkKind::from(self.network) {
            return Err(WalletError::invalid_private_key(format!(
                "WIF is not encoded for {}",
                self.network
            )));
        }

        let secp = Secp256k1::new();
        let address = match self.script {
            SingleKeyScript::P2pkh => {
                Address::p2pkh(key.public_key(&secp).pubkey_hash(), self.network)
            }
            SingleKeyScript::P2shP2wpkh => {
                let compressed = CompressedPublicKey::from_private_key(&secp, &key).map_err(|_| {
                    WalletError::invalid_private_key("SegWit requires a compressed key")
                })?;
                Address::p2shwpkh(&compressed, self.network)
            }
        };

        self.address = Some(address.to_string());
        Ok(())
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}
