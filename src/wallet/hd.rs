//! HD wallets (BIP44 / BIP49 / BIP84)
//!
//! A BIP-39 mnemonic (empty passphrase) is turned into a BIP-32 master key,
//! the account `m/{purpose}'/{coin}'/0'` is derived once, and addresses are
//! generated from the account xpub for the external (0) and change (1)
//! chains up to the gap limit.

use std::str::FromStr;

use bip39::{Language, Mnemonic};
use bitcoin::bip32::{ChildNumber, DerivationPath, Xpriv, Xpub};
use bitcoin::key::CompressedPublicKey;
use bitcoin::secp256k1::{Secp256k1, Verification};
use bitcoin::{Address, Network};
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};
use crate::types::Chain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HdPurpose {
    /// P2PKH
    Bip44,
    /// P2SH-P2WPKH
    Bip49,
    /// P2WPKH
    Bip84,
}

impl HdPurpose {
    pub fn index(&self) -> u32 {
        match self {
            HdPurpose::Bip44 => 44,
            HdPurpose::Bip49 => 49,
            HdPurpose::Bip84 => 84,
        }
    }

    /// `m/{purpose}'/{coin}'/0'`
    pub fn account_path(&self, chain: Chain) -> WalletResult<DerivationPath> {
        let path = format!("m/{}'/{}'/0'", self.index(), chain.coin_type());
        Ok(DerivationPath::from_str(&path)?)
    }

    pub fn address(&self, key: &CompressedPublicKey, network: Network) -> Address {
        match self {
            HdPurpose::Bip44 => Address::p2pkh(key.pubkey_hash(), network),
            HdPurpose::Bip49 => Address::p2shwpkh(key, network),
            HdPurpose::Bip84 => Address::p2wpkh(key, network),
        }
    }
}

/// Structural BIP-39 check against the English wordlist.
pub fn is_valid_bip39(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// Account-level extended private key for `phrase`.
pub(crate) fn account_xpriv(phrase: &str, path: &DerivationPath, chain: Chain) -> WalletResult<Xpriv> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::invalid_mnemonic(format!("Invalid BIP39 mnemonic: {}", e)))?;
    let seed = Zeroizing::new(mnemonic.to_seed_normalized(""));

    let secp = Secp256k1::new();
    let master = Xpriv::new_master(chain.network(), seed.as_ref())?;
    Ok(master.derive_priv(&secp, path)?)
}

/// Public key at `{chain}/{index}` below an account xpub.
pub(crate) fn child_key<C: Verification>(
    secp: &Secp256k1<C>,
    account: &Xpub,
    change: u32,
    index: u32,
) -> WalletResult<CompressedPublicKey> {
    let path = [
        ChildNumber::from_normal_idx(change)?,
        ChildNumber::from_normal_idx(index)?,
    ];
    let child = account.derive_pub(secp, &path)?;
    Ok(CompressedPublicKey(child.public_key))
}

#[derive(Debug, Clone)]
pub struct HdWallet {
    purpose: HdPurpose,
    chain: Chain,
    gap_limit: u32,
    account_xpub: Option<Xpub>,
    external: Vec<String>,
    internal: Vec<String>,
}

impl HdWallet {
    pub fn new(purpose: HdPurpose, chain: Chain, gap_limit: u32) -> Self {
        Self {
            purpose,
            chain,
            gap_limit,
            account_xpub: None,
            external: Vec::new(),
            internal: Vec::new(),
        }
    }

    pub fn purpose(&self) -> HdPurpose {
        self.purpose
    }

    pub fn set_secret(&mut self, phrase: &str) -> WalletResult<()> {
        self.account_xpub = None;
        self.external.clear();
        self.internal.clear();

        let path = self.purpose.account_path(self.chain)?;
        let account = account_xpriv(phrase, &path, self.chain)?;

        let secp = Secp256k1::new();
        let xpub = Xpub::from_priv(&secp, &account);
        let network = self.chain.network();

        let mut external = Vec::with_capacity(self.gap_limit as usize);
        let mut internal = Vec::with_capacity(self.gap_limit as usize);
        for index in 0..self.gap_limit {
            let key = child_key(&secp, &xpub, 0, index)?;
            external.push(self.purpose.address(&key, network).to_string());
            let key = child_key(&secp, &xpub, 1, index)?;
            internal.push(self.purpose.address(&key, network).to_string());
        }

        self.account_xpub = Some(xpub);
        self.external = external;
        self.internal = internal;
        Ok(())
    }

    /// First receive address.
    pub fn address(&self) -> Option<&str> {
        self.external.first().map(String::as_str)
    }

    /// Receive addresses followed by change addresses.
    pub fn addresses(&self) -> Vec<String> {
        self.external.iter().chain(self.internal.iter()).cloned().collect()
    }

    pub fn external_addresses(&self) -> &[String] {
        &self.external
    }

    pub fn internal_addresses(&self) -> &[String] {
        &self.internal
    }

    pub fn xpub(&self) -> Option<String> {
        self.account_xpub.as_ref().map(Xpub::to_string)
    }
}
