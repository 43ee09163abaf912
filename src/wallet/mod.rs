//! Wallet Module
//!
//! The closed family of wallet formats a secret can be imported as. Every
//! format is a variant of [`WalletVariant`]; [`Wallet`] adds what they all
//! share (secret, label, history and UTXO caches).

pub mod hd;
pub mod single_key;
pub mod vault;
pub mod watch_only;

pub use hd::{is_valid_bip39, HdPurpose, HdWallet};
pub use single_key::{SingleKeyScript, SingleKeyWallet};
pub use vault::{redeem_script, KeyRole, VaultKind, VaultWallet};
pub use watch_only::WatchOnlyWallet;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::WalletResult;
use crate::history::TransactionSource;
use crate::types::{Chain, Transaction, Utxo};
use crate::utils::WalletConfig;

// =============================================================================
// Wallet Kinds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletKind {
    #[serde(rename = "legacy")]
    Legacy,
    #[serde(rename = "segwitP2SH")]
    SegwitP2SH,
    #[serde(rename = "HDsegwitP2SH")]
    HdSegwitP2SH,
    #[serde(rename = "HDsegwitBech32")]
    HdSegwitBech32,
    #[serde(rename = "HDlegacyP2PKH")]
    HdLegacyP2PKH,
    #[serde(rename = "watchOnly")]
    WatchOnly,
    #[serde(rename = "HDsegwitP2SHar")]
    VaultAR,
    #[serde(rename = "HDsegwitP2SHair")]
    VaultAIR,
}

impl WalletKind {
    pub const ALL: [WalletKind; 8] = [
        WalletKind::Legacy,
        WalletKind::SegwitP2SH,
        WalletKind::HdSegwitP2SH,
        WalletKind::HdSegwitBech32,
        WalletKind::HdLegacyP2PKH,
        WalletKind::WatchOnly,
        WalletKind::VaultAR,
        WalletKind::VaultAIR,
    ];

    /// Stable identifier, also used as the serde name.
    pub fn type_tag(&self) -> &'static str {
        match self {
            WalletKind::Legacy => "legacy",
            WalletKind::SegwitP2SH => "segwitP2SH",
            WalletKind::HdSegwitP2SH => "HDsegwitP2SH",
            WalletKind::HdSegwitBech32 => "HDsegwitBech32",
            WalletKind::HdLegacyP2PKH => "HDlegacyP2PKH",
            WalletKind::WatchOnly => "watchOnly",
            WalletKind::VaultAR => "HDsegwitP2SHar",
            WalletKind::VaultAIR => "HDsegwitP2SHair",
        }
    }

    pub fn type_readable(&self) -> &'static str {
        match self {
            WalletKind::Legacy => "Legacy (P2PKH)",
            WalletKind::SegwitP2SH => "SegWit (P2SH)",
            WalletKind::HdSegwitP2SH => "HD P2SH",
            WalletKind::HdSegwitBech32 => "HD SegWit (BIP84 Bech32 Native)",
            WalletKind::HdLegacyP2PKH => "HD Legacy (BIP44 P2PKH)",
            WalletKind::WatchOnly => "Watch-only",
            WalletKind::VaultAR => "2-Key Vault",
            WalletKind::VaultAIR => "3-Key Vault",
        }
    }

    pub fn is_hd(&self) -> bool {
        matches!(
            self,
            WalletKind::HdSegwitP2SH | WalletKind::HdSegwitBech32 | WalletKind::HdLegacyP2PKH
        )
    }

    pub fn vault_kind(&self) -> Option<VaultKind> {
        match self {
            WalletKind::VaultAR => Some(VaultKind::Ar),
            WalletKind::VaultAIR => Some(VaultKind::Air),
            _ => None,
        }
    }

    pub fn is_vault(&self) -> bool {
        self.vault_kind().is_some()
    }
}

impl From<VaultKind> for WalletKind {
    fn from(kind: VaultKind) -> Self {
        match kind {
            VaultKind::Ar => WalletKind::VaultAR,
            VaultKind::Air => WalletKind::VaultAIR,
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}

impl FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WalletKind::ALL
            .iter()
            .find(|k| k.type_tag() == s)
            .copied()
            .ok_or_else(|| format!("Unknown wallet type: {}", s))
    }
}

// =============================================================================
// Wallet
// =============================================================================

/// Format-specific state, one variant per [`WalletKind`].
#[derive(Debug, Clone)]
pub enum WalletVariant {
    Legacy(SingleKeyWallet),
    SegwitP2SH(SingleKeyWallet),
    HdSegwitP2SH(HdWallet),
    HdSegwitBech32(HdWallet),
    HdLegacyP2PKH(HdWallet),
    WatchOnly(WatchOnlyWallet),
    VaultAR(VaultWallet),
    VaultAIR(VaultWallet),
}

impl WalletVariant {
    /// Empty variant for `kind`, ready for a secret.
    pub fn new(kind: WalletKind, chain: Chain, gap_limit: u32) -> Self {
        let network = chain.network();
        match kind {
            WalletKind::Legacy => {
                WalletVariant::Legacy(SingleKeyWallet::new(SingleKeyScript::P2pkh, network))
            }
            WalletKind::SegwitP2SH => WalletVariant::SegwitP2SH(SingleKeyWallet::new(
                SingleKeyScript::P2shP2wpkh,
                network,
            )),
            WalletKind::HdSegwitP2SH => {
                WalletVariant::HdSegwitP2SH(HdWallet::new(HdPurpose::Bip49, chain, gap_limit))
            }
            WalletKind::HdSegwitBech32 => {
                WalletVariant::HdSegwitBech32(HdWallet::new(HdPurpose::Bip84, chain, gap_limit))
            }
            WalletKind::HdLegacyP2PKH => {
                WalletVariant::HdLegacyP2PKH(HdWallet::new(HdPurpose::Bip44, chain, gap_limit))
            }
            WalletKind::WatchOnly => WalletVariant::WatchOnly(WatchOnlyWallet::new(network)),
            WalletKind::VaultAR => {
                WalletVariant::VaultAR(VaultWallet::new(VaultKind::Ar, chain, gap_limit))
            }
            WalletKind::VaultAIR => {
                WalletVariant::VaultAIR(VaultWallet::new(VaultKind::Air, chain, gap_limit))
            }
        }
    }

    pub fn kind(&self) -> WalletKind {
        match self {
            WalletVariant::Legacy(_) => WalletKind::Legacy,
            WalletVariant::SegwitP2SH(_) => WalletKind::SegwitP2SH,
            WalletVariant::HdSegwitP2SH(_) => WalletKind::HdSegwitP2SH,
            WalletVariant::HdSegwitBech32(_) => WalletKind::HdSegwitBech32,
            WalletVariant::HdLegacyP2PKH(_) => WalletKind::HdLegacyP2PKH,
            WalletVariant::WatchOnly(_) => WalletKind::WatchOnly,
            WalletVariant::VaultAR(_) => WalletKind::VaultAR,
            WalletVariant::VaultAIR(_) => WalletKind::VaultAIR,
        }
    }

    fn set_secret(&mut self, secret: &str) -> WalletResult<()> {
        match self {
            WalletVariant::Legacy(w) | WalletVariant::SegwitP2SH(w) => w.set_secret(secret),
            WalletVariant::HdSegwitP2SH(w)
            | WalletVariant::HdSegwitBech32(w)
            | WalletVariant::HdLegacyP2PKH(w) => w.set_secret(secret),
            WalletVariant::WatchOnly(w) => w.set_secret(secret),
            WalletVariant::VaultAR(w) | WalletVariant::VaultAIR(w) => w.set_secret(secret),
        }
    }

    fn address(&self) -> Option<&str> {
        match self {
            WalletVariant::Legacy(w) | WalletVariant::SegwitP2SH(w) => w.address(),
            WalletVariant::HdSegwitP2SH(w)
            | WalletVariant::HdSegwitBech32(w)
            | WalletVariant::HdLegacyP2PKH(w) => w.address(),
            WalletVariant::WatchOnly(w) => w.address(),
            WalletVariant::VaultAR(w) | WalletVariant::VaultAIR(w) => w.address(),
        }
    }

    fn addresses(&self) -> Vec<String> {
        match self {
            WalletVariant::HdSegwitP2SH(w)
            | WalletVariant::HdSegwitBech32(w)
            | WalletVariant::HdLegacyP2PKH(w) => w.addresses(),
            WalletVariant::VaultAR(w) | WalletVariant::VaultAIR(w) => w.addresses(),
            _ => self.address().map(str::to_string).into_iter().collect(),
        }
    }
}

/// A wallet of any kind together with its secret and caches.
#[derive(Clone)]
pub struct Wallet {
    variant: WalletVariant,
    secret: Zeroizing<String>,
    label: String,
    transactions: Vec<Transaction>,
    utxos: Vec<Utxo>,
}

impl Wallet {
    /// Empty wallet of `kind`; call [`Wallet::set_secret`] before use.
    pub fn new(kind: WalletKind, config: &WalletConfig) -> Self {
        Self {
            variant: WalletVariant::new(kind, config.chain, config.gap_limit),
            secret: Zeroizing::new(String::new()),
            label: String::new(),
            transactions: Vec::new(),
            utxos: Vec::new(),
        }
    }

    /// Build a wallet of `kind` and derive it from `secret`.
    pub fn from_secret(kind: WalletKind, secret: &str, config: &WalletConfig) -> WalletResult<Self> {
        let mut wallet = Self::new(kind, config);
        wallet.set_secret(secret)?;
        Ok(wallet)
    }

    /// Derive addresses from `secret`. On failure the wallet keeps no
    /// secret and no address.
    pub fn set_secret(&mut self, secret: &str) -> WalletResult<()> {
        self.secret = Zeroizing::new(String::new());
        self.transactions.clear();
        self.utxos.clear();

        self.variant.set_secret(secret)?;
        self.secret = Zeroizing::new(secret.to_string());
        Ok(())
    }

    pub fn kind(&self) -> WalletKind {
        self.variant.kind()
    }

    pub fn type_tag(&self) -> &'static str {
        self.kind().type_tag()
    }

    pub fn type_readable(&self) -> &'static str {
        self.kind().type_readable()
    }

    pub fn variant(&self) -> &WalletVariant {
        &self.variant
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Primary (first receive) address.
    pub fn address(&self) -> Option<&str> {
        self.variant.address()
    }

    /// Every derived address, receive chain first.
    pub fn addresses(&self) -> Vec<String> {
        self.variant.addresses()
    }

    /// Structural BIP-39 check of the secret. Always false for kinds that
    /// are not mnemonic based.
    pub fn validate_mnemonic(&self) -> bool {
        (self.kind().is_hd() || self.kind().is_vault()) && is_valid_bip39(&self.secret)
    }

    /// Account xpub for HD and vault wallets.
    pub fn xpub(&self) -> Option<String> {
        match &self.variant {
            WalletVariant::HdSegwitP2SH(w)
            | WalletVariant::HdSegwitBech32(w)
            | WalletVariant::HdLegacyP2PKH(w) => w.xpub(),
            WalletVariant::VaultAR(w) | WalletVariant::VaultAIR(w) => w.xpub(),
            _ => None,
        }
    }

    pub fn vault(&self) -> Option<&VaultWallet> {
        match &self.variant {
            WalletVariant::VaultAR(w) | WalletVariant::VaultAIR(w) => Some(w),
            _ => None,
        }
    }

    pub fn vault_mut(&mut self) -> Option<&mut VaultWallet> {
        match &mut self.variant {
            WalletVariant::VaultAR(w) | WalletVariant::VaultAIR(w) => Some(w),
            _ => None,
        }
    }

    /// Replace the transaction cache with the source's view of every
    /// derived address. A wallet without addresses makes no request.
    pub async fn fetch_transactions(&mut self, source: &dyn TransactionSource) -> WalletResult<()> {
        let addresses = self.addresses();
        if addresses.is_empty() {
            self.transactions.clear();
            return Ok(());
        }
        self.transactions = source.fetch_transactions(&addresses).await?;
        Ok(())
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub async fn fetch_utxos(&mut self, source: &dyn TransactionSource) -> WalletResult<()> {
        let addresses = self.addresses();
        if addresses.is_empty() {
            self.utxos.clear();
            return Ok(());
        }
        self.utxos = source.fetch_utxos(&addresses).await?;
        Ok(())
    }

    pub fn utxos(&self) -> &[Utxo] {
        &self.utxos
    }

    pub fn balance(&self) -> u64 {
        self.utxos.iter().map(|u| u.value).sum()
    }

    pub fn summary(&self) -> WalletSummary {
        WalletSummary {
            label: self.label.clone(),
            kind: self.kind(),
            type_readable: self.type_readable().to_string(),
            address: self.address().map(str::to_string),
            address_count: self.addresses().len(),
            xpub: self.xpub(),
            transaction_count: self.transactions.len(),
            balance: self.balance(),
        }
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("kind", &self.kind())
            .field("label", &self.label)
            .field("address", &self.address())
            .field("transactions", &self.transactions.len())
            .finish_non_exhaustive()
    }
}

/// Serializable view of a wallet without its secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSummary {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: WalletKind,
    pub type_readable: String,
    pub address: Option<String>,
    pub address_count: usize,
    pub xpub: Option<String>,
    pub transaction_count: usize,
    pub balance: u64,
}
