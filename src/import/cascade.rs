//! Wallet classifier cascade
//!
//! An ordered table of (kind, constructor) steps and a single driver loop.
//! A step is accepted when its constructor parses the secret and the
//! resulting wallet has history. Steps run strictly one after another:
//! the next candidate is only built once the previous fetch came back
//! empty or failed.

use crate::error::{WalletError, WalletResult};
use crate::history::TransactionSource;
use crate::utils::WalletConfig;
use crate::wallet::{is_valid_bip39, Wallet, WalletKind};
use crate::{log_debug, log_info, log_warn};

use super::cancel::CancelSignal;

const LOG_MODULE: &str = "import";

pub type Constructor = fn(WalletKind, &str, &WalletConfig) -> WalletResult<Wallet>;

#[derive(Clone, Copy)]
pub struct CascadeStep {
    pub kind: WalletKind,
    pub construct: Constructor,
}

/// Non-vault import order. WIF forms come before mnemonics, SegWit before
/// legacy, and a bare address last.
pub const CASCADE: [CascadeStep; 6] = [
    CascadeStep {
        kind: WalletKind::SegwitP2SH,
        construct: construct_single_key,
    },
    CascadeStep {
        kind: WalletKind::Legacy,
        construct: construct_single_key,
    },
    CascadeStep {
        kind: WalletKind::HdSegwitP2SH,
        construct: construct_hd,
    },
    CascadeStep {
        kind: WalletKind::HdSegwitBech32,
        construct: construct_hd,
    },
    CascadeStep {
        kind: WalletKind::HdLegacyP2PKH,
        construct: construct_hd,
    },
    CascadeStep {
        kind: WalletKind::WatchOnly,
        construct: construct_watch_only,
    },
];

fn construct_single_key(kind: WalletKind, secret: &str, config: &WalletConfig) -> WalletResult<Wallet> {
    let wallet = Wallet::from_secret(kind, secret, config)?;
    if wallet.address().is_none() {
        return Err(WalletError::invalid_private_key("WIF produced no address"));
    }
    Ok(wallet)
}

fn construct_hd(kind: WalletKind, secret: &str, config: &WalletConfig) -> WalletResult<Wallet> {
    if !is_valid_bip39(secret) {
        return Err(WalletError::invalid_mnemonic("Not a BIP39 mnemonic"));
    }
    let wallet = Wallet::from_secret(kind, secret, config)?;
    if !wallet.validate_mnemonic() {
        return Err(WalletError::invalid_mnemonic("Not a BIP39 mnemonic"));
    }
    Ok(wallet)
}

fn construct_watch_only(kind: WalletKind, secret: &str, config: &WalletConfig) -> WalletResult<Wallet> {
    Wallet::from_secret(kind, secret, config)
}

/// Kinds whose constructor accepts `secret`, in cascade order. Offline;
/// says nothing about history.
pub fn parseable_kinds(secret: &str, config: &WalletConfig) -> Vec<WalletKind> {
    CASCADE
        .iter()
        .filter(|step| (step.construct)(step.kind, secret, config).is_ok())
        .map(|step| step.kind)
        .collect()
}

/// Run the cascade and return the first candidate with history.
///
/// Construction and fetch failures only fail their own step. Cancellation
/// is checked before every step and raced against every fetch.
pub async fn run_cascade(
    secret: &str,
    config: &WalletConfig,
    source: &dyn TransactionSource,
    cancel: &CancelSignal,
) -> WalletResult<Wallet> {
    for step in CASCADE.iter() {
        if cancel.is_cancelled() {
            log_info!(LOG_MODULE, "Import cancelled", before = step.kind);
            return Err(WalletError::cancelled());
        }

        let mut candidate = match (step.construct)(step.kind, secret, config) {
            Ok(wallet) => wallet,
            Err(e) => {
                log_debug!(LOG_MODULE, "Step rejected secret", step = step.kind, reason = e.message);
                continue;
            }
        };

        if let Err(e) = cancel.run(candidate.fetch_transactions(source)).await? {
            log_warn!(LOG_MODULE, "History fetch failed", step = step.kind, error = e);
            continue;
        }

        let count = candidate.transactions().len();
        if count > 0 {
            log_info!(
                LOG_MODULE,
                "Wallet type identified",
                kind = step.kind,
                transactions = count
            );
            return Ok(candidate);
        }

        log_debug!(LOG_MODULE, "No history", step = step.kind);
    }

    Err(WalletError::unrecognized_secret())
}
