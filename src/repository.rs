//! In-memory wallet repository
//!
//! Holds every imported wallet. Passed explicitly to the importer, which
//! uses it for the duplicate checks before anything is inserted.

use crate::error::{WalletError, WalletResult};
use crate::wallet::Wallet;

#[derive(Debug, Default)]
pub struct WalletRepository {
    wallets: Vec<Wallet>,
}

impl WalletRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a stored wallet was derived from exactly `secret`.
    pub fn contains_secret(&self, secret: &str) -> bool {
        self.wallets.iter().any(|w| w.secret() == secret)
    }

    pub fn label_in_use(&self, label: &str) -> bool {
        self.wallets.iter().any(|w| w.label() == label)
    }

    /// Store `wallet`, rejecting a second copy of the same secret or label.
    pub fn insert(&mut self, wallet: Wallet) -> WalletResult<&Wallet> {
        if self.contains_secret(wallet.secret()) {
            return Err(WalletError::wallet_in_use("This wallet has already been imported"));
        }
        if self.label_in_use(wallet.label()) {
            return Err(WalletError::wallet_in_use(format!(
                "A wallet named \"{}\" already exists",
                wallet.label()
            )));
        }

        self.wallets.push(wallet);
        let index = self.wallets.len() - 1;
        Ok(&self.wallets[index])
    }

    pub fn get(&self, label: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.label() == label)
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}
