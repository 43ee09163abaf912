//! Import Module
//!
//! Turns an untyped secret into a stored wallet:
//! - Normalize the secret and reject duplicates
//! - Route vault mnemonics to a [`VaultImport`] session
//! - Otherwise run the classifier [`cascade`]
//! - Fetch UTXOs, label, and insert into the [`WalletRepository`]

pub mod cancel;
pub mod cascade;
pub mod vault;

pub use cancel::{CancelHandle, CancelSignal};
pub use cascade::{parseable_kinds, run_cascade, CascadeStep, CASCADE};
pub use vault::VaultImport;

use std::sync::Arc;

use crate::crypto::is_vault_mnemonic;
use crate::error::{WalletError, WalletResult};
use crate::history::TransactionSource;
use crate::repository::WalletRepository;
use crate::utils::WalletConfig;
use crate::wallet::{is_valid_bip39, VaultKind, Wallet, WalletKind, WalletSummary};
use crate::{log_info, log_warn};

const LOG_MODULE: &str = "import";

/// What the caller typed or scanned.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    pub secret: String,
    pub label: Option<String>,
    /// Vault family picked by the caller, if any.
    pub vault: Option<VaultKind>,
}

impl ImportRequest {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_vault(mut self, kind: VaultKind) -> Self {
        self.vault = Some(kind);
        self
    }
}

#[derive(Debug)]
pub enum ImportOutcome {
    /// Stored in the repository.
    Imported(WalletSummary),
    /// Vault mnemonic accepted; public keys still need attaching.
    VaultPending(VaultImport),
}

/// Trim and collapse runs of spaces to one.
pub fn normalize_secret(secret: &str) -> String {
    secret.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct Importer {
    config: WalletConfig,
    source: Arc<dyn TransactionSource>,
}

impl Importer {
    pub fn new(config: WalletConfig, source: Arc<dyn TransactionSource>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn source(&self) -> &dyn TransactionSource {
        self.source.as_ref()
    }

    pub async fn import(
        &self,
        repo: &mut WalletRepository,
        request: ImportRequest,
        cancel: &CancelSignal,
    ) -> WalletResult<ImportOutcome> {
        let secret = normalize_secret(&request.secret);
        if secret.is_empty() {
            return Err(WalletError::unrecognized_secret());
        }

        if let Some(label) = &request.label {
            if repo.label_in_use(label) {
                return Err(WalletError::wallet_in_use(format!(
                    "A wallet named \"{}\" already exists",
                    label
                )));
            }
        }
        if repo.contains_secret(&secret) {
            return Err(WalletError::wallet_in_use("This wallet has already been imported"));
        }

        let vault_seed = is_vault_mnemonic(&secret);
        if vault_seed && !is_valid_bip39(&secret) {
            return Err(WalletError::unsupported_vault_mnemonic());
        }
        if let Some(kind) = request.vault {
            if !vault_seed {
                return Err(WalletError::invalid_mnemonic(
                    "Mnemonic is not a vault mnemonic",
                ));
            }
            log_info!(LOG_MODULE, "Starting vault import", kind = WalletKind::from(kind));
            let session = VaultImport::start(kind, &secret, request.label, &self.config)?;
            return Ok(ImportOutcome::VaultPending(session));
        }

        let wallet = run_cascade(&secret, &self.config, self.source(), cancel).await?;
        let summary = self.persist(repo, wallet, request.label, cancel).await?;
        Ok(ImportOutcome::Imported(summary))
    }

    /// Fetch UTXOs, label and store an accepted wallet. A failed UTXO fetch
    /// is logged and the wallet is stored with an empty UTXO cache.
    pub(crate) async fn persist(
        &self,
        repo: &mut WalletRepository,
        mut wallet: Wallet,
        label: Option<String>,
        cancel: &CancelSignal,
    ) -> WalletResult<WalletSummary> {
        if let Err(e) = cancel.run(wallet.fetch_utxos(self.source())).await? {
            log_warn!(LOG_MODULE, "UTXO fetch failed", kind = wallet.kind(), error = e);
        }

        let label = match label {
            Some(label) => label,
            None => default_label(repo, &wallet),
        };
        wallet.set_label(label);

        if cancel.is_cancelled() {
            return Err(WalletError::cancelled());
        }
        let stored = repo.insert(wallet)?;
        log_info!(
            LOG_MODULE,
            "Wallet imported",
            kind = stored.kind(),
            address = stored.address().unwrap_or_default()
        );
        Ok(stored.summary())
    }
}

/// `Imported <type>`, numbered when that label is taken.
fn default_label(repo: &WalletRepository, wallet: &Wallet) -> String {
    let base = format!("Imported {}", wallet.type_readable());
    if !repo.label_in_use(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{} {}", base, n))
        .find(|candidate| !repo.label_in_use(candidate))
        .unwrap_or(base)
}
