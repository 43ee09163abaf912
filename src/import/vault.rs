//! Vault import session
//!
//! Vault mnemonics are not usable on their own: the session holds the
//! half-built wallet while the caller attaches the other public keys, then
//! checks for history before handing it to the repository.

use crate::error::{WalletError, WalletResult};
use crate::repository::WalletRepository;
use crate::utils::WalletConfig;
use crate::wallet::{KeyRole, VaultKind, VaultWallet, Wallet, WalletSummary};
use crate::{log_info, log_warn};

use super::cancel::CancelSignal;
use super::Importer;

const LOG_MODULE: &str = "import";

#[derive(Debug)]
pub struct VaultImport {
    kind: VaultKind,
    wallet: Wallet,
    label: Option<String>,
}

impl VaultImport {
    pub(crate) fn start(
        kind: VaultKind,
        secret: &str,
        label: Option<String>,
        config: &WalletConfig,
    ) -> WalletResult<Self> {
        let wallet = Wallet::from_secret(kind.into(), secret, config)?;
        Ok(Self { kind, wallet, label })
    }

    pub fn kind(&self) -> VaultKind {
        self.kind
    }

    /// Role the next key fills, `None` once every key is attached.
    pub fn next_role(&self) -> Option<KeyRole> {
        self.vault().and_then(VaultWallet::next_role)
    }

    pub fn is_complete(&self) -> bool {
        self.next_role().is_none()
    }

    pub fn add_public_key(&mut self, key_hex: &str) -> WalletResult<KeyRole> {
        let role = self.vault_mut()?.add_public_key(key_hex)?;
        log_info!(LOG_MODULE, "Vault key attached", role = role);
        Ok(role)
    }

    /// Drop every attached key and start over from the first role.
    pub fn clear_public_keys(&mut self) -> WalletResult<()> {
        self.vault_mut()?.clear_public_keys();
        Ok(())
    }

    /// Derive addresses, require history, and store the wallet.
    pub async fn finish(
        mut self,
        importer: &Importer,
        repo: &mut WalletRepository,
        cancel: &CancelSignal,
    ) -> WalletResult<WalletSummary> {
        self.vault_mut()?.generate_addresses()?;

        cancel
            .run(self.wallet.fetch_transactions(importer.source()))
            .await??;

        if self.wallet.transactions().is_empty() {
            log_warn!(LOG_MODULE, "Vault has no history", kind = self.wallet.kind());
            return Err(WalletError::no_transactions());
        }

        importer.persist(repo, self.wallet, self.label, cancel).await
    }

    fn vault(&self) -> Option<&VaultWallet> {
        self.wallet.vault()
    }

    fn vault_mut(&mut self) -> WalletResult<&mut VaultWallet> {
        self.wallet
            .vault_mut()
            .ok_or_else(|| WalletError::internal("Vault session holds a non-vault wallet"))
    }
}
