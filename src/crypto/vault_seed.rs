//! Vault seed detection
//!
//! Vault wallets are restored from Electrum-style seeds. Such a phrase
//! carries no checksum of its own; it is recognised by the hex form of
//! `HMAC-SHA512(key = "Seed version", message = phrase)` starting with a
//! known version prefix.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// HMAC key for the seed-version fingerprint.
pub const VAULT_SEED_KEY: &[u8] = b"Seed version";

/// Seed families of the prefix table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultSeedKind {
    Standard,
    Segwit,
    TwoFactor,
    TwoFactorSegwit,
}

/// Fixed prefix table, longest prefixes first so `01` never shadows them.
pub const VAULT_SEED_PREFIXES: [(VaultSeedKind, &str); 4] = [
    (VaultSeedKind::Segwit, "100"),
    (VaultSeedKind::TwoFactor, "101"),
    (VaultSeedKind::TwoFactorSegwit, "102"),
    (VaultSeedKind::Standard, "01"),
];

impl VaultSeedKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            VaultSeedKind::Standard => "01",
            VaultSeedKind::Segwit => "100",
            VaultSeedKind::TwoFactor => "101",
            VaultSeedKind::TwoFactorSegwit => "102",
        }
    }

    /// Tag of the prefix table entry.
    pub fn name(&self) -> &'static str {
        match self {
            VaultSeedKind::Standard => "standard",
            VaultSeedKind::Segwit => "segwit",
            VaultSeedKind::TwoFactor => "2fa",
            VaultSeedKind::TwoFactorSegwit => "2fa_segwit",
        }
    }
}

fn seed_fingerprint(phrase: &str) -> Option<String> {
    let mut mac = HmacSha512::new_from_slice(VAULT_SEED_KEY).ok()?;
    mac.update(phrase.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Which vault seed family `phrase` belongs to, if any.
pub fn vault_seed_kind(phrase: &str) -> Option<VaultSeedKind> {
    let fingerprint = seed_fingerprint(phrase)?;
    VAULT_SEED_PREFIXES
        .iter()
        .find(|(_, prefix)| fingerprint.starts_with(prefix))
        .map(|(kind, _)| *kind)
}

/// Whether `phrase` is a vault mnemonic.
pub fn is_vault_mnemonic(phrase: &str) -> bool {
    vault_seed_kind(phrase).is_some()
}
