//! Vault wallets (2-key AR and 3-key AIR)
//!
//! The wallet's own key comes from a BIP-39 mnemonic on the BIP49 account
//! path; the other keys are attached as hex public keys. Each derived key
//! is combined with the attached keys into a redeem script, and the address
//! is the P2SH-wrapped P2WSH of that script.
//!
//! Redeem scripts:
//!
//! ```text
//! AR:  IF <wallet> CHECKSIG
//!      ELSE 2 <wallet> <cancel> 2 CHECKMULTISIG ENDIF
//!
//! AIR: IF <wallet> CHECKSIG
//!      ELSE IF 2 <wallet> <instant> 2 CHECKMULTISIG
//!           ELSE 3 <wallet> <instant> <recovery> 3 CHECKMULTISIG ENDIF
//!      ENDIF
//! ```

use bitcoin::bip32::Xpub;
use bitcoin::blockdata::opcodes::all::{OP_CHECKMULTISIG, OP_CHECKSIG, OP_ELSE, OP_ENDIF, OP_IF};
use bitcoin::blockdata::script::Builder;
use bitcoin::key::CompressedPublicKey;
use bitcoin::secp256k1::{PublicKey, Secp256k1};
use bitcoin::{Address, ScriptBuf};
use serde::{Deserialize, Serialize};

use super::hd::{account_xpriv, child_key, HdPurpose};
use crate::error::{WalletError, WalletResult};
use crate::types::Chain;

/// Which vault family a mnemonic is imported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultKind {
    /// 2-key vault: wallet key plus a cancel key.
    Ar,
    /// 3-key vault: wallet key plus instant and recovery keys.
    Air,
}

impl VaultKind {
    /// Attached keys in the order they must be supplied.
    pub fn roles(&self) -> &'static [KeyRole] {
        match self {
            VaultKind::Ar => &[KeyRole::Cancel],
            VaultKind::Air => &[KeyRole::Instant, KeyRole::Recovery],
        }
    }

    pub fn required_public_keys(&self) -> usize {
        self.roles().len()
    }
}

impl std::str::FromStr for VaultKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ar" => Ok(VaultKind::Ar),
            "air" => Ok(VaultKind::Air),
            other => Err(format!("Unknown vault type '{}', expected ar or air", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    Instant,
    Recovery,
    Cancel,
}

impl std::fmt::Display for KeyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            KeyRole::Instant => "instant",
            KeyRole::Recovery => "recovery",
            KeyRole::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// Redeem script for one wallet key and the attached keys, in role order.
pub fn redeem_script(
    kind: VaultKind,
    wallet_key: &CompressedPublicKey,
    attached: &[CompressedPublicKey],
) -> WalletResult<ScriptBuf> {
    if attached.len() != kind.required_public_keys() {
        return Err(WalletError::invalid_key(format!(
            "Vault needs {} attached public keys, got {}",
            kind.required_public_keys(),
            attached.len()
        )));
    }

    let key = |k: &CompressedPublicKey| bitcoin::PublicKey::new(k.0);
    let wallet = key(wallet_key);

    let builder = Builder::new()
        .push_opcode(OP_IF)
        .push_key(&wallet)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_ELSE);

    let builder = match kind {
        VaultKind::Ar => builder
            .push_int(2)
            .push_key(&wallet)
            .push_key(&key(&attached[0]))
            .push_int(2)
            .push_opcode(OP_CHECKMULTISIG),
        VaultKind::Air => {
            let instant = key(&attached[0]);
            let recovery = key(&attached[1]);
            builder
                .push_opcode(OP_IF)
                .push_int(2)
                .push_key(&wallet)
                .push_key(&instant)
                .push_int(2)
                .push_opcode(OP_CHECKMULTISIG)
                .push_opcode(OP_ELSE)
                .push_int(3)
                .push_key(&wallet)
                .push_key(&instant)
                .push_key(&recovery)
                .push_int(3)
                .push_opcode(OP_CHECKMULTISIG)
                .push_opcode(OP_ENDIF)
        }
    };

    Ok(builder.push_opcode(OP_ENDIF).into_script())
}

#[derive(Debug, Clone)]
pub struct VaultWallet {
    kind: VaultKind,
    chain: Chain,
    gap_limit: u32,
    account_xpub: Option<Xpub>,
    public_keys: Vec<CompressedPublicKey>,
    external: Vec<String>,
    internal: Vec<String>,
}

impl VaultWallet {
    pub fn new(kind: VaultKind, chain: Chain, gap_limit: u32) -> Self {
        Self {
            kind,
            chain,
            gap_limit,
            account_xpub: None,
            public_keys: Vec::new(),
            external: Vec::new(),
            internal: Vec::new(),
        }
    }

    pub fn kind(&self) -> VaultKind {
        self.kind
    }

    /// Derive the account key from a BIP-39 mnemonic. Attached keys are kept.
    pub fn set_secret(&mut self, phrase: &str) -> WalletResult<()> {
        self.account_xpub = None;
        self.clear_addresses();

        let path = HdPurpose::Bip49.account_path(self.chain)?;
        let account = account_xpriv(phrase, &path, self.chain)?;
        self.account_xpub = Some(Xpub::from_priv(&Secp256k1::new(), &account));
        Ok(())
    }

    /// Role the next attached key will fill, `None` once complete.
    pub fn next_role(&self) -> Option<KeyRole> {
        self.kind.roles().get(self.public_keys.len()).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.next_role().is_none()
    }

    pub fn public_keys(&self) -> Vec<String> {
        self.public_keys.iter().map(|k| hex::encode(k.to_bytes())).collect()
    }

    /// Attach a hex-encoded secp256k1 public key (compressed or not) to the
    /// next free role.
    pub fn add_public_key(&mut self, key_hex: &str) -> WalletResult<KeyRole> {
        let role = self
            .next_role()
            .ok_or_else(|| WalletError::invalid_key("All vault public keys are already attached"))?;

        let bytes = hex::decode(key_hex.trim())
            .map_err(|e| WalletError::invalid_key(format!("Public key is not hex: {}", e)))?;
        let key = PublicKey::from_slice(&bytes)
            .map_err(|e| WalletError::invalid_key(format!("Invalid public key: {}", e)))?;
        let key = CompressedPublicKey(key);

        if self.public_keys.contains(&key) {
            return Err(WalletError::duplicate_key("Public key is already attached to this vault"));
        }

        self.public_keys.push(key);
        self.clear_addresses();
        Ok(role)
    }

    pub fn clear_public_keys(&mut self) {
        self.public_keys.clear();
        self.clear_addresses();
    }

    /// Derive receive and change addresses. Requires the mnemonic and every
    /// attached key.
    pub fn generate_addresses(&mut self) -> WalletResult<()> {
        let xpub = self
            .account_xpub
            .as_ref()
            .ok_or_else(|| WalletError::invalid_mnemonic("Vault mnemonic has not been set"))?;
        if !self.is_complete() {
            return Err(WalletError::invalid_key(format!(
                "Vault needs {} attached public keys, got {}",
                self.kind.required_public_keys(),
                self.public_keys.len()
            )));
        }

        let secp = Secp256k1::verification_only();
        let network = self.chain.network();
        let mut external = Vec::with_capacity(self.gap_limit as usize);
        let mut internal = Vec::with_capacity(self.gap_limit as usize);

        for index in 0..self.gap_limit {
            for (change, out) in [(0, &mut external), (1, &mut internal)] {
                let wallet_key = child_key(&secp, xpub, change, index)?;
                let script = redeem_script(self.kind, &wallet_key, &self.public_keys)?;
                out.push(Address::p2shwsh(&script, network).to_string());
            }
        }

        self.external = external;
        self.internal = internal;
        Ok(())
    }

    pub fn address(&self) -> Option<&str> {
        self.external.first().map(String::as_str)
    }

    pub fn addresses(&self) -> Vec<String> {
        self.external.iter().chain(self.internal.iter()).cloned().collect()
    }

    pub fn xpub(&self) -> Option<String> {
        self.account_xpub.as_ref().map(Xpub::to_string)
    }

    fn clear_addresses(&mut self) {
        self.external.clear();
        self.internal.clear();
    }
}
