//! Unified error types for the wallet core
//!
//! Derivation, wallet and import errors all surface as [`WalletError`]
//! so callers get one serializable shape with a stable [`ErrorCode`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::CryptoError;

/// Main error type for all wallet operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl WalletError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn format(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Format, msg)
    }

    pub fn invalid_mnemonic(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMnemonic, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    pub fn invalid_private_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPrivateKey, msg)
    }

    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidKey, msg)
    }

    pub fn duplicate_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DuplicateKey, msg)
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn unrecognized_secret() -> Self {
        Self::new(
            ErrorCode::UnrecognizedSecret,
            "Could not identify this secret as a WIF, mnemonic or address",
        )
    }

    pub fn unsupported_vault_mnemonic() -> Self {
        Self::new(
            ErrorCode::UnsupportedVaultMnemonic,
            "Electrum-style vault mnemonics are not supported",
        )
    }

    pub fn wallet_in_use(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::WalletInUse, msg)
    }

    pub fn no_transactions() -> Self {
        Self::new(
            ErrorCode::NoTransactions,
            "Wallet has no transactions on any derived address",
        )
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorCode::Cancelled, "Import cancelled")
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// True for errors raised by the transaction source rather than by
    /// the secret itself.
    pub fn is_network(&self) -> bool {
        matches!(self.code, ErrorCode::NetworkError | ErrorCode::Timeout)
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for WalletError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Codec and derivation errors
    Length,
    UnknownWord,
    Format,
    WordCount,
    Kdf,

    // Input errors
    InvalidMnemonic,
    InvalidAddress,
    InvalidPrivateKey,

    // Vault key attachment
    DuplicateKey,
    InvalidKey,

    // Import errors
    UnrecognizedSecret,
    UnsupportedVaultMnemonic,
    WalletInUse,
    NoTransactions,
    Cancelled,

    // Network errors
    NetworkError,
    Timeout,

    // Parse errors
    ParseError,
    JsonError,
    HexError,

    // Internal
    Config,
    Internal,
}

/// Result type alias for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;

// Conversions from common error types

impl From<CryptoError> for WalletError {
    fn from(e: CryptoError) -> Self {
        let code = match &e {
            CryptoError::Length { .. } => ErrorCode::Length,
            CryptoError::UnknownWord { .. } => ErrorCode::UnknownWord,
            CryptoError::Format(_) => ErrorCode::Format,
            CryptoError::WordCount { .. } => ErrorCode::WordCount,
            CryptoError::Kdf(_) => ErrorCode::Kdf,
        };
        WalletError::new(code, e.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for WalletError {
    fn from(e: hex::FromHexError) -> Self {
        WalletError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            WalletError::new(ErrorCode::Timeout, "Request timed out")
        } else if e.is_connect() {
            WalletError::new(ErrorCode::NetworkError, "Connection failed")
        } else {
            WalletError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}

impl From<bitcoin::bip32::Error> for WalletError {
    fn from(e: bitcoin::bip32::Error) -> Self {
        WalletError::new(ErrorCode::Kdf, format!("BIP32 error: {}", e))
    }
}

impl From<bitcoin::secp256k1::Error> for WalletError {
    fn from(e: bitcoin::secp256k1::Error) -> Self {
        WalletError::new(ErrorCode::Kdf, format!("Secp256k1 error: {}", e))
    }
}

impl From<bip39::Error> for WalletError {
    fn from(e: bip39::Error) -> Self {
        WalletError::new(ErrorCode::InvalidMnemonic, format!("BIP39 error: {}", e))
    }
}
