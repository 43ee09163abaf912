//! Gold Wallet Core Library
//!
//! Key-material derivation and wallet-type identification for a personal
//! Bitcoin wallet.
//!
//! # Architecture
//!
//! This crate provides:
//! - **crypto**: 12-word mnemonic codec, vault seed detection, PBKDF2 key pairs
//! - **wallet**: The closed family of wallet formats and their derivation
//! - **history**: Transaction and UTXO lookups behind a trait, Esplora client
//! - **import**: Classifier cascade, vault import sessions, cancellation
//! - **repository**: In-memory store of imported wallets
//! - **utils**: Configuration and structured logging
//!
//! # Security
//!
//! Secrets are held in `zeroize::Zeroizing` buffers and never logged;
//! structured log fields named like secrets are redacted automatically.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gold_wallet_core::{CancelSignal, EsploraSource, ImportRequest, Importer, WalletConfig, WalletRepository};
//!
//! let config = WalletConfig::from_env()?;
//! let source = Arc::new(EsploraSource::new(&config)?);
//! let importer = Importer::new(config, source);
//! let mut repo = WalletRepository::new();
//! let outcome = importer
//!     .import(&mut repo, ImportRequest::new(secret), &CancelSignal::never())
//!     .await?;
//! ```

pub mod crypto;
pub mod error;
pub mod history;
pub mod import;
pub mod repository;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export key types for convenience
pub use error::{ErrorCode, WalletError, WalletResult};
pub use history::{EsploraSource, MemorySource, TransactionSource};
pub use import::{CancelHandle, CancelSignal, ImportOutcome, ImportRequest, Importer, VaultImport};
pub use repository::WalletRepository;
pub use types::{Chain, Transaction, TransactionDirection, TransactionStatus, Utxo};
pub use utils::WalletConfig;
pub use wallet::{KeyRole, VaultKind, Wallet, WalletKind, WalletSummary};
