//! History Module
//!
//! Transaction and UTXO lookups for wallet addresses. Wallets only see the
//! [`TransactionSource`] trait; [`EsploraSource`] talks to an Esplora REST
//! API and [`MemorySource`] serves a fixed in-memory set.

mod esplora;
mod memory;

pub use esplora::EsploraSource;
pub use memory::MemorySource;

use async_trait::async_trait;

use crate::error::WalletResult;
use crate::types::{Transaction, Utxo};

/// Where wallets get their history from.
///
/// Errors should carry `ErrorCode::NetworkError` or `ErrorCode::Timeout`
/// so callers can tell an unreachable source from a bad secret.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Transactions touching any of `addresses`, deduplicated by txid,
    /// newest first.
    async fn fetch_transactions(&self, addresses: &[String]) -> WalletResult<Vec<Transaction>>;

    /// Unspent outputs paying to any of `addresses`.
    async fn fetch_utxos(&self, addresses: &[String]) -> WalletResult<Vec<Utxo>>;
}
