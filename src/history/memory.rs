//! In-memory transaction source
//!
//! Serves history from fixed maps. Used for offline imports and tests;
//! addresses can be marked unreachable to simulate a network failure.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::TransactionSource;
use crate::error::{WalletError, WalletResult};
use crate::types::{Transaction, Utxo};

#[derive(Default)]
pub struct MemorySource {
    transactions: HashMap<String, Vec<Transaction>>,
    utxos: HashMap<String, Vec<Utxo>>,
    unreachable: HashSet<String>,
    utxos_unavailable: bool,
    delay: Option<Duration>,
    requests: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transaction(mut self, address: impl Into<String>, tx: Transaction) -> Self {
        self.transactions.entry(address.into()).or_default().push(tx);
        self
    }

    pub fn with_utxo(mut self, utxo: Utxo) -> Self {
        self.utxos.entry(utxo.address.clone()).or_default().push(utxo);
        self
    }

    /// Lookups touching `address` fail with a network error.
    pub fn with_unreachable(mut self, address: impl Into<String>) -> Self {
        self.unreachable.insert(address.into());
        self
    }

    /// Every UTXO lookup fails with a network error.
    pub fn with_utxos_unavailable(mut self) -> Self {
        self.utxos_unavailable = true;
        self
    }

    /// Sleep before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every address looked up so far, in request order.
    pub fn requested_addresses(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    async fn record(&self, addresses: &[String]) -> WalletResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut requests = self
            .requests
            .lock()
            .map_err(|_| WalletError::internal("Request log lock poisoned"))?;
        requests.extend(addresses.iter().cloned());
        drop(requests);

        if let Some(bad) = addresses.iter().find(|a| self.unreachable.contains(*a)) {
            return Err(WalletError::network_error(format!("{} is unreachable", bad)));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionSource for MemorySource {
    async fn fetch_transactions(&self, addresses: &[String]) -> WalletResult<Vec<Transaction>> {
        self.record(addresses).await?;

        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for address in addresses {
            for tx in self.transactions.get(address).into_iter().flatten() {
                if seen.insert(tx.txid.clone()) {
                    found.push(tx.clone());
                }
            }
        }
        Ok(found)
    }

    async fn fetch_utxos(&self, addresses: &[String]) -> WalletResult<Vec<Utxo>> {
        self.record(addresses).await?;
        if self.utxos_unavailable {
            return Err(WalletError::network_error("UTXO lookups are unavailable"));
        }

        Ok(addresses
            .iter()
            .flat_map(|a| self.utxos.get(a).cloned().unwrap_or_default())
            .collect())
    }
}
