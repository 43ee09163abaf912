//! Esplora REST client
//!
//! Talks to mempool.space / blockstream.info compatible endpoints:
//! - `GET {base}/address/{address}/txs`
//! - `GET {base}/address/{address}/utxo`

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::TransactionSource;
use crate::error::{WalletError, WalletResult};
use crate::types::{Transaction, TransactionDirection, TransactionStatus, Utxo};
use crate::utils::WalletConfig;
use crate::{log_debug, log_warn};

const LOG_MODULE: &str = "history";

pub struct EsploraSource {
    client: Client,
    base_url: String,
}

impl EsploraSource {
    pub fn new(config: &WalletConfig) -> WalletResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent("GoldWallet/1.0")
            .build()
            .map_err(|e| WalletError::network_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.esplora_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> WalletResult<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WalletError::network_error(format!(
                "GET {} returned {}",
                url, status
            ))
            .with_details(body));
        }

        response
            .json()
            .await
            .map_err(|e| WalletError::parse_error(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl TransactionSource for EsploraSource {
    async fn fetch_transactions(&self, addresses: &[String]) -> WalletResult<Vec<Transaction>> {
        let mut pages = Vec::with_capacity(addresses.len());

        for address in addresses {
            let url = format!("{}/address/{}/txs", self.base_url, address);
            let txs: Vec<EsploraTx> = self.get_json(&url).await?;
            log_debug!(LOG_MODULE, "Fetched address history", address = address, count = txs.len());
            pages.push(txs);
        }

        Ok(merge_history(pages, addresses))
    }

    async fn fetch_utxos(&self, addresses: &[String]) -> WalletResult<Vec<Utxo>> {
        let mut utxos = Vec::new();

        for address in addresses {
            let url = format!("{}/address/{}/utxo", self.base_url, address);
            match self.get_json::<Vec<EsploraUtxo>>(&url).await {
                Ok(found) => utxos.extend(found.into_iter().map(|u| Utxo {
                    txid: u.txid,
                    vout: u.vout,
                    value: u.value,
                    address: address.clone(),
                    confirmed: u.status.confirmed,
                    block_height: u.status.block_height,
                })),
                Err(e) => {
                    log_warn!(LOG_MODULE, "UTXO lookup failed", address = address, error = e);
                    return Err(e);
                }
            }
        }

        Ok(utxos)
    }
}

/// Merge per-address pages into one history. A transaction touching
/// several of the addresses appears once. Unconfirmed entries sort first,
/// then by height descending.
fn merge_history(pages: Vec<Vec<EsploraTx>>, addresses: &[String]) -> Vec<Transaction> {
    let mut seen: HashMap<String, EsploraTx> = HashMap::new();
    for tx in pages.into_iter().flatten() {
        seen.entry(tx.txid.clone()).or_insert(tx);
    }

    let owned: HashSet<&str> = addresses.iter().map(String::as_str).collect();
    let mut entries: Vec<Transaction> = seen
        .values()
        .filter_map(|tx| summarize_tx(tx, &owned))
        .collect();

    entries.sort_by(|a, b| {
        let a_key = a.block_height.unwrap_or(u64::MAX);
        let b_key = b.block_height.unwrap_or(u64::MAX);
        b_key.cmp(&a_key).then_with(|| a.txid.cmp(&b.txid))
    });
    entries
}

/// Net a raw transaction against the wallet's own addresses. `None` when
/// the transaction moves no value to or from them.
fn summarize_tx(tx: &EsploraTx, owned: &HashSet<&str>) -> Option<Transaction> {
    let is_owned = |addr: &Option<String>| {
        addr.as_deref()
            .map(|a| owned.contains(a))
            .unwrap_or(false)
    };

    let sent: u64 = tx
        .vin
        .iter()
        .filter_map(|vin| vin.prevout.as_ref())
        .filter(|prevout| is_owned(&prevout.scriptpubkey_address))
        .map(|prevout| prevout.value)
        .sum();

    let received: u64 = tx
        .vout
        .iter()
        .filter(|vout| is_owned(&vout.scriptpubkey_address))
        .map(|vout| vout.value)
        .sum();

    let (direction, amount) = if sent == 0 && received == 0 {
        return None;
    } else if sent > received {
        (TransactionDirection::Outgoing, sent - received)
    } else if received > sent {
        (TransactionDirection::Incoming, received - sent)
    } else {
        (TransactionDirection::Self_, sent)
    };

    let status = if tx.status.confirmed {
        TransactionStatus::Confirmed
    } else {
        TransactionStatus::Pending
    };

    Some(Transaction {
        txid: tx.txid.clone(),
        direction,
        amount,
        fee: tx.fee,
        timestamp: tx.status.block_time,
        block_height: tx.status.block_height,
        status,
    })
}

// =============================================================================
// Esplora Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct EsploraTx {
    txid: String,
    status: EsploraStatus,
    #[serde(default)]
    vin: Vec<EsploraVin>,
    #[serde(default)]
    vout: Vec<EsploraVout>,
    fee: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EsploraStatus {
    confirmed: bool,
    block_height: Option<u64>,
    block_time: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EsploraVin {
    prevout: Option<EsploraOutput>,
}

#[derive(Debug, Deserialize)]
struct EsploraOutput {
    scriptpubkey_address: Option<String>,
    value: u64,
}

type EsploraVout = EsploraOutput;

#[derive(Debug, Deserialize)]
struct EsploraUtxo {
    txid: String,
    vout: u32,
    status: EsploraStatus,
    value: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const OURS: &str = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq";
    const THEIRS: &str = "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2";
    const OTHER_OURS: &str = "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu";

    fn tx_json(vin_addr: &str, vin_value: u64, outs: &[(&str, u64)]) -> EsploraTx {
        let vout: Vec<String> = outs
            .iter()
            .map(|(a, v)| format!(r#"{{"scriptpubkey_address":"{}","value":{}}}"#, a, v))
            .collect();
        let json = format!(
            r#"{{"txid":"ab12","status":{{"confirmed":true,"block_height":800000,"block_time":1690000000}},
                "vin":[{{"prevout":{{"scriptpubkey_address":"{}","value":{}}}}}],
                "vout":[{}],"fee":500}}"#,
            vin_addr,
            vin_value,
            vout.join(",")
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_incoming() {
        let tx = tx_json(THEIRS, 10_500, &[(OURS, 10_000)]);
        let owned: HashSet<&str> = [OURS].into_iter().collect();
        let entry = summarize_tx(&tx, &owned).unwrap();
        assert_eq!(entry.direction, TransactionDirection::Incoming);
        assert_eq!(entry.amount, 10_000);
        assert_eq!(entry.fee, Some(500));
        assert_eq!(entry.status, TransactionStatus::Confirmed);
    }

    #[test]
    fn test_outgoing_with_change() {
        let tx = tx_json(OURS, 50_000, &[(THEIRS, 20_000), (OURS, 29_500)]);
        let owned: HashSet<&str> = [OURS].into_iter().collect();
        let entry = summarize_tx(&tx, &owned).unwrap();
        assert_eq!(entry.direction, TransactionDirection::Outgoing);
        assert_eq!(entry.amount, 20_500);
    }

    #[test]
    fn test_unrelated_transaction_is_skipped() {
        let tx = tx_json(THEIRS, 10_000, &[(THEIRS, 9_000)]);
        let owned: HashSet<&str> = [OURS].into_iter().collect();
        assert!(summarize_tx(&tx, &owned).is_none());
    }

    fn history_tx(txid: &str, height: Option<u64>, to: &str, value: u64) -> EsploraTx {
        let status = match height {
            Some(h) => format!(r#"{{"confirmed":true,"block_height":{},"block_time":1690000000}}"#, h),
            None => r#"{"confirmed":false}"#.to_string(),
        };
        let json = format!(
            r#"{{"txid":"{}","status":{},
                "vin":[{{"prevout":{{"scriptpubkey_address":"{}","value":{}}}}}],
                "vout":[{{"scriptpubkey_address":"{}","value":{}}}]}}"#,
            txid,
            status,
            THEIRS,
            value + 200,
            to,
            value
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_merge_dedupes_across_addresses() {
        // Same transaction pays both of our addresses and is listed under each.
        let shared = r#"{"txid":"cc03","status":{"confirmed":true,"block_height":800100},
            "vin":[{"prevout":{"scriptpubkey_address":"1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2","value":3000}}],
            "vout":[{"scriptpubkey_address":"bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq","value":1000},
                    {"scriptpubkey_address":"bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu","value":1500}]}"#;
        let first: EsploraTx = serde_json::from_str(shared).unwrap();
        let second: EsploraTx = serde_json::from_str(shared).unwrap();
        let addresses = vec![OURS.to_string(), OTHER_OURS.to_string()];

        let history = merge_history(vec![vec![first], vec![second]], &addresses);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].txid, "cc03");
        assert_eq!(history[0].direction, TransactionDirection::Incoming);
        assert_eq!(history[0].amount, 2_500);
    }

    #[test]
    fn test_merge_orders_pending_then_height_descending() {
        let addresses = vec![OURS.to_string(), OTHER_OURS.to_string()];
        let pages = vec![
            vec![
                history_tx("aa01", Some(700_000), OURS, 1_000),
                history_tx("aa02", Some(800_000), OURS, 2_000),
            ],
            vec![
                history_tx("bb01", None, OTHER_OURS, 3_000),
                history_tx("bb02", Some(750_000), OTHER_OURS, 4_000),
                history_tx("bb03", Some(760_000), THEIRS, 5_000),
            ],
        ];

        let history = merge_history(pages, &addresses);
        let order: Vec<&str> = history.iter().map(|t| t.txid.as_str()).collect();
        assert_eq!(order, vec!["bb01", "aa02", "bb02", "aa01"]);
        assert_eq!(history[0].status, TransactionStatus::Pending);
    }

    #[test]
    fn test_merge_of_empty_pages() {
        assert!(merge_history(vec![Vec::new(), Vec::new()], &[OURS.to_string()]).is_empty());
    }

    #[test]
    fn test_source_uses_configured_endpoint() {
        let config = WalletConfig::from_json(r#"{"esplora_url":"http://localhost:3002/api/"}"#).unwrap();
        let source = EsploraSource::new(&config).unwrap();
        assert_eq!(source.base_url(), "http://localhost:3002/api");
    }
}
