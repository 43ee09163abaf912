use std::sync::Arc;
use std::time::Duration;

use gold_wallet_core::{
    CancelHandle, CancelSignal, ErrorCode, ImportOutcome, ImportRequest, Importer, KeyRole,
    MemorySource, Transaction, TransactionDirection, TransactionStatus, VaultImport, VaultKind,
    WalletConfig, WalletKind, WalletRepository, WalletSummary,
};

// Private key 1 as compressed WIF, and its two single-key addresses.
const WIF: &str = "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn";
const WIF_LEGACY: &str = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";
const WIF_SEGWIT: &str = "3JvL6Ymt8MVWiCNHC7oWU6nLeHNJKLZGLN";

const BIP39_PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const BIP84_CHANGE: &str = "bc1q8c6fshw2dlwun7ekn9qwf37cu2rn755upcp6el";
const BIP44_FIRST: &str = "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA";

// Vault-prefixed and BIP-39 valid, with its first derived addresses.
const VAULT_PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon mass";
const VAULT_AR_FIRST: &str = "31kmCWqexT2i43oXQWcHeLiL9osgrirk9X";
const VAULT_AIR_FIRST: &str = "37spV8DQ9CuoXKaXJKwL4HFRXhd6ofgPVv";
const VAULT_BIP49_FIRST: &str = "3Gu9ysyzaAetiPd5xxn52ZKXrpo5afHKVk";

// Vault-prefixed, not BIP-39.
const ELECTRUM_PHRASE: &str =
    "wild father tree among universe such mobile favorite target dynamic credit identify";

const KEY_1: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
const KEY_2: &str = "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";
const KEY_3: &str = "02f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9";

fn tx(txid: &str) -> Transaction {
    Transaction {
        txid: txid.to_string(),
        direction: TransactionDirection::Incoming,
        amount: 25_000,
        fee: Some(150),
        timestamp: Some(1_700_000_000),
        block_height: Some(820_000),
        status: TransactionStatus::Confirmed,
    }
}

fn setup(source: MemorySource) -> (Importer, Arc<MemorySource>) {
    let source = Arc::new(source);
    let config = WalletConfig {
        gap_limit: 1,
        ..WalletConfig::default()
    };
    (Importer::new(config, source.clone()), source)
}

async fn import(importer: &Importer, repo: &mut WalletRepository, request: ImportRequest) -> Result<ImportOutcome, gold_wallet_core::WalletError> {
    importer.import(repo, request, &CancelSignal::never()).await
}

fn expect_imported(outcome: ImportOutcome) -> WalletSummary {
    match outcome {
        ImportOutcome::Imported(summary) => summary,
        ImportOutcome::VaultPending(_) => panic!("expected an imported wallet"),
    }
}

fn expect_vault(outcome: ImportOutcome) -> VaultImport {
    match outcome {
        ImportOutcome::VaultPending(session) => session,
        ImportOutcome::Imported(summary) => panic!("expected a vault session, got {:?}", summary),
    }
}

#[tokio::test]
async fn wif_with_legacy_history_lands_on_legacy() {
    let (importer, source) = setup(MemorySource::new().with_transaction(WIF_LEGACY, tx("a1")));
    let mut repo = WalletRepository::new();

    let summary = expect_imported(import(&importer, &mut repo, ImportRequest::new(WIF)).await.unwrap());

    assert_eq!(summary.kind, WalletKind::Legacy);
    assert_eq!(summary.address.as_deref(), Some(WIF_LEGACY));
    assert_eq!(summary.transaction_count, 1);
    // SegWit is tried first, then legacy, then UTXOs for the accepted wallet.
    assert_eq!(
        source.requested_addresses(),
        vec![WIF_SEGWIT, WIF_LEGACY, WIF_LEGACY]
    );
}

#[tokio::test]
async fn wif_with_segwit_history_stops_at_first_step() {
    let (importer, source) = setup(MemorySource::new().with_transaction(WIF_SEGWIT, tx("b1")));
    let mut repo = WalletRepository::new();

    let summary = expect_imported(import(&importer, &mut repo, ImportRequest::new(WIF)).await.unwrap());

    assert_eq!(summary.kind, WalletKind::SegwitP2SH);
    assert!(!source.requested_addresses().contains(&WIF_LEGACY.to_string()));
}

#[tokio::test]
async fn random_string_is_unrecognized_and_nothing_is_stored() {
    let (importer, source) = setup(MemorySource::new());
    let mut repo = WalletRepository::new();

    let err = import(
        &importer,
        &mut repo,
        ImportRequest::new("q8Zr1mWx0pLk4TyVb7nC2sDf9gHj3KaE6uIo5RtY"),
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::UnrecognizedSecret);
    assert!(repo.is_empty());
    assert!(source.requested_addresses().is_empty());
}

#[tokio::test]
async fn mnemonic_is_matched_on_change_addresses() {
    let (importer, _) = setup(MemorySource::new().with_transaction(BIP84_CHANGE, tx("c1")));
    let mut repo = WalletRepository::new();

    let summary = expect_imported(
        import(&importer, &mut repo, ImportRequest::new(BIP39_PHRASE)).await.unwrap(),
    );
    assert_eq!(summary.kind, WalletKind::HdSegwitBech32);
    assert_eq!(summary.label, "Imported HD SegWit (BIP84 Bech32 Native)");
}

#[tokio::test]
async fn bip44_step_is_reached_last() {
    let (importer, _) = setup(MemorySource::new().with_transaction(BIP44_FIRST, tx("d1")));
    let mut repo = WalletRepository::new();

    let summary = expect_imported(
        import(&importer, &mut repo, ImportRequest::new(BIP39_PHRASE)).await.unwrap(),
    );
    assert_eq!(summary.kind, WalletKind::HdLegacyP2PKH);
}

#[tokio::test]
async fn watch_only_address_with_history() {
    let (importer, _) = setup(MemorySource::new().with_transaction(BIP44_FIRST, tx("e1")));
    let mut repo = WalletRepository::new();

    let summary = expect_imported(
        import(
            &importer,
            &mut repo,
            ImportRequest::new(BIP44_FIRST).with_label("Cold storage"),
        )
        .await
        .unwrap(),
    );
    assert_eq!(summary.kind, WalletKind::WatchOnly);
    assert_eq!(summary.label, "Cold storage");
    assert!(repo.get("Cold storage").is_some());
}

#[tokio::test]
async fn network_failure_only_fails_its_step() {
    let source = MemorySource::new()
        .with_unreachable(WIF_SEGWIT)
        .with_transaction(WIF_LEGACY, tx("f1"));
    let (importer, _) = setup(source);
    let mut repo = WalletRepository::new();

    let summary = expect_imported(import(&importer, &mut repo, ImportRequest::new(WIF)).await.unwrap());
    assert_eq!(summary.kind, WalletKind::Legacy);
}

#[tokio::test]
async fn unreachable_source_ends_unrecognized() {
    let source = MemorySource::new()
        .with_unreachable(WIF_SEGWIT)
        .with_unreachable(WIF_LEGACY);
    let (importer, _) = setup(source);
    let mut repo = WalletRepository::new();

    let err = import(&importer, &mut repo, ImportRequest::new(WIF)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::UnrecognizedSecret);
    assert!(repo.is_empty());
}

#[tokio::test]
async fn cancellation_abandons_fetch_and_persists_nothing() {
    let source = MemorySource::new()
        .with_delay(Duration::from_secs(30))
        .with_transaction(WIF_LEGACY, tx("g1"));
    let (importer, _) = setup(source);
    let mut repo = WalletRepository::new();
    let (handle, cancel) = CancelHandle::new();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    });

    let err = importer
        .import(&mut repo, ImportRequest::new(WIF), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Cancelled);
    assert!(repo.is_empty());
}

#[tokio::test]
async fn cancelled_before_start_makes_no_request() {
    let (importer, source) = setup(MemorySource::new());
    let mut repo = WalletRepository::new();
    let (handle, cancel) = CancelHandle::new();
    handle.cancel();

    let err = importer
        .import(&mut repo, ImportRequest::new(WIF), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Cancelled);
    assert!(source.requested_addresses().is_empty());
}

#[tokio::test]
async fn non_vault_phrase_is_never_routed_to_a_vault() {
    let (importer, _) = setup(MemorySource::new());
    let mut repo = WalletRepository::new();

    for kind in [VaultKind::Ar, VaultKind::Air] {
        let err = import(
            &importer,
            &mut repo,
            ImportRequest::new(BIP39_PHRASE).with_vault(kind),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMnemonic);
    }
}

#[tokio::test]
async fn electrum_vault_seed_is_unsupported() {
    let (importer, source) = setup(MemorySource::new());
    let mut repo = WalletRepository::new();

    let err = import(&importer, &mut repo, ImportRequest::new(ELECTRUM_PHRASE))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedVaultMnemonic);
    assert!(source.requested_addresses().is_empty());
}

#[tokio::test]
async fn bip39_vault_phrase_without_family_runs_the_cascade() {
    let (importer, _) = setup(MemorySource::new().with_transaction(VAULT_BIP49_FIRST, tx("h1")));
    let mut repo = WalletRepository::new();

    let summary = expect_imported(
        import(&importer, &mut repo, ImportRequest::new(VAULT_PHRASE)).await.unwrap(),
    );
    assert_eq!(summary.kind, WalletKind::HdSegwitP2SH);
}

#[tokio::test]
async fn ar_vault_import() {
    let (importer, _) = setup(MemorySource::new().with_transaction(VAULT_AR_FIRST, tx("i1")));
    let mut repo = WalletRepository::new();

    let mut session = expect_vault(
        import(
            &importer,
            &mut repo,
            ImportRequest::new(VAULT_PHRASE).with_vault(VaultKind::Ar),
        )
        .await
        .unwrap(),
    );
    assert_eq!(session.kind(), VaultKind::Ar);
    assert_eq!(session.add_public_key(KEY_1).unwrap(), KeyRole::Cancel);

    let summary = session
        .finish(&importer, &mut repo, &CancelSignal::never())
        .await
        .unwrap();
    assert_eq!(summary.kind, WalletKind::VaultAR);
    assert_eq!(summary.address.as_deref(), Some(VAULT_AR_FIRST));
    assert_eq!(summary.label, "Imported 2-Key Vault");
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn air_vault_import_with_step_back() {
    let (importer, _) = setup(MemorySource::new().with_transaction(VAULT_AIR_FIRST, tx("j1")));
    let mut repo = WalletRepository::new();

    let mut session = expect_vault(
        import(
            &importer,
            &mut repo,
            ImportRequest::new(VAULT_PHRASE).with_vault(VaultKind::Air),
        )
        .await
        .unwrap(),
    );

    assert_eq!(session.add_public_key(KEY_1).unwrap(), KeyRole::Instant);
    session.clear_public_keys().unwrap();
    assert_eq!(session.next_role(), Some(KeyRole::Instant));

    assert_eq!(session.add_public_key(KEY_2).unwrap(), KeyRole::Instant);
    assert_eq!(
        session.add_public_key(KEY_2).unwrap_err().code,
        ErrorCode::DuplicateKey
    );
    assert_eq!(session.add_public_key(KEY_3).unwrap(), KeyRole::Recovery);

    let summary = session
        .finish(&importer, &mut repo, &CancelSignal::never())
        .await
        .unwrap();
    assert_eq!(summary.kind, WalletKind::VaultAIR);
    assert_eq!(summary.address.as_deref(), Some(VAULT_AIR_FIRST));
}

#[tokio::test]
async fn incomplete_vault_cannot_finish() {
    let (importer, _) = setup(MemorySource::new());
    let mut repo = WalletRepository::new();

    let mut session = expect_vault(
        import(
            &importer,
            &mut repo,
            ImportRequest::new(VAULT_PHRASE).with_vault(VaultKind::Air),
        )
        .await
        .unwrap(),
    );
    session.add_public_key(KEY_2).unwrap();

    let err = session
        .finish(&importer, &mut repo, &CancelSignal::never())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidKey);
    assert!(repo.is_empty());
}

#[tokio::test]
async fn second_import_of_same_wallet_is_in_use() {
    let (importer, _) = setup(MemorySource::new().with_transaction(WIF_LEGACY, tx("k1")));
    let mut repo = WalletRepository::new();

    import(&importer, &mut repo, ImportRequest::new(WIF)).await.unwrap();
    let err = import(&importer, &mut repo, ImportRequest::new(format!(" {} ", WIF)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::WalletInUse);
    assert_eq!(repo.len(), 1);
}
