//! gold-wallet - key-material and wallet import CLI.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use gold_wallet_core::crypto::{self, VaultSeedKind};
use gold_wallet_core::utils::logging;
use gold_wallet_core::{
    CancelHandle, Chain, EsploraSource, ImportOutcome, ImportRequest, Importer, VaultKind,
    WalletConfig, WalletRepository, WalletSummary,
};

#[derive(Parser)]
#[command(name = "gold-wallet", version, about = "Gold Wallet key-material tool")]
struct Cli {
    /// Print machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Override GOLD_WALLET_NETWORK (bitcoin or bitcoin-testnet).
    #[arg(long, global = true)]
    network: Option<Chain>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh 12-word mnemonic from OS randomness.
    Generate,

    /// Encode 16 bytes of hex entropy as a mnemonic.
    Encode {
        /// 32 hex characters.
        entropy: String,
    },

    /// Decode a mnemonic back to its entropy.
    Decode {
        mnemonic: String,

        /// Fail if the checksum nibble does not match.
        #[arg(long)]
        verify: bool,
    },

    /// Derive the key pair for a 12-word mnemonic.
    Keypair { mnemonic: String },

    /// Report whether a phrase is a vault mnemonic.
    IsVault { phrase: String },

    /// Identify a secret and import it.
    Import {
        secret: String,

        #[arg(short, long)]
        label: Option<String>,

        /// Import as a vault of this family (ar or air).
        #[arg(long)]
        vault: Option<VaultKind>,

        /// Vault public key (hex), in role order. Repeat for AIR.
        #[arg(long = "key")]
        keys: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = WalletConfig::from_env()?;
    if let Some(chain) = cli.network {
        config.chain = chain;
    }
    logging::set_min_level(config.log_level);

    match cli.command {
        Commands::Generate => {
            let mnemonic = crypto::generate()?;
            emit(cli.json, json!({ "mnemonic": mnemonic }), &mnemonic);
        }
        Commands::Encode { entropy } => {
            let bytes = hex::decode(entropy.trim()).context("entropy must be hex")?;
            let mnemonic = crypto::encode(&bytes)?;
            emit(cli.json, json!({ "mnemonic": mnemonic }), &mnemonic);
        }
        Commands::Decode { mnemonic, verify } => {
            let entropy = hex::encode(crypto::decode(&mnemonic)?.as_slice());
            let checksum_ok = crypto::verify_checksum(&mnemonic)?;
            if verify && !checksum_ok {
                bail!("checksum mismatch");
            }
            emit(
                cli.json,
                json!({ "entropy": entropy, "checksum_valid": checksum_ok }),
                &entropy,
            );
        }
        Commands::Keypair { mnemonic } => {
            let pair = crypto::mnemonic_to_key_pair(&mnemonic, config.network())?;
            let text = format!(
                "Public key (compressed):   {}\nPublic key (uncompressed): {}\nPrivate key (WIF):         {}",
                pair.public_key_hex(),
                pair.public_key_uncompressed_hex(),
                pair.to_wif().as_str()
            );
            emit(
                cli.json,
                json!({
                    "public_key": pair.public_key_hex(),
                    "public_key_uncompressed": pair.public_key_uncompressed_hex(),
                    "wif": pair.to_wif().as_str(),
                }),
                &text,
            );
        }
        Commands::IsVault { phrase } => {
            let kind = crypto::vault_seed_kind(&phrase);
            let text = match kind {
                Some(kind) => format!("vault mnemonic ({})", kind.name()),
                None => "not a vault mnemonic".to_string(),
            };
            emit(
                cli.json,
                json!({ "is_vault": kind.is_some(), "kind": kind.as_ref().map(VaultSeedKind::name) }),
                &text,
            );
        }
        Commands::Import {
            secret,
            label,
            vault,
            keys,
        } => {
            let summary = import(config, secret, label, vault, keys).await?;
            let text = format!(
                "Imported {} as \"{}\"\nAddress: {}\nTransactions: {}\nBalance: {} sat",
                summary.type_readable,
                summary.label,
                summary.address.as_deref().unwrap_or("-"),
                summary.transaction_count,
                summary.balance
            );
            emit(cli.json, serde_json::to_value(&summary)?, &text);
        }
    }

    Ok(())
}

async fn import(
    config: WalletConfig,
    secret: String,
    label: Option<String>,
    vault: Option<VaultKind>,
    keys: Vec<String>,
) -> Result<WalletSummary> {
    let source = Arc::new(EsploraSource::new(&config)?);
    let importer = Importer::new(config, source);
    let mut repo = WalletRepository::new();

    let (handle, cancel) = CancelHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let mut request = ImportRequest::new(secret);
    request.label = label;
    request.vault = vault;

    match importer.import(&mut repo, request, &cancel).await? {
        ImportOutcome::Imported(summary) => Ok(summary),
        ImportOutcome::VaultPending(mut session) => {
            for key in &keys {
                let role = session.add_public_key(key)?;
                eprintln!("Attached {} key", role);
            }
            if let Some(role) = session.next_role() {
                bail!("missing {} public key (pass it with --key)", role);
            }
            Ok(session.finish(&importer, &mut repo, &cancel).await?)
        }
    }
}

fn emit(as_json: bool, value: serde_json::Value, text: &str) {
    if as_json {
        println!("{}", value);
    } else {
        println!("{}", text);
    }
}
