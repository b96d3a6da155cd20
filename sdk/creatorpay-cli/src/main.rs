use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use creatorpay_sdk::{
    fetch_token_balance, format_ui_amount, parse_address, BatchPayer, CreatorPayConfig,
    JsonFileSource, KeypairSigner, PaymentList, PaymentSource, RpcConnection, SubmissionStatus,
    WalletSigner,
};
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "creatorpay", version, about = "Pay creators in USDC with one transaction")]
struct Cli {
    /// Path to a TOML config file (environment variables override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the payment list and its total without touching the network
    Summary {
        /// JSON file of `{ "wallet": ..., "amount": ... }` records
        payments: PathBuf,
    },

    /// Pay every creator in the list with a single transaction
    Pay {
        /// JSON file of `{ "wallet": ..., "amount": ... }` records
        payments: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },

    /// Token balance of a wallet (defaults to the configured keypair)
    Balance {
        owner: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CreatorPayConfig::load(cli.config.as_deref())?;

    match cli.cmd {
        Commands::Summary { payments } => {
            let list = JsonFileSource::new(payments).load()?;
            print_summary(&list, &config);
        },
        Commands::Pay { payments, yes } => {
            let list = JsonFileSource::new(payments).load()?;
            print_summary(&list, &config);
            if list.is_empty() {
                bail!("Nothing to pay");
            }
            if !yes && !confirm("Send this batch?")? {
                info!("Aborted by user");
                return Ok(());
            }
            pay(list, config).await?;
        },
        Commands::Balance { owner } => {
            let owner = resolve_owner(owner.as_deref(), &config)?;
            let connection = RpcConnection::new(config.rpc_url.clone(), config.commitment()?);
            let balance = fetch_token_balance(&connection, &owner, &config.mint).await?;
            println!("{}: {}", owner, format_ui_amount(balance, config.decimals));
        },
    }

    Ok(())
}

/// Wallet whose balance to show; the keypair file is only read when no owner is given
fn resolve_owner(owner: Option<&str>, config: &CreatorPayConfig) -> Result<Pubkey> {
    match owner {
        Some(owner) => Ok(parse_address(owner)?),
        None => {
            let keypair_path = config.keypair_path();
            let signer = KeypairSigner::from_file(&keypair_path)
                .with_context(|| format!("Loading keypair from {}", keypair_path.display()))?;
            Ok(signer.pubkey())
        },
    }
}

fn build_payer(config: CreatorPayConfig) -> Result<BatchPayer<RpcConnection, KeypairSigner>> {
    let keypair_path = config.keypair_path();
    let signer = KeypairSigner::from_file(&keypair_path)
        .with_context(|| format!("Loading keypair from {}", keypair_path.display()))?;
    let connection = RpcConnection::new(config.rpc_url.clone(), config.commitment()?);
    info!(rpc = %connection.url(), cluster = %config.cluster, "Connected");
    Ok(BatchPayer::new(connection, signer, config))
}

async fn pay(list: PaymentList, config: CreatorPayConfig) -> Result<()> {
    let cluster = config.cluster.clone();
    let decimals = config.decimals;
    let payer = build_payer(config)?;
    let payer_key = payer.payer();

    match payer.run_batch_payment(&payer_key, list.payments()).await {
        Ok(outcome) => {
            for failure in &outcome.failures {
                warn!(
                    index = failure.index,
                    wallet = %failure.payment.destination,
                    error = %failure.error,
                    "Payment skipped"
                );
            }
            println!(
                "Paid {} creators, {} total",
                outcome.paid,
                format_ui_amount(outcome.total_base_units, decimals)
            );
            println!("{}", outcome.result.explorer_url(&cluster));
            if let SubmissionStatus::Failed(reason) = outcome.result.status {
                bail!("Transaction failed on-chain: {}", reason);
            }
            Ok(())
        },
        Err(failure) => {
            for skipped in &failure.failures {
                warn!(
                    index = skipped.index,
                    wallet = %skipped.payment.destination,
                    error = %skipped.error,
                    "Payment skipped"
                );
            }
            Err(failure.error.into())
        },
    }
}

fn summary_lines(list: &PaymentList) -> Vec<String> {
    let mut lines: Vec<String> = list
        .payments()
        .iter()
        .map(|payment| format!("{:>14.2}  {}", payment.amount, payment.destination))
        .collect();
    lines.push(format!(
        "{} payments, {:.2} total ({} records dropped)",
        list.len(),
        list.total(),
        list.dropped
    ));
    lines
}

fn print_summary(list: &PaymentList, config: &CreatorPayConfig) {
    for line in summary_lines(list) {
        println!("{}", line);
    }
    info!(mint = %config.mint, cluster = %config.cluster, "Payment summary");
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
