//! alder: command-line front end for the Alder wallet.
//!
//! Every sending command runs the same build, review and send session as
//! the desktop wallet: the node builds the unsigned transaction(s), the
//! summary is printed for confirmation, and the node wallet signs and
//! broadcasts. Ctrl-C closes the session; results arriving afterwards are
//! ignored.

mod config;
mod rest;
mod sink;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use alder_core::address::{Address, AddressHash};
use alder_core::amount::format_amount;
use alder_core::constants::{Network, SYMBOL};
use alder_wallet::{
    BuildTransferTxData, ConsolidationData, ConsolidationTx, ContractCallData, ContractCallTx,
    TransferTx, TxError, TxModal, TxStrategy,
};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::rest::RestNodeClient;
use crate::sink::ConsoleSink;

/// Alder command-line wallet.
#[derive(Parser)]
#[command(name = "alder")]
#[command(version, about = "Build, review and send Alder transactions.")]
struct Cli {
    /// Configuration file (default: ~/.alder/config.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Network preset, overriding the configuration.
    #[arg(short, long, global = true)]
    network: Option<Network>,

    /// Send without asking for confirmation.
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send coins to another address. Sending the whole available balance
    /// sweeps the address.
    Send(SendArgs),
    /// Merge the inputs of an address into itself.
    Consolidate(ConsolidateArgs),
    /// Execute a script from an address.
    Call(CallArgs),
    /// Show the balance of an address.
    Balance(AddressArgs),
    /// Show the latest transactions of an address.
    History(HistoryArgs),
}

#[derive(Args)]
struct GasArgs {
    /// Gas amount (at least 20000). Node default when omitted.
    #[arg(long)]
    gas_amount: Option<String>,

    /// Gas price in ALD per gas unit. Node default when omitted.
    #[arg(long)]
    gas_price: Option<String>,
}

#[derive(Args)]
struct SendArgs {
    /// Source address of the node wallet.
    #[arg(short, long)]
    from: String,

    /// Recipient address.
    #[arg(short, long)]
    to: String,

    /// Amount in ALD (e.g. 10.5).
    #[arg(short, long)]
    amount: String,

    /// Print the wallet-connect signing result on completion.
    #[arg(long)]
    wallet_connect: bool,

    #[command(flatten)]
    gas: GasArgs,
}

#[derive(Args)]
struct ConsolidateArgs {
    /// Address to consolidate.
    address: String,
}

#[derive(Args)]
struct CallArgs {
    /// Calling address of the node wallet.
    #[arg(short, long)]
    from: String,

    /// Hex encoded script bytecode.
    #[arg(short, long)]
    bytecode: String,

    /// Amount in ALD attached to the call.
    #[arg(short, long)]
    amount: Option<String>,

    /// Print the wallet-connect signing result on completion.
    #[arg(long)]
    wallet_connect: bool,

    #[command(flatten)]
    gas: GasArgs,
}

#[derive(Args)]
struct AddressArgs {
    /// Address to query.
    address: String,
}

#[derive(Args)]
struct HistoryArgs {
    /// Address to query.
    address: String,

    /// Result page, starting at 1.
    #[arg(short, long, default_value = "1")]
    page: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(network) = cli.network {
        settings.network = network;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = Arc::new(RestNodeClient::new(&settings)?);
    info!(network = %settings.network, wallet = %settings.wallet_name, "alder ready");

    match cli.command {
        Commands::Send(args) => send(client, &settings, args, cli.yes).await,
        Commands::Consolidate(args) => consolidate(client, &settings, args, cli.yes).await,
        Commands::Call(args) => call(client, &settings, args, cli.yes).await,
        Commands::Balance(args) => balance(&client, args).await,
        Commands::History(args) => history(&client, args).await,
    }
}

async fn send(client: Arc<RestNodeClient>, settings: &Settings, args: SendArgs, yes: bool) -> Result<()> {
    let from = load_address(&client, &args.from).await?;
    let data = BuildTransferTxData {
        from_address: from,
        to_address: args.to,
        amount: args.amount,
        gas_amount: args.gas.gas_amount,
        gas_price: args.gas.gas_price,
    };
    run_session(TransferTx, client, settings, data, args.wallet_connect, yes).await
}

async fn consolidate(
    client: Arc<RestNodeClient>,
    settings: &Settings,
    args: ConsolidateArgs,
    yes: bool,
) -> Result<()> {
    let from = load_address(&client, &args.address).await?;
    run_session(ConsolidationTx, client, settings, ConsolidationData { from_address: from }, false, yes).await
}

async fn call(client: Arc<RestNodeClient>, settings: &Settings, args: CallArgs, yes: bool) -> Result<()> {
    let from = load_address(&client, &args.from).await?;
    let data = ContractCallData {
        from_address: from,
        bytecode: args.bytecode,
        amount: args.amount,
        gas_amount: args.gas.gas_amount,
        gas_price: args.gas.gas_price,
    };
    run_session(ContractCallTx, client, settings, data, args.wallet_connect, yes).await
}

/// Drive one session from build to a final step.
async fn run_session<S: TxStrategy>(
    strategy: S,
    client: Arc<RestNodeClient>,
    settings: &Settings,
    data: S::Data,
    wallet_connect: bool,
    yes: bool,
) -> Result<()> {
    let sink = Arc::new(ConsoleSink::default());
    let mut modal = TxModal::new(strategy, client.clone(), sink.clone(), sink.clone(), settings.network);
    if wallet_connect {
        modal = modal.with_wallet_connect();
    }
    let modal = Arc::new(modal);

    let closer = modal.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupted, closing");
            closer.close();
        }
    });

    let outcome = drive(&modal, &client, &sink, data, yes).await;
    watcher.abort();

    let pending = sink.pending();
    if !pending.is_empty() {
        println!("{} transaction(s) pending confirmation", pending.len());
    }
    for address in sink.stale_addresses() {
        println!("Balance of {address} changed; run `alder balance {address}` once confirmed.");
    }
    outcome
}

async fn drive<S: TxStrategy>(
    modal: &TxModal<S>,
    client: &RestNodeClient,
    sink: &ConsoleSink,
    data: S::Data,
    yes: bool,
) -> Result<()> {
    let summary = match modal.advance_to_check(data).await {
        Ok(summary) => summary,
        Err(TxError::Closed) => bail!("interrupted before anything was sent"),
        Err(e) => return Err(e).context("could not build transaction"),
    };
    println!("{summary}");

    if !yes && !confirm("Send?")? {
        modal.close();
        println!("Cancelled.");
        return Ok(());
    }

    let password = Zeroizing::new(
        rpassword::prompt_password("Wallet password: ").context("Failed to read password")?,
    );
    client.unlock(&password).await.context("could not unlock node wallet")?;
    drop(password);

    send_until_done(modal, sink, yes).await
}

/// Send, offering a retry after each failure. A closed session is an error
/// naming what already went out.
async fn send_until_done<S: TxStrategy>(modal: &TxModal<S>, sink: &ConsoleSink, yes: bool) -> Result<()> {
    loop {
        match modal.confirm_and_send().await {
            Ok(completion) => {
                println!("Sent {} transaction(s).", completion.tx_ids.len());
                return Ok(());
            }
            Err(TxError::Closed) => {
                bail!("interrupted after {} transaction(s) were broadcast", sink.pending().len())
            }
            Err(TxError::Send(e)) => {
                let ctx = modal.context();
                if ctx.sent_count() > 0 {
                    println!(
                        "{} transaction(s) already broadcast, {} left; a retry resumes after them.",
                        ctx.sent_count(),
                        ctx.unsent_sweep_txs().len()
                    );
                }
                if yes || !confirm("Retry?")? {
                    modal.close();
                    return Err(e).context("send failed");
                }
                modal.back_to_check()?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn balance(client: &RestNodeClient, args: AddressArgs) -> Result<()> {
    let address = load_address(client, &args.address).await?;
    println!("Address:   {}", address.hash);
    println!("Balance:   {} {SYMBOL}", format_amount(address.balance()));
    println!("Locked:    {} {SYMBOL}", format_amount(address.locked_balance()));
    println!("Available: {} {SYMBOL}", format_amount(address.available_balance()));
    Ok(())
}

async fn history(client: &RestNodeClient, args: HistoryArgs) -> Result<()> {
    let hash = parse_hash(&args.address)?;
    let txs = client
        .history(&hash, args.page)
        .await
        .with_context(|| format!("failed to fetch history of {hash}"))?;
    if txs.is_empty() {
        println!("No transactions.");
    }
    for tx in txs {
        let when = DateTime::<Utc>::from_timestamp_millis(tx.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| tx.timestamp.to_string());
        println!("{when}  {}", tx.hash);
    }
    Ok(())
}

async fn load_address(client: &RestNodeClient, raw: &str) -> Result<Address> {
    let hash = parse_hash(raw)?;
    client.fetch_address(&hash).await
}

fn parse_hash(raw: &str) -> Result<AddressHash> {
    AddressHash::parse(raw).with_context(|| format!("invalid address: {raw}"))
}

/// Ask a yes/no question on stdin. Anything but `y`/`yes` is a no.
fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read answer")?;
    if read == 0 {
        bail!("no answer on stdin; pass --yes to skip confirmation");
    }
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alder_core::constants::COIN;
    use alder_core::error::ClientError;
    use alder_core::traits::NodeClient;
    use alder_core::types::{
        ContractCallRequest, SentTx, SignAndSendRequest, SweepBuild, SweepTx, TransferRequest,
        UnsignedTx,
    };
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn hash(seed: u8) -> AddressHash {
        let mut bytes = vec![0x00];
        bytes.extend_from_slice(&[seed; 32]);
        AddressHash::parse(&bs58::encode(bytes).into_string()).unwrap()
    }

    /// Sweeps in two transactions and holds the second broadcast until
    /// released.
    #[derive(Default)]
    struct StallingNode {
        stalled: Notify,
        release: Notify,
    }

    #[async_trait]
    impl NodeClient for StallingNode {
        async fn build_sweep_transactions(
            &self,
            _from: &Address,
            _to: &AddressHash,
        ) -> Result<SweepBuild, ClientError> {
            let unsigned_txs = (0..2)
                .map(|i| SweepTx { tx_id: format!("s{i}"), unsigned_tx: format!("raw-s{i}") })
                .collect();
            Ok(SweepBuild { unsigned_txs, fees: 2 })
        }

        async fn create_transaction(&self, _request: &TransferRequest) -> Result<UnsignedTx, ClientError> {
            Err(ClientError::Malformed("transfers not scripted".into()))
        }

        async fn build_contract_call(
            &self,
            _request: &ContractCallRequest,
        ) -> Result<UnsignedTx, ClientError> {
            Err(ClientError::Malformed("calls not scripted".into()))
        }

        async fn sign_and_send_transaction(
            &self,
            request: &SignAndSendRequest,
        ) -> Result<SentTx, ClientError> {
            if request.tx_id == "s1" {
                self.stalled.notify_one();
                self.release.notified().await;
            }
            Ok(SentTx { tx_id: request.tx_id.clone(), signature: format!("sig-{}", request.tx_id) })
        }
    }

    #[tokio::test]
    async fn interrupted_sweep_is_an_error() {
        let node = Arc::new(StallingNode::default());
        let sink = Arc::new(ConsoleSink::default());
        let modal = Arc::new(TxModal::new(
            TransferTx,
            node.clone(),
            sink.clone(),
            sink.clone(),
            Network::Testnet,
        ));
        let from = Address::new(hash(1), "pk1", 5 * COIN, 0).unwrap();
        let data = BuildTransferTxData {
            from_address: from,
            to_address: hash(2).to_string(),
            amount: "5".into(),
            gas_amount: None,
            gas_price: None,
        };
        modal.advance_to_check(data).await.unwrap();

        let task = {
            let modal = modal.clone();
            let sink = sink.clone();
            tokio::spawn(async move { send_until_done(&*modal, &sink, true).await })
        };
        node.stalled.notified().await;
        modal.close();
        node.release.notify_one();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "interrupted after 1 transaction(s) were broadcast");
        assert_eq!(sink.pending().len(), 1);
        assert_eq!(sink.stale_addresses(), [hash(1).to_string()]);
    }
}
