//! Verity CLI — run verification flows and browse history.
//!
//! Without `--rpc-url` the CLI runs in demo mode against a built-in mock
//! chain and wallet; with it, history reads go to a real JSON-RPC node.

mod config;

use anyhow::{bail, Context};
use clap::Parser;
use config::VerityConfig;
use std::path::PathBuf;
use std::sync::Arc;
use verity_attestation::{AttestationProvider, HttpAttestor, MockAttestor};
use verity_flow::{FlowEvent, VerificationFlow};
use verity_history::{HistoryStats, HistorySync, VerificationRecord};
use verity_ledger::{LedgerClient, MockLedger, MockWallet, RpcLedger};
use verity_store::{FileStore, KvStore, MemoryStore};
use verity_types::{Address, DataType, Timestamp};
use verity_utils::{format_duration, init_tracing_with, LogFormat};

/// The account demo mode submits and queries as.
const DEMO_ADDRESS: [u8; 20] = [0x42; 20];

#[derive(Parser)]
#[command(name = "verity", about = "Verity verification ledger client")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the persistent block cache.
    #[arg(long, env = "VERITY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// JSON-RPC endpoint of the ledger node (omit for the built-in mock).
    #[arg(long, env = "VERITY_RPC_URL")]
    rpc_url: Option<String>,

    /// Verification contract address (required with --rpc-url).
    #[arg(long, env = "VERITY_CONTRACT")]
    contract: Option<String>,

    /// Remote attestor service base URL (omit to mock attestations).
    #[arg(long, env = "VERITY_ATTESTOR_URL")]
    attestor_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VERITY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VERITY_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a full two-phase verification flow.
    Verify {
        /// Data category: identity, income, credit_score, social_media,
        /// or education.
        #[arg(long)]
        data_type: String,
    },
    /// Show the reconciled verification history for an address.
    History {
        /// Account to query (defaults to the demo account).
        #[arg(long)]
        address: Option<String>,
        /// Clear the cache first and re-scan from genesis.
        #[arg(long)]
        refresh: bool,
    },
    /// Show profile counters for an address.
    Stats {
        #[arg(long)]
        address: Option<String>,
    },
    /// Drop the cached scan state for an address.
    ClearCache {
        #[arg(long)]
        address: Option<String>,
    },
}

/// What a history-reading subcommand wants done.
enum HistoryAction {
    Show { refresh: bool },
    Stats,
    ClearCache,
}

fn merged_config(cli: &Cli) -> anyhow::Result<VerityConfig> {
    let mut config = match &cli.config {
        Some(path) => VerityConfig::from_toml_file(path)?,
        None => VerityConfig::default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(rpc_url) = &cli.rpc_url {
        config.rpc_url = Some(rpc_url.clone());
    }
    if let Some(contract) = &cli.contract {
        config.contract = Some(contract.parse().context("parsing --contract")?);
    }
    if let Some(attestor_url) = &cli.attestor_url {
        config.attestor_url = Some(attestor_url.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

fn parse_address(raw: &Option<String>) -> anyhow::Result<Address> {
    match raw {
        Some(s) => s.parse().context("parsing --address"),
        None => Ok(Address::new(DEMO_ADDRESS)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = merged_config(&cli)?;
    init_tracing_with(&config.log_level, LogFormat::from_name(&config.log_format));

    match cli.command {
        Command::Verify { data_type } => {
            let data_type: DataType = data_type.parse().context(
                "unsupported data type (expected identity, income, credit_score, \
                 social_media, or education)",
            )?;
            if config.rpc_url.is_some() {
                bail!(
                    "verify runs in demo mode only; drop --rpc-url \
                     (no wallet transport is configured for remote chains)"
                );
            }
            run_demo_verify(&config, data_type).await
        }
        Command::History { address, refresh } => {
            run_history(&config, parse_address(&address)?, HistoryAction::Show { refresh }).await
        }
        Command::Stats { address } => {
            run_history(&config, parse_address(&address)?, HistoryAction::Stats).await
        }
        Command::ClearCache { address } => {
            run_history(&config, parse_address(&address)?, HistoryAction::ClearCache).await
        }
    }
}

/// Dispatch a history action to the configured backend. The mock chain is
/// ephemeral, so demo mode pairs it with an in-memory cache; RPC mode
/// persists the cache on disk.
async fn run_history(
    config: &VerityConfig,
    address: Address,
    action: HistoryAction,
) -> anyhow::Result<()> {
    match &config.rpc_url {
        Some(url) => {
            let contract = config
                .contract
                .context("--contract is required with --rpc-url")?;
            let sync = HistorySync::new(
                RpcLedger::new(url, contract),
                FileStore::open(&config.data_dir)?,
                config.scan.clone(),
            );
            history_action(&sync, address, action).await
        }
        None => {
            let sync = HistorySync::new(
                Arc::new(demo_ledger()),
                MemoryStore::new(),
                config.scan.clone(),
            );
            history_action(&sync, address, action).await
        }
    }
}

async fn history_action<L: LedgerClient, S: KvStore>(
    sync: &HistorySync<L, S>,
    address: Address,
    action: HistoryAction,
) -> anyhow::Result<()> {
    match action {
        HistoryAction::Show { refresh } => {
            let records = if refresh {
                sync.force_refresh(address).await?
            } else {
                sync.refresh(address).await?
            };
            print_records(&records);
        }
        HistoryAction::Stats => {
            let records = sync.refresh(address).await?;
            print_stats(&HistoryStats::from_records(&records));
        }
        HistoryAction::ClearCache => {
            sync.clear_cache(address)?;
            println!("cache cleared for {address}");
        }
    }
    Ok(())
}

/// A mock chain pre-seeded with a little activity so demo queries have
/// something to show.
fn demo_ledger() -> MockLedger {
    let user = Address::new(DEMO_ADDRESS);
    let ledger = MockLedger::new(1000);
    let (_, request_id) = ledger.mine_request(user, DataType::Identity);
    ledger
        .mine_completion(user, request_id, true)
        .expect("request was just mined");
    ledger.mine_request(user, DataType::Income);
    ledger
}

async fn run_demo_verify(config: &VerityConfig, data_type: DataType) -> anyhow::Result<()> {
    let user = Address::new(DEMO_ADDRESS);
    let ledger = Arc::new(demo_ledger());
    let wallet = MockWallet::new(ledger.clone(), user);

    match &config.attestor_url {
        Some(url) => {
            let provider = HttpAttestor::new(url, &config.attestor_app_id)?;
            drive_flow(config, wallet, ledger, provider, data_type, user).await
        }
        None => drive_flow(config, wallet, ledger, MockAttestor::new(), data_type, user).await,
    }
}

async fn drive_flow<P: AttestationProvider>(
    config: &VerityConfig,
    wallet: MockWallet,
    ledger: Arc<MockLedger>,
    provider: P,
    data_type: DataType,
    user: Address,
) -> anyhow::Result<()> {
    let mut flow = VerificationFlow::new(wallet, ledger.clone(), provider, config.flow.clone());
    flow.initialize().await?;

    println!("requesting {data_type} verification for {user}");
    let result = flow.request_verification(data_type).await;

    let mut refresh_needed = false;
    for event in flow.take_events() {
        match event {
            FlowEvent::Warning(w) => println!("  warning: {w}"),
            FlowEvent::RequestSubmitted(tx) => println!("  request submitted: {tx}"),
            FlowEvent::RequestConfirmed(id) => println!("  request confirmed, id {id}"),
            FlowEvent::Completed(id) => println!("  verification completed: {id}"),
            FlowEvent::HistoryRefreshNeeded => refresh_needed = true,
        }
    }

    let state = flow.state();
    println!(
        "flow finished: {} ({}%) - {}",
        state.status, state.progress, state.current_step
    );
    flow.shutdown().await?;
    result.context("verification flow failed")?;

    if refresh_needed {
        let sync = HistorySync::new(ledger, MemoryStore::new(), config.scan.clone());
        print_records(&sync.refresh(user).await?);
    }
    Ok(())
}

fn print_records(records: &[VerificationRecord]) {
    if records.is_empty() {
        println!("no verification records");
        return;
    }
    let now = Timestamp::now();
    println!("{} record(s):", records.len());
    for record in records {
        let age = format_duration(record.timestamp.elapsed_since(now));
        println!(
            "  {:<13} {:<9} {age} ago  block {:<8} {}",
            record.data_type, record.status, record.block_number, record.request_id,
        );
    }
}

fn print_stats(stats: &HistoryStats) {
    println!("total:             {}", stats.total);
    println!("verified:          {}", stats.verified);
    println!("pending:           {}", stats.pending);
    println!("failed:            {}", stats.failed);
    println!("data types:        {}", stats.unique_data_types);
    println!("success rate:      {:.1}%", stats.success_rate);
    match stats.last_verification {
        Some(ts) => println!(
            "last verification: {} ago",
            format_duration(ts.elapsed_since(Timestamp::now()))
        ),
        None => println!("last verification: never"),
    }
}
