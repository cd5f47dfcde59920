//! `ballot`: command-line front end for staked-token proposal voting.

mod config;
mod render;

use anyhow::Context;
use ballot_client::{GovernanceApi, WalletApiClient};
use ballot_governance::{GovernanceEngine, Partition, Snapshot, VoteFilter};
use ballot_store_lmdb::{LmdbEnvironment, LmdbKvStore};
use ballot_types::{Amount, Epoch, ProposalId, Vote};
use ballot_utils::init_logging;
use clap::Parser;
use config::DaemonConfig;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

/// Map size for the local store. It only ever holds the pending-vote list.
const LMDB_MAP_SIZE: usize = 16 * 1024 * 1024;
const LMDB_MAX_DBS: u32 = 4;

type Engine = GovernanceEngine<WalletApiClient, LmdbKvStore>;

#[derive(Parser)]
#[command(name = "ballot", about = "Browse governance proposals and cast staked-token votes")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "BALLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Wallet API JSON-RPC endpoint.
    #[arg(long, env = "BALLOT_WALLET_API_URL")]
    wallet_api_url: Option<String>,

    /// Voting contract id.
    #[arg(long, env = "BALLOT_CONTRACT_ID")]
    contract_id: Option<String>,

    /// Contract shader file passed to the wallet with each invocation.
    #[arg(long, env = "BALLOT_CONTRACT_FILE")]
    contract_file: Option<String>,

    /// Directory for the local pending-vote store.
    #[arg(long, env = "BALLOT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BALLOT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOT_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// List proposals of one partition.
    List {
        #[arg(long, default_value = "current")]
        partition: Partition,
        /// "all", "awaiting" or "voted".
        #[arg(long, default_value = "all")]
        filter: VoteFilter,
        /// Restrict the previous partition to one epoch.
        #[arg(long)]
        epoch: Option<u32>,
    },
    /// Show one proposal in detail.
    Show {
        #[arg(long)]
        id: u32,
        #[arg(long, default_value = "current")]
        partition: Partition,
        /// Position of the proposal in the listing, if known.
        #[arg(long)]
        index: Option<usize>,
    },
    /// Vote on a current-epoch proposal.
    Vote {
        #[arg(long)]
        id: u32,
        choice: Choice,
    },
    /// Move stake between passive and active.
    Stake {
        #[command(subcommand)]
        action: StakeAction,
    },
    /// List locally submitted votes awaiting confirmation.
    Pending,
    /// Keep refreshing and log a summary of every new snapshot.
    Watch {
        /// Override the configured refresh interval, in seconds.
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(clap::Subcommand)]
enum StakeAction {
    /// Lock tokens as active stake so they count towards votes.
    Deposit {
        /// Amount in tokens, e.g. `12.5`.
        amount: f64,
    },
    /// Release active stake back to passive.
    Withdraw {
        /// Amount in tokens, e.g. `12.5`.
        amount: f64,
    },
}

impl StakeAction {
    fn amount(&self) -> f64 {
        match self {
            Self::Deposit { amount } | Self::Withdraw { amount } => *amount,
        }
    }

    fn locks(&self) -> bool {
        matches!(self, Self::Deposit { .. })
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Choice {
    Yes,
    No,
}

impl From<Choice> for Vote {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Yes => Vote::Yes,
            Choice::No => Vote::No,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<DaemonConfig> {
    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(url) = &cli.wallet_api_url {
        config.wallet_api_url = url.clone();
    }
    if let Some(cid) = &cli.contract_id {
        config.contract_id = cid.clone();
    }
    if let Some(file) = &cli.contract_file {
        config.contract_file = Some(file.clone());
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

fn build_engine(config: &DaemonConfig) -> anyhow::Result<Engine> {
    let env = LmdbEnvironment::open(&config.data_dir, LMDB_MAX_DBS, LMDB_MAP_SIZE)
        .with_context(|| format!("failed to open store in {}", config.data_dir.display()))?;
    let client = WalletApiClient::new(&config.wallet_api_url, config.contract_file.clone())?;
    Ok(GovernanceEngine::new(
        GovernanceApi::new(client, &config.contract_id),
        env.kv_store(),
    ))
}

fn log_summary(snapshot: &Snapshot) {
    let set = snapshot.set(VoteFilter::All, None);
    let awaiting = set
        .current
        .items
        .iter()
        .filter(|p| p.is_awaiting_vote())
        .count();
    tracing::info!(
        seq = snapshot.seq(),
        epoch = snapshot.window().current().raw(),
        current = set.current.total,
        future = set.future.total,
        previous_epochs = set.previous.len(),
        awaiting,
        "governance state refreshed"
    );
}

async fn watch_state(engine: &Engine, interval: Duration) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut updates = engine.subscribe();
    let run = engine.run(interval, shutdown_rx);
    tokio::pin!(run);

    tracing::info!(interval_secs = interval.as_secs(), "watching governance state");
    loop {
        tokio::select! {
            _ = &mut run => break,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT, shutting down");
                let _ = shutdown_tx.send(true);
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                log_summary(&snapshot);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_logging(config.log_format()?, &config.log_level)?;

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    config.validate()?;
    let engine = build_engine(&config)?;

    match cli.command {
        Command::Watch { interval } => {
            let interval = interval
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.refresh_interval());
            watch_state(&engine, interval).await?;
        }
        Command::Pending => {
            println!("{}", render::render_pending(&engine.pending_votes()));
        }
        Command::Stake { action } => {
            let amount = Amount::from_tokens(action.amount());
            if amount.is_zero() {
                anyhow::bail!("stake amount must be a positive number of tokens");
            }
            let txid = engine
                .api()
                .move_funds(amount, action.locks())
                .await
                .context("failed to move stake")?;
            println!("stake transaction {txid}");
        }
        command => {
            engine
                .refresh()
                .await
                .context("failed to load governance state")?;
            let snapshot = engine.snapshot();
            match command {
                Command::List {
                    partition,
                    filter,
                    epoch,
                } => {
                    let set = snapshot.set(filter, epoch.map(Epoch::new));
                    println!("{}", render::render_set(&set, partition, filter));
                }
                Command::Show {
                    id,
                    partition,
                    index,
                } => {
                    let proposal = snapshot.proposal(ProposalId::new(id), partition, index)?;
                    println!("{}", render::render_proposal(proposal, &snapshot));
                }
                Command::Vote { id, choice } => {
                    let txid = engine.cast_vote(ProposalId::new(id), choice.into()).await?;
                    println!("vote submitted, transaction {txid}");
                }
                Command::Pending
                | Command::Stake { .. }
                | Command::Watch { .. }
                | Command::Config => {}
            }
        }
    }

    Ok(())
}
