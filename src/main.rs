//! Command-line entry point for the tix-ops toolkit.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use tix_ops::chain::{ChainKey, TARGET_CHAINS};
use tix_ops::config::{
    OpsConfig, DEFAULT_ARTIFACTS_DIR, DEFAULT_LEDGER_DIR, DEFAULT_SNAPSHOT_FILE,
};
use tix_ops::deploy::{
    ArtifactStore, DeployRunner, DeployStatus, WorkflowDeployer, WorkflowStatus,
    DEFAULT_WORKFLOW_CHAINS,
};
use tix_ops::ledger::LedgerSet;
use tix_ops::ownership::{CheckScope, OwnerCheck, OwnershipSweeper, SweepOutcome, TransferScope};
use tix_ops::providers::{AlloyConnector, TokioClock};
use tix_ops::registry::{self, Registry};
use tix_ops::status::{WiredStatusChecker, WiringStatus};
use tix_ops::{OpsError, Result};

/// Deployment and operations toolkit for the TIX cross-chain fleet.
#[derive(Parser)]
#[command(
    name = "tix-ops",
    about = "Deployment and operations toolkit for the TIX cross-chain fleet",
    version
)]
struct Cli {
    /// Directory holding the CSV deployment ledgers
    #[arg(long, global = true, default_value = DEFAULT_LEDGER_DIR)]
    ledger_dir: PathBuf,

    /// Registry snapshot file
    #[arg(long, global = true, default_value = DEFAULT_SNAPSHOT_FILE)]
    metadata_file: PathBuf,

    /// Directory holding compiled contract artifacts
    #[arg(long, global = true, default_value = DEFAULT_ARTIFACTS_DIR)]
    artifacts_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deploy the token, service deployers and adapter to each target chain
    Deploy {
        /// Comma-separated chain keys (default: all target chains)
        #[arg(long, value_delimiter = ',')]
        chains: Option<Vec<String>>,
    },
    /// Deploy the TokenWorkflow contract to each target chain
    DeployWorkflows {
        /// Comma-separated chain keys (default: the workflow testnets)
        #[arg(long, value_delimiter = ',')]
        chains: Option<Vec<String>>,
    },
    /// Fetch the chain registry, snapshot it, and print a per-chain summary
    FetchMetadata,
    /// Check every recorded adapter against its expected read library
    WiredStatus,
    /// Print the owner of every recorded adapter
    CheckOwner {
        /// "all" or a single chain key
        #[arg(long, env = "CHECK_SCOPE", default_value = "all")]
        scope: CheckScope,
    },
    /// Transfer everything the signer still owns to the final owner
    TransferOwnership {
        /// Which ledgers to sweep: all, tix or adapters
        #[arg(long, env = "TRANSFER_SCOPE", default_value = "all")]
        scope: TransferScope,
    },
    /// Print the native chain id to endpoint id map
    ExportEids,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = OpsConfig::from_env()?;
    config.ledger_dir = cli.ledger_dir;
    config.snapshot_path = cli.metadata_file;
    config.artifacts_dir = cli.artifacts_dir;

    match cli.command {
        Command::Deploy { chains } => deploy(&config, chains).await,
        Command::DeployWorkflows { chains } => deploy_workflows(&config, chains).await,
        Command::FetchMetadata => fetch_metadata(&config).await,
        Command::WiredStatus => wired_status(&config).await,
        Command::CheckOwner { scope } => check_owner(&config, scope).await,
        Command::TransferOwnership { scope } => transfer_ownership(&config, scope).await,
        Command::ExportEids => export_eids(&config),
    }
}

async fn deploy(config: &OpsConfig, chains: Option<Vec<String>>) -> Result<ExitCode> {
    config.require_private_key()?;
    let chains = requested_chains(chains, config)?;
    let registry = fresh_registry(config).await?;

    let runner = DeployRunner::builder()
        .config(config.clone())
        .registry(registry)
        .ledgers(LedgerSet::new(&config.ledger_dir))
        .artifacts(ArtifactStore::new(&config.artifacts_dir))
        .connector(Arc::new(AlloyConnector::new(config.clone())))
        .clock(Arc::new(TokioClock::new()))
        .build();
    let report = runner.run(&chains).await;

    for outcome in &report.outcomes {
        match &outcome.status {
            DeployStatus::Deployed(deployment) => {
                let reuse = if deployment.reused_token { " (reused)" } else { "" };
                println!(
                    "{}: token {} adapter {}{}",
                    outcome.chain, deployment.token, deployment.adapter, reuse
                );
            }
            DeployStatus::Failed(reason) => println!("{}: FAILED: {reason}", outcome.chain),
        }
    }
    let halted = if report.halted { " (halted)" } else { "" };
    println!(
        "deployed {} failed {}{halted}",
        report.deployed(),
        report.failed()
    );
    Ok(success_code(report.all_succeeded()))
}

async fn deploy_workflows(config: &OpsConfig, chains: Option<Vec<String>>) -> Result<ExitCode> {
    config.require_private_key()?;
    let chains = match chains {
        Some(keys) => requested_chains(Some(keys), config)?,
        None => DEFAULT_WORKFLOW_CHAINS.iter().map(ChainKey::new).collect(),
    };
    let registry = fresh_registry(config).await?;

    let deployer = WorkflowDeployer::builder()
        .config(config.clone())
        .registry(registry)
        .ledgers(LedgerSet::new(&config.ledger_dir))
        .artifacts(ArtifactStore::new(&config.artifacts_dir))
        .connector(Arc::new(AlloyConnector::new(config.clone())))
        .clock(Arc::new(TokioClock::new()))
        .build();
    let report = deployer.run(&chains).await;

    for outcome in &report.outcomes {
        match &outcome.status {
            WorkflowStatus::Deployed { workflow } => {
                println!("{}: workflow {workflow}", outcome.chain)
            }
            WorkflowStatus::Reused { workflow } => {
                println!("{}: workflow {workflow} (reused)", outcome.chain)
            }
            WorkflowStatus::Failed(reason) => println!("{}: FAILED: {reason}", outcome.chain),
        }
    }
    println!(
        "deployed {} reused {} failed {}",
        report.deployed(),
        report.reused(),
        report.failed()
    );
    Ok(success_code(report.all_succeeded()))
}

async fn fetch_metadata(config: &OpsConfig) -> Result<ExitCode> {
    let registry = registry::fetch_registry(&config.metadata_url).await?;
    registry.save(&config.snapshot_path)?;
    println!(
        "fetched {} entries to {}",
        registry.len(),
        config.snapshot_path.display()
    );

    for chain in config.target_chains() {
        match registry::resolve(&registry, &chain) {
            Ok(resolved) => println!(
                "{}: endpoint {} read-lib {} executor {} dvn {}",
                chain,
                resolved.endpoint,
                resolved.read_library,
                display_or(resolved.executor, "-"),
                resolved
                    .read_dvn
                    .as_ref()
                    .and_then(|dvn| dvn.id.clone())
                    .unwrap_or_else(|| "-".to_owned()),
            ),
            Err(e) => println!("{chain}: {e}"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn wired_status(config: &OpsConfig) -> Result<ExitCode> {
    let registry = fresh_registry(config).await?;
    let checker = WiredStatusChecker::builder()
        .registry(registry)
        .ledgers(LedgerSet::new(&config.ledger_dir))
        .connector(Arc::new(AlloyConnector::new(config.clone())))
        .maybe_environment(config.environment)
        .build();
    let report = checker.check().await?;

    for adapter in &report.adapters {
        match &adapter.status {
            WiringStatus::Wired => {
                println!("{}: wired ({})", adapter.chain, adapter.adapter)
            }
            WiringStatus::NeedsWiring { current, expected } => println!(
                "{}: needs wiring: send library {} expected {expected}",
                adapter.chain,
                display_or(*current, "unset"),
            ),
            WiringStatus::Error { message } => {
                println!("{}: error: {message}", adapter.chain)
            }
        }
    }
    println!(
        "wired {} needs-wiring {} errors {}",
        report.wired(),
        report.needs_wiring(),
        report.errors()
    );
    Ok(success_code(report.is_clean()))
}

async fn check_owner(config: &OpsConfig, scope: CheckScope) -> Result<ExitCode> {
    let check = OwnerCheck::builder()
        .ledgers(LedgerSet::new(&config.ledger_dir))
        .connector(Arc::new(AlloyConnector::new(config.clone())))
        .scope(scope)
        .build();
    for status in check.check().await? {
        let marker = match status.signer_is_owner {
            Some(true) => " (signer)",
            _ => "",
        };
        println!(
            "{}: adapter {} owner {}{marker}",
            status.chain, status.adapter, status.owner
        );
    }
    Ok(ExitCode::SUCCESS)
}

async fn transfer_ownership(config: &OpsConfig, scope: TransferScope) -> Result<ExitCode> {
    config.require_private_key()?;
    let final_owner = config.require_final_owner()?;

    let sweeper = OwnershipSweeper::builder()
        .ledgers(LedgerSet::new(&config.ledger_dir))
        .connector(Arc::new(AlloyConnector::new(config.clone())))
        .final_owner(final_owner)
        .scope(scope)
        .build();
    let report = sweeper.sweep().await?;

    for action in &report.actions {
        let target = format!("{} {} {}", action.chain, action.label, action.contract);
        match &action.outcome {
            SweepOutcome::Transferred { gas_limit } => {
                println!("{target}: transferred (gas {gas_limit})")
            }
            SweepOutcome::Skipped { reason } => println!("{target}: skipped: {reason}"),
            SweepOutcome::Failed { reason } => println!("{target}: failed: {reason}"),
        }
    }
    println!(
        "transferred {} skipped {} failed {}",
        report.transferred(),
        report.skipped(),
        report.failed()
    );
    Ok(ExitCode::SUCCESS)
}

fn export_eids(config: &OpsConfig) -> Result<ExitCode> {
    let registry = Registry::load(&config.snapshot_path)?;
    println!("{}", registry::export_eid_map(&registry));
    Ok(ExitCode::SUCCESS)
}

/// Fetches a fresh registry and snapshots it, falling back to the cached
/// snapshot when the fetch fails.
async fn fresh_registry(config: &OpsConfig) -> Result<Registry> {
    match registry::fetch_registry(&config.metadata_url).await {
        Ok(registry) => {
            registry.save(&config.snapshot_path)?;
            Ok(registry)
        }
        Err(e) => {
            warn!(
                error = %e,
                snapshot = %config.snapshot_path.display(),
                event = "registry_fetch_failed"
            );
            Registry::load(&config.snapshot_path)
        }
    }
}

/// Maps explicit `--chains` values to validated keys, or falls back to the
/// configured target set.
fn requested_chains(requested: Option<Vec<String>>, config: &OpsConfig) -> Result<Vec<ChainKey>> {
    let Some(keys) = requested else {
        return Ok(config.target_chains());
    };
    keys.iter()
        .map(|key| {
            let chain = ChainKey::new(key);
            if !TARGET_CHAINS.contains(&chain.as_str()) {
                return Err(OpsError::ChainNotSupported {
                    chain: chain.to_string(),
                });
            }
            Ok(chain)
        })
        .collect()
}

fn display_or(address: Option<Address>, fallback: &str) -> String {
    address
        .map(|address| address.to_string())
        .unwrap_or_else(|| fallback.to_owned())
}

fn success_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
