//! Sequential deployment batches
//!
//! Chains deploy one at a time in runbook order with a pacing delay
//! between them. Any chain failure halts the remaining batch: a paused
//! rollout is recoverable by rerunning, a half-provisioned fleet that
//! kept going is not. The wirer and the ownership passes work the
//! opposite way; they repair convergent state and cover as much as they
//! can per run.

use std::sync::Arc;

use bon::Builder;
use tracing::{error, info};

use crate::chain::ChainKey;
use crate::config::OpsConfig;
use crate::deploy::artifact::ArtifactStore;
use crate::deploy::deployer::{ChainDeployer, ChainDeployment};
use crate::ledger::LedgerSet;
use crate::registry::{self, Registry};
use crate::spans;
use crate::traits::{ChainConnector, Clock};

/// Terminal state of one chain in a batch.
#[derive(Debug, Clone)]
pub enum DeployStatus {
    Deployed(ChainDeployment),
    Failed(String),
}

/// One chain's result, in batch order.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub chain: ChainKey,
    pub status: DeployStatus,
}

/// Everything a batch did before finishing or halting.
#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    pub outcomes: Vec<ChainOutcome>,
    /// True when the batch stopped before reaching every requested chain.
    pub halted: bool,
}

impl DeployReport {
    pub fn deployed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, DeployStatus::Deployed(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, DeployStatus::Failed(_)))
            .count()
    }

    pub fn all_succeeded(&self) -> bool {
        !self.halted && self.failed() == 0
    }

    fn fail(&mut self, chain: &ChainKey, reason: String) {
        self.outcomes.push(ChainOutcome {
            chain: chain.clone(),
            status: DeployStatus::Failed(reason),
        });
    }
}

/// Walks a list of chains through the per-chain deployer.
#[derive(Builder, Clone)]
pub struct DeployRunner {
    config: OpsConfig,
    registry: Registry,
    ledgers: LedgerSet,
    artifacts: ArtifactStore,
    connector: Arc<dyn ChainConnector>,
    clock: Arc<dyn Clock>,
}

impl DeployRunner {
    /// Deploys to each chain in order, halting the batch on the first
    /// failure of any kind. The report records how far it got.
    pub async fn run(&self, chains: &[ChainKey]) -> DeployReport {
        let span = spans::deploy_run(self.config.mode(), chains.len());
        let _guard = span.enter();

        let deployer = ChainDeployer::builder()
            .ledgers(self.ledgers.clone())
            .artifacts(self.artifacts.clone())
            .connector(self.connector.clone())
            .build();

        let mut report = DeployReport::default();
        for (index, chain) in chains.iter().enumerate() {
            let resolved = match registry::resolve(&self.registry, chain) {
                Ok(resolved) => resolved,
                Err(e) => {
                    error!(chain = %chain, error = %e, event = "chain_resolution_failed");
                    report.fail(chain, e.to_string());
                    report.halted = true;
                    break;
                }
            };
            let client = match self.connector.connect(chain) {
                Ok(client) => client,
                Err(e) => {
                    error!(chain = %chain, error = %e, event = "chain_connect_failed");
                    report.fail(chain, e.to_string());
                    report.halted = true;
                    break;
                }
            };
            match deployer.deploy_to_chain(client.as_ref(), &resolved).await {
                Ok(Some(deployment)) => {
                    report.outcomes.push(ChainOutcome {
                        chain: chain.clone(),
                        status: DeployStatus::Deployed(deployment),
                    });
                    if index + 1 < chains.len() {
                        self.clock.sleep(self.config.chain_delay).await;
                    }
                }
                Ok(None) => {
                    report.fail(chain, "no usable endpoint".to_owned());
                    report.halted = true;
                    break;
                }
                Err(e) => {
                    spans::record_error(&e);
                    error!(chain = %chain, error = %e, event = "chain_deploy_failed");
                    report.fail(chain, e.to_string());
                    report.halted = true;
                    break;
                }
            }
        }

        info!(
            deployed = report.deployed(),
            failed = report.failed(),
            halted = report.halted,
            event = "deploy_run_complete"
        );
        report
    }
}
