//! Token workflow deployment
//!
//! `TokenWorkflow` is a standalone contract driven directly by consumer
//! services; it takes no constructor wiring and lives outside the
//! token/adapter dependency chain. Batches here have the same shape as
//! the main deployer: idempotent per chain, sequential, halt on the
//! first failure.

use std::sync::Arc;

use alloy_primitives::Address;
use bon::Builder;
use tracing::{error, info, warn};

use crate::chain::{ChainKey, Eid};
use crate::config::OpsConfig;
use crate::deploy::artifact::ArtifactStore;
use crate::error::Result;
use crate::ledger::{LedgerSet, WorkflowRow};
use crate::registry::{self, Registry};
use crate::spans;
use crate::traits::{ChainClient, ChainConnector, Clock};

/// Chains a workflow batch covers when none are requested explicitly.
pub const DEFAULT_WORKFLOW_CHAINS: &[&str] =
    &["arbitrum-sepolia", "optimism-sepolia", "base-sepolia"];

/// Terminal state of one chain in a workflow batch.
#[derive(Debug, Clone)]
pub enum WorkflowStatus {
    Deployed { workflow: Address },
    Reused { workflow: Address },
    Failed(String),
}

/// One chain's result, in batch order.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub chain: ChainKey,
    pub status: WorkflowStatus,
}

/// Everything a workflow batch did before finishing or halting.
#[derive(Debug, Clone, Default)]
pub struct WorkflowReport {
    pub outcomes: Vec<WorkflowOutcome>,
    pub halted: bool,
}

impl WorkflowReport {
    pub fn deployed(&self) -> usize {
        self.count(|status| matches!(status, WorkflowStatus::Deployed { .. }))
    }

    pub fn reused(&self) -> usize {
        self.count(|status| matches!(status, WorkflowStatus::Reused { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, WorkflowStatus::Failed(_)))
    }

    pub fn all_succeeded(&self) -> bool {
        !self.halted && self.failed() == 0
    }

    fn count(&self, matcher: impl Fn(&WorkflowStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matcher(&outcome.status))
            .count()
    }

    fn fail(&mut self, chain: &ChainKey, reason: String) {
        self.outcomes.push(WorkflowOutcome {
            chain: chain.clone(),
            status: WorkflowStatus::Failed(reason),
        });
    }
}

/// Deploys the `TokenWorkflow` contract across chains.
#[derive(Builder, Clone)]
pub struct WorkflowDeployer {
    config: OpsConfig,
    registry: Registry,
    ledgers: LedgerSet,
    artifacts: ArtifactStore,
    connector: Arc<dyn ChainConnector>,
    clock: Arc<dyn Clock>,
}

impl WorkflowDeployer {
    /// Deploys to each chain in order, halting on the first failure.
    pub async fn run(&self, chains: &[ChainKey]) -> WorkflowReport {
        let span = spans::deploy_workflows(chains.len());
        let _guard = span.enter();

        let mut report = WorkflowReport::default();
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
            match self
                .ensure_workflow(client.as_ref(), chain, resolved.eid)
                .await
            {
                Ok((workflow, reused)) => {
                    let status = if reused {
                        WorkflowStatus::Reused { workflow }
                    } else {
                        WorkflowStatus::Deployed { workflow }
                    };
                    report.outcomes.push(WorkflowOutcome {
                        chain: chain.clone(),
                        status,
                    });
                    if index + 1 < chains.len() {
                        self.clock.sleep(self.config.chain_delay).await;
                    }
                }
                Err(e) => {
                    spans::record_error(&e);
                    error!(chain = %chain, error = %e, event = "workflow_deploy_failed");
                    report.fail(chain, e.to_string());
                    report.halted = true;
                    break;
                }
            }
        }

        info!(
            deployed = report.deployed(),
            reused = report.reused(),
            failed = report.failed(),
            halted = report.halted,
            event = "workflow_run_complete"
        );
        report
    }

    /// Reuses the recorded workflow when it still has code, otherwise
    /// deploys a fresh one and records it.
    async fn ensure_workflow(
        &self,
        client: &dyn ChainClient,
        chain: &ChainKey,
        eid: Eid,
    ) -> Result<(Address, bool)> {
        if let Some(row) = self.ledgers.workflows.latest(chain)? {
            if client.has_code(row.workflow).await? {
                info!(workflow = %row.workflow, event = "workflow_reused");
                return Ok((row.workflow, true));
            }
            warn!(workflow = %row.workflow, event = "recorded_workflow_has_no_code");
        }

        let span = spans::deploy_contract("TokenWorkflow", chain);
        let _guard = span.enter();

        let code = self.artifacts.creation_code("TokenWorkflow", &[])?;
        let workflow = client.deploy_contract(code).await?;
        info!(
            contract = "TokenWorkflow",
            address = %workflow,
            event = "contract_deployed"
        );
        self.ledgers.workflows.append(&WorkflowRow {
            chain: chain.clone(),
            eid,
            workflow,
        })?;
        Ok((workflow, false))
    }
}
