//! Ownership transfer sweeps
//!
//! Deployments initially belong to the deploy key. Before that key is
//! retired, everything it owns moves to a designated final owner, usually
//! a multisig. The sweeper walks the ledgers and issues
//! `transferOwnership` wherever the signer still owns a live contract,
//! skipping every other state. Unlike a deploy batch, a sweep covers as
//! much as it can per run; a failed transfer on one chain never stops the
//! next one.

mod check;

pub use check::{CheckScope, OwnerCheck, OwnerStatus};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use bon::Builder;
use tracing::{debug, info, warn};

use crate::chain::ChainKey;
use crate::error::{OpsError, Result};
use crate::ledger::LedgerSet;
use crate::spans;
use crate::traits::{ChainClient, ChainConnector};

/// Headroom applied to gas estimates before sending.
const GAS_HEADROOM_NUMERATOR: u64 = 12;
const GAS_HEADROOM_DENOMINATOR: u64 = 10;

/// Gas ceiling used when estimation itself is rejected.
const GAS_FALLBACK: u64 = 200_000;

/// Which ledger addresses a sweep touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferScope {
    #[default]
    All,
    Tix,
    Adapters,
}

impl TransferScope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransferScope::All => "all",
            TransferScope::Tix => "tix",
            TransferScope::Adapters => "adapters",
        }
    }

    fn covers_tix(&self) -> bool {
        matches!(self, TransferScope::All | TransferScope::Tix)
    }

    fn covers_adapters(&self) -> bool {
        matches!(self, TransferScope::All | TransferScope::Adapters)
    }
}

impl fmt::Display for TransferScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferScope {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TransferScope::All),
            "tix" => Ok(TransferScope::Tix),
            "adapters" => Ok(TransferScope::Adapters),
            other => Err(OpsError::InvalidConfig(format!(
                "unknown transfer scope {other:?}, expected all, tix or adapters"
            ))),
        }
    }
}

/// Why a contract was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ZeroAddress,
    NoCode,
    AlreadyFinal,
    NotOwner,
    TransferPending,
    Unreachable,
}

impl SkipReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SkipReason::ZeroAddress => "zero address",
            SkipReason::NoCode => "no code at address",
            SkipReason::AlreadyFinal => "already owned by the final owner",
            SkipReason::NotOwner => "signer is not the owner",
            SkipReason::TransferPending => "two-step transfer already pending",
            SkipReason::Unreachable => "chain unreachable",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    Transferred { gas_limit: u64 },
    Skipped { reason: SkipReason },
    Failed { reason: String },
}

/// One swept contract, labelled by its role in the ledger.
#[derive(Debug, Clone)]
pub struct SweepAction {
    pub chain: ChainKey,
    pub label: &'static str,
    pub contract: Address,
    pub outcome: SweepOutcome,
}

/// Every contract a sweep visited, in ledger order.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub actions: Vec<SweepAction>,
}

impl SweepReport {
    pub fn transferred(&self) -> usize {
        self.count(|outcome| matches!(outcome, SweepOutcome::Transferred { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, SweepOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, SweepOutcome::Failed { .. }))
    }

    fn count(&self, matcher: impl Fn(&SweepOutcome) -> bool) -> usize {
        self.actions
            .iter()
            .filter(|action| matcher(&action.outcome))
            .count()
    }

    fn record(
        &mut self,
        chain: &ChainKey,
        label: &'static str,
        contract: Address,
        outcome: SweepOutcome,
    ) {
        self.actions.push(SweepAction {
            chain: chain.clone(),
            label,
            contract,
            outcome,
        });
    }
}

/// Moves ledger-recorded contracts to the final owner.
#[derive(Builder, Clone)]
pub struct OwnershipSweeper {
    ledgers: LedgerSet,
    connector: Arc<dyn ChainConnector>,
    final_owner: Address,
    scope: TransferScope,
}

impl OwnershipSweeper {
    /// Sweeps every in-scope contract, continuing past failures.
    pub async fn sweep(&self) -> Result<SweepReport> {
        let span = spans::sweep_ownership(self.scope.as_str(), &self.final_owner);
        let _guard = span.enter();

        let mut report = SweepReport::default();

        if self.scope.covers_tix() {
            for row in self.ledgers.tix.rows()? {
                let mut targets: Vec<(&'static str, Address)> = vec![("TixToken", row.token)];
                if let Some(address) = row.service_deployer {
                    targets.push(("ServiceDeployer", address));
                }
                if let Some(address) = row.upgradeable_deployer {
                    targets.push(("UpgradeableServiceDeployer", address));
                }
                self.sweep_chain(&row.chain, &targets, &mut report).await;
            }
        }
        if self.scope.covers_adapters() {
            for row in self.ledgers.adapters.rows()? {
                self.sweep_chain(&row.chain, &[("Adapter", row.adapter)], &mut report)
                    .await;
            }
        }

        info!(
            transferred = report.transferred(),
            skipped = report.skipped(),
            failed = report.failed(),
            event = "ownership_sweep_complete"
        );
        Ok(report)
    }

    async fn sweep_chain(
        &self,
        chain: &ChainKey,
        targets: &[(&'static str, Address)],
        report: &mut SweepReport,
    ) {
        let client = match self.connector.connect(chain) {
            Ok(client) => client,
            Err(e) => {
                warn!(chain = %chain, error = %e, event = "chain_unreachable");
                for &(label, contract) in targets {
                    report.record(
                        chain,
                        label,
                        contract,
                        SweepOutcome::Skipped {
                            reason: SkipReason::Unreachable,
                        },
                    );
                }
                return;
            }
        };
        for &(label, contract) in targets {
            let outcome = self
                .transfer_one(client.as_ref(), chain, label, contract)
                .await;
            report.record(chain, label, contract, outcome);
        }
    }

    /// Classifies one contract and transfers it when, and only when, the
    /// signer owns it outright with no transfer pending.
    async fn transfer_one(
        &self,
        client: &dyn ChainClient,
        chain: &ChainKey,
        label: &'static str,
        contract: Address,
    ) -> SweepOutcome {
        let span = spans::transfer_ownership(label, &contract, chain);
        let _guard = span.enter();

        if contract == Address::ZERO {
            debug!(event = "skipped_zero_address");
            return SweepOutcome::Skipped {
                reason: SkipReason::ZeroAddress,
            };
        }
        match client.has_code(contract).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(event = "skipped_no_code");
                return SweepOutcome::Skipped {
                    reason: SkipReason::NoCode,
                };
            }
            Err(e) => {
                warn!(error = %e, event = "code_check_failed");
                return SweepOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        }

        let owner = match client.owner(contract).await {
            Ok(owner) => owner,
            Err(e) => {
                warn!(error = %e, event = "owner_read_failed");
                return SweepOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };
        if owner == self.final_owner {
            debug!(event = "skipped_already_final");
            return SweepOutcome::Skipped {
                reason: SkipReason::AlreadyFinal,
            };
        }
        let Some(signer) = client.signer_address() else {
            warn!(event = "no_signer_configured");
            return SweepOutcome::Failed {
                reason: "no signer configured".to_owned(),
            };
        };
        if owner != signer {
            debug!(owner = %owner, event = "skipped_not_owner");
            return SweepOutcome::Skipped {
                reason: SkipReason::NotOwner,
            };
        }
        if let Some(pending) = client.pending_owner(contract).await {
            debug!(pending = %pending, event = "skipped_pending_transfer");
            return SweepOutcome::Skipped {
                reason: SkipReason::TransferPending,
            };
        }

        let gas_limit = match client
            .estimate_transfer_ownership(contract, self.final_owner)
            .await
        {
            Ok(estimate) => estimate * GAS_HEADROOM_NUMERATOR / GAS_HEADROOM_DENOMINATOR,
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = GAS_FALLBACK,
                    event = "gas_estimation_failed"
                );
                GAS_FALLBACK
            }
        };
        match client
            .transfer_ownership(contract, self.final_owner, gas_limit)
            .await
        {
            Ok(()) => {
                info!(
                    new_owner = %self.final_owner,
                    gas_limit,
                    event = "ownership_transferred"
                );
                SweepOutcome::Transferred { gas_limit }
            }
            Err(e) => {
                let reason = e.to_string();
                if reason.to_ascii_lowercase().contains("insufficient funds") {
                    warn!(chain = %chain, event = "insufficient_funds");
                } else {
                    warn!(error = %reason, event = "transfer_failed");
                }
                SweepOutcome::Failed { reason }
            }
        }
    }
}
