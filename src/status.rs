//! Wiring status inspection
//!
//! Read-only CI gate over the adapter ledger. For every recorded adapter,
//! the chain's endpoint is asked which send library serves the adapter,
//! and the answer is compared against the read library the registry says
//! it should be. Nothing here sends a transaction.

use std::sync::Arc;

use alloy_primitives::Address;
use bon::Builder;
use tracing::{debug, info, warn};

use crate::chain::{ChainKey, Eid, Environment};
use crate::error::Result;
use crate::ledger::{AdapterRow, LedgerSet};
use crate::registry::{self, Registry};
use crate::spans;
use crate::traits::ChainConnector;

/// Wiring state of one adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WiringStatus {
    /// The endpoint already routes through the expected read library.
    Wired,
    /// A wiring transaction is still required. `current` is `None` when
    /// the endpoint has no library configured at all.
    NeedsWiring {
        current: Option<Address>,
        expected: Address,
    },
    /// The check itself could not complete.
    Error { message: String },
}

/// One adapter's wiring state.
#[derive(Debug, Clone)]
pub struct AdapterStatus {
    pub chain: ChainKey,
    pub adapter: Address,
    pub eid: Eid,
    pub status: WiringStatus,
}

/// Wiring state of every checked adapter.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub adapters: Vec<AdapterStatus>,
}

impl StatusReport {
    pub fn wired(&self) -> usize {
        self.count(|status| matches!(status, WiringStatus::Wired))
    }

    pub fn needs_wiring(&self) -> usize {
        self.count(|status| matches!(status, WiringStatus::NeedsWiring { .. }))
    }

    pub fn errors(&self) -> usize {
        self.count(|status| matches!(status, WiringStatus::Error { .. }))
    }

    /// True when a CI gate can pass: everything wired, nothing unknown.
    pub fn is_clean(&self) -> bool {
        self.needs_wiring() == 0 && self.errors() == 0
    }

    fn count(&self, matcher: impl Fn(&WiringStatus) -> bool) -> usize {
        self.adapters
            .iter()
            .filter(|adapter| matcher(&adapter.status))
            .count()
    }
}

/// Checks recorded adapters against their expected read libraries.
#[derive(Builder, Clone)]
pub struct WiredStatusChecker {
    registry: Registry,
    ledgers: LedgerSet,
    connector: Arc<dyn ChainConnector>,
    /// Narrows the pass to one environment. `None` checks everything.
    environment: Option<Environment>,
}

impl WiredStatusChecker {
    /// Walks the adapter ledger and reports per-adapter wiring state.
    ///
    /// Per-adapter problems, RPC failures included, land in the report as
    /// [`WiringStatus::Error`] rather than aborting the pass; the hard
    /// error here is an unreadable ledger.
    pub async fn check(&self) -> Result<StatusReport> {
        let rows: Vec<AdapterRow> = self
            .ledgers
            .adapters
            .rows()?
            .into_iter()
            .filter(|row| {
                self.environment
                    .is_none_or(|env| row.chain.environment() == env)
            })
            .collect();

        let span = spans::wired_status(rows.len());
        let _guard = span.enter();

        let mut report = StatusReport::default();
        for row in rows {
            let status = self.check_adapter(&row).await;
            match &status {
                WiringStatus::Wired => {
                    debug!(chain = %row.chain, event = "adapter_wired");
                }
                WiringStatus::NeedsWiring { expected, .. } => {
                    warn!(
                        chain = %row.chain,
                        expected = %expected,
                        event = "adapter_needs_wiring"
                    );
                }
                WiringStatus::Error { message } => {
                    warn!(chain = %row.chain, message, event = "adapter_check_failed");
                }
            }
            report.adapters.push(AdapterStatus {
                chain: row.chain.clone(),
                adapter: row.adapter,
                eid: row.eid,
                status,
            });
        }

        info!(
            wired = report.wired(),
            needs_wiring = report.needs_wiring(),
            errors = report.errors(),
            event = "wired_status_complete"
        );
        Ok(report)
    }

    async fn check_adapter(&self, row: &AdapterRow) -> WiringStatus {
        let span = spans::check_adapter(&row.chain, &row.adapter);
        let _guard = span.enter();

        let resolved = match registry::resolve(&self.registry, &row.chain) {
            Ok(resolved) => resolved,
            Err(e) => return error_status(e.to_string()),
        };
        let client = match self.connector.connect(&row.chain) {
            Ok(client) => client,
            Err(e) => return error_status(e.to_string()),
        };

        match client.has_code(resolved.endpoint).await {
            Ok(true) => {}
            Ok(false) => {
                return error_status(format!(
                    "Endpoint contract not found at {}",
                    resolved.endpoint
                ))
            }
            Err(e) => return error_status(e.to_string()),
        }
        match client.has_code(row.adapter).await {
            Ok(true) => {}
            Ok(false) => {
                return error_status(format!("Adapter contract not found at {}", row.adapter))
            }
            Err(e) => return error_status(e.to_string()),
        }

        match client
            .send_library(resolved.endpoint, row.adapter, row.eid.as_u32())
            .await
        {
            Ok(Some(library)) if library == resolved.read_library => WiringStatus::Wired,
            Ok(current) => WiringStatus::NeedsWiring {
                current,
                expected: resolved.read_library,
            },
            Err(e) => error_status(e.to_string()),
        }
    }
}

fn error_status(message: String) -> WiringStatus {
    WiringStatus::Error { message }
}
