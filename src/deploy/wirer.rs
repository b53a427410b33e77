//! Cross-chain peer wiring
//!
//! A freshly deployed adapter must learn the adapter addresses on every
//! other chain, and those adapters must learn it, before read requests can
//! route between them. The wirer walks the adapter ledger and reconciles
//! `peers(eid)` on both sides of each pair, never crossing the
//! mainnet/testnet boundary.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, B256};
use bon::Builder;
use tracing::{debug, info, warn};

use crate::chain::{ChainKey, Eid};
use crate::contracts::read_adapter;
use crate::error::Result;
use crate::ledger::{AdapterRow, Ledger};
use crate::spans;
use crate::traits::{ChainClient, ChainConnector};

/// Which side of an adapter pair an action touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerDirection {
    /// The new adapter learning a remote address.
    Forward,
    /// The remote adapter learning the new address.
    Reverse,
}

impl PeerDirection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PeerDirection::Forward => "forward",
            PeerDirection::Reverse => "reverse",
        }
    }
}

impl fmt::Display for PeerDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one side of one adapter pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerOutcome {
    /// `setPeer` was sent and confirmed.
    Applied,
    /// The stored peer already matched; nothing was sent.
    AlreadySet,
    /// The side was not attempted.
    Skipped { reason: String },
    /// The attempt failed; wiring moved on to the next pair.
    Failed { reason: String },
}

/// One side of one pair, with its outcome.
#[derive(Debug, Clone)]
pub struct PeerAction {
    pub remote_chain: ChainKey,
    pub remote_eid: Eid,
    pub direction: PeerDirection,
    pub outcome: PeerOutcome,
}

/// Every action taken while wiring one adapter.
#[derive(Debug, Clone, Default)]
pub struct WireSummary {
    pub actions: Vec<PeerAction>,
}

impl WireSummary {
    pub fn applied(&self) -> usize {
        self.count(|outcome| matches!(outcome, PeerOutcome::Applied))
    }

    pub fn already_set(&self) -> usize {
        self.count(|outcome| matches!(outcome, PeerOutcome::AlreadySet))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, PeerOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, PeerOutcome::Failed { .. }))
    }

    fn count(&self, matcher: impl Fn(&PeerOutcome) -> bool) -> usize {
        self.actions
            .iter()
            .filter(|action| matcher(&action.outcome))
            .count()
    }

    fn record(
        &mut self,
        row: &AdapterRow,
        direction: PeerDirection,
        outcome: PeerOutcome,
    ) {
        self.actions.push(PeerAction {
            remote_chain: row.chain.clone(),
            remote_eid: row.eid,
            direction,
            outcome,
        });
    }
}

/// Wires adapter peers across every chain recorded in the adapter ledger.
#[derive(Builder, Clone)]
pub struct PeerWirer {
    connector: Arc<dyn ChainConnector>,
    adapters: Ledger<AdapterRow>,
}

impl PeerWirer {
    /// Reconciles peers between `adapter`, just deployed on `client`'s
    /// chain under `eid`, and every other adapter on record.
    ///
    /// Per-side failures are logged and recorded, never propagated; the
    /// only hard error here is an unreadable ledger.
    pub async fn wire_peers(
        &self,
        client: &dyn ChainClient,
        adapter: Address,
        eid: Eid,
    ) -> Result<WireSummary> {
        let span = spans::wire_peers(client.chain(), &adapter);
        let _guard = span.enter();

        let environment = client.chain().environment();
        let expected_here = read_adapter::encode_peer(adapter);
        let mut summary = WireSummary::default();

        for row in self.adapters.rows()? {
            if &row.chain == client.chain() || row.adapter == adapter {
                continue;
            }
            if row.chain.environment() != environment {
                for direction in [PeerDirection::Forward, PeerDirection::Reverse] {
                    summary.record(
                        &row,
                        direction,
                        PeerOutcome::Skipped {
                            reason: "crosses the mainnet/testnet boundary".to_owned(),
                        },
                    );
                }
                debug!(
                    remote_chain = %row.chain,
                    event = "peer_pair_skipped"
                );
                continue;
            }

            let forward = self.wire_forward(client, adapter, &row).await;
            summary.record(&row, PeerDirection::Forward, forward);

            let reverse = self.wire_reverse(&row, eid, expected_here).await;
            summary.record(&row, PeerDirection::Reverse, reverse);
        }

        info!(
            wired = summary.applied(),
            already_set = summary.already_set(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            event = "peer_wiring_summary"
        );
        Ok(summary)
    }

    /// Points the new adapter at a remote one.
    async fn wire_forward(
        &self,
        client: &dyn ChainClient,
        adapter: Address,
        row: &AdapterRow,
    ) -> PeerOutcome {
        let span = spans::set_peer(&row.chain, row.eid.as_u32(), PeerDirection::Forward.as_str());
        let _guard = span.enter();

        let expected = read_adapter::encode_peer(row.adapter);
        match client.peer(adapter, row.eid.as_u32()).await {
            Ok(current) if current == expected => {
                debug!(remote_chain = %row.chain, event = "peer_already_set");
                return PeerOutcome::AlreadySet;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    remote_chain = %row.chain,
                    error = %e,
                    event = "peer_read_failed"
                );
                return PeerOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        }

        match client.set_peer(adapter, row.eid.as_u32(), expected).await {
            Ok(()) => {
                info!(
                    remote_chain = %row.chain,
                    remote_eid = row.eid.as_u32(),
                    event = "peer_applied"
                );
                PeerOutcome::Applied
            }
            Err(e) => {
                warn!(
                    remote_chain = %row.chain,
                    error = %e,
                    event = "peer_set_failed"
                );
                PeerOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Points a remote adapter back at the new one. Most reverse failures
    /// mean the signer no longer owns the remote adapter; they are
    /// reported, not fatal.
    async fn wire_reverse(&self, row: &AdapterRow, eid: Eid, expected: B256) -> PeerOutcome {
        let span = spans::set_peer(&row.chain, eid.as_u32(), PeerDirection::Reverse.as_str());
        let _guard = span.enter();

        if !self.connector.can_transact(&row.chain) {
            debug!(remote_chain = %row.chain, event = "reverse_peer_skipped");
            return PeerOutcome::Skipped {
                reason: format!("no transaction credentials for {}", row.chain),
            };
        }
        let remote = match self.connector.connect(&row.chain) {
            Ok(remote) => remote,
            Err(e) => {
                warn!(
                    remote_chain = %row.chain,
                    error = %e,
                    event = "reverse_connect_failed"
                );
                return PeerOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match remote.peer(row.adapter, eid.as_u32()).await {
            Ok(current) if current == expected => {
                debug!(remote_chain = %row.chain, event = "peer_already_set");
                return PeerOutcome::AlreadySet;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    remote_chain = %row.chain,
                    error = %e,
                    event = "peer_read_failed"
                );
                return PeerOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        }

        match remote.set_peer(row.adapter, eid.as_u32(), expected).await {
            Ok(()) => {
                info!(
                    remote_chain = %row.chain,
                    event = "peer_applied"
                );
                PeerOutcome::Applied
            }
            Err(e) => {
                warn!(
                    remote_chain = %row.chain,
                    error = %e,
                    event = "reverse_peer_failed"
                );
                PeerOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
