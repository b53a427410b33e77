//! Read-only owner inspection
//!
//! Companion to the sweep: reports who owns each recorded adapter and
//! whether the configured signer is that owner. Nothing here sends a
//! transaction, and "not the owner" is an answer, not a failure.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use bon::Builder;
use tracing::warn;

use crate::chain::{ChainKey, TARGET_CHAINS};
use crate::error::{OpsError, Result};
use crate::ledger::LedgerSet;
use crate::traits::ChainConnector;

/// Which adapters an owner check covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckScope {
    #[default]
    All,
    Chain(ChainKey),
}

impl CheckScope {
    fn includes(&self, chain: &ChainKey) -> bool {
        match self {
            CheckScope::All => true,
            CheckScope::Chain(only) => only == chain,
        }
    }
}

impl fmt::Display for CheckScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckScope::All => f.write_str("all"),
            CheckScope::Chain(chain) => chain.fmt(f),
        }
    }
}

impl FromStr for CheckScope {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self> {
        let chain = ChainKey::new(s);
        if chain.as_str() == "all" {
            return Ok(CheckScope::All);
        }
        if !TARGET_CHAINS.contains(&chain.as_str()) {
            return Err(OpsError::ChainNotSupported {
                chain: chain.to_string(),
            });
        }
        Ok(CheckScope::Chain(chain))
    }
}

/// One adapter's owner, as read from its chain.
#[derive(Debug, Clone)]
pub struct OwnerStatus {
    pub chain: ChainKey,
    pub adapter: Address,
    pub owner: Address,
    /// `None` when no signer is configured to compare against.
    pub signer_is_owner: Option<bool>,
}

/// Reads adapter owners across the ledger.
#[derive(Builder, Clone)]
pub struct OwnerCheck {
    ledgers: LedgerSet,
    connector: Arc<dyn ChainConnector>,
    scope: CheckScope,
}

impl OwnerCheck {
    /// Reads the owner of every in-scope adapter. Chains that cannot be
    /// reached, and owners that cannot be read, are skipped with a
    /// warning rather than failing the pass.
    pub async fn check(&self) -> Result<Vec<OwnerStatus>> {
        let mut statuses = Vec::new();
        for row in self.ledgers.adapters.rows()? {
            if !self.scope.includes(&row.chain) {
                continue;
            }
            let client = match self.connector.connect(&row.chain) {
                Ok(client) => client,
                Err(e) => {
                    warn!(chain = %row.chain, error = %e, event = "chain_unreachable");
                    continue;
                }
            };
            let owner = match client.owner(row.adapter).await {
                Ok(owner) => owner,
                Err(e) => {
                    warn!(
                        chain = %row.chain,
                        adapter = %row.adapter,
                        error = %e,
                        event = "owner_read_failed"
                    );
                    continue;
                }
            };
            statuses.push(OwnerStatus {
                chain: row.chain.clone(),
                adapter: row.adapter,
                owner,
                signer_is_owner: client.signer_address().map(|signer| signer == owner),
            });
        }
        Ok(statuses)
    }
}
