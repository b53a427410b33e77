//! Typed rows for the deployment ledgers

use std::fmt;

use alloy_primitives::Address;

use crate::chain::{ChainKey, Eid};

/// A record type persisted in one of the CSV ledgers.
pub trait LedgerRecord: Sized {
    /// File name under the ledger directory.
    const FILE_NAME: &'static str;

    /// Header line written when the file is first created.
    const HEADER: &'static str;

    fn chain(&self) -> &ChainKey;

    /// Parses one data line, already split on commas.
    ///
    /// `None` marks the row malformed; readers skip it with a warning
    /// instead of failing the whole file.
    fn parse(fields: &[&str]) -> Option<Self>;

    fn to_line(&self) -> String;
}

/// One row of `tix.csv`: the token and its deployer contracts on a chain.
///
/// Early rows were seeded from addresses that predate the deployer split,
/// so everything past the token address is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TixRow {
    pub chain: ChainKey,
    pub eid: Option<Eid>,
    pub token: Address,
    pub service_deployer: Option<Address>,
    pub upgradeable_deployer: Option<Address>,
}

impl LedgerRecord for TixRow {
    const FILE_NAME: &'static str = "tix.csv";
    const HEADER: &'static str = "chain,eid,tix,serviceDeployer,upgradeableDeployer";

    fn chain(&self) -> &ChainKey {
        &self.chain
    }

    fn parse(fields: &[&str]) -> Option<Self> {
        Some(Self {
            chain: ChainKey::new(field(fields, 0)?),
            eid: optional(fields, 1, |raw| raw.parse().ok())?,
            token: field(fields, 2)?.parse().ok()?,
            service_deployer: optional(fields, 3, |raw| raw.parse().ok())?,
            upgradeable_deployer: optional(fields, 4, |raw| raw.parse().ok())?,
        })
    }

    fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.chain,
            display_or_empty(&self.eid),
            self.token,
            display_or_empty(&self.service_deployer),
            display_or_empty(&self.upgradeable_deployer),
        )
    }
}

/// One row of `adapters.csv`: a read adapter deployment on a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRow {
    pub chain: ChainKey,
    pub eid: Eid,
    pub adapter: Address,
}

impl LedgerRecord for AdapterRow {
    const FILE_NAME: &'static str = "adapters.csv";
    const HEADER: &'static str = "chain,eid,adapter";

    fn chain(&self) -> &ChainKey {
        &self.chain
    }

    fn parse(fields: &[&str]) -> Option<Self> {
        Some(Self {
            chain: ChainKey::new(field(fields, 0)?),
            eid: field(fields, 1)?.parse().ok()?,
            adapter: field(fields, 2)?.parse().ok()?,
        })
    }

    fn to_line(&self) -> String {
        format!("{},{},{}", self.chain, self.eid, self.adapter)
    }
}

/// One row of `tokenworkflows.csv`: a workflow contract deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRow {
    pub chain: ChainKey,
    pub eid: Eid,
    pub workflow: Address,
}

impl LedgerRecord for WorkflowRow {
    const FILE_NAME: &'static str = "tokenworkflows.csv";
    const HEADER: &'static str = "chain,eid,tokenWorkflow";

    fn chain(&self) -> &ChainKey {
        &self.chain
    }

    fn parse(fields: &[&str]) -> Option<Self> {
        Some(Self {
            chain: ChainKey::new(field(fields, 0)?),
            eid: field(fields, 1)?.parse().ok()?,
            workflow: field(fields, 2)?.parse().ok()?,
        })
    }

    fn to_line(&self) -> String {
        format!("{},{},{}", self.chain, self.eid, self.workflow)
    }
}

/// Trimmed, non-empty cell at `index`.
fn field<'a>(fields: &[&'a str], index: usize) -> Option<&'a str> {
    fields
        .get(index)
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
}

/// Optional cell: absent or empty is `Some(None)`, present but unparseable
/// poisons the row (`None`).
fn optional<'a, T>(
    fields: &[&'a str],
    index: usize,
    parse: impl FnOnce(&'a str) -> Option<T>,
) -> Option<Option<T>> {
    match field(fields, index) {
        None => Some(None),
        Some(raw) => parse(raw).map(Some),
    }
}

fn display_or_empty<T: fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}
