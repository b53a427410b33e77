//! Append-only CSV ledgers recording what is deployed where
//!
//! The ledgers are the source of truth for every deployed contract address.
//! They are never edited in place: each deployment appends a row, and
//! readers resolve the current address for a chain by taking the last
//! matching row. A row that fails to parse is skipped with a warning so one
//! bad line cannot wedge a whole batch.

mod rows;

pub use rows::{AdapterRow, LedgerRecord, TixRow, WorkflowRow};

use std::fs;
use std::io::Write as _;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::chain::ChainKey;
use crate::error::{OpsError, Result};

/// One append-only CSV file holding records of type `R`.
#[derive(Debug, Clone)]
pub struct Ledger<R: LedgerRecord> {
    path: PathBuf,
    _record: PhantomData<R>,
}

impl<R: LedgerRecord> Ledger<R> {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(R::FILE_NAME),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All parseable rows, oldest first. A missing file reads as empty.
    pub fn rows(&self) -> Result<Vec<R>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| self.io_error("read", &e))?;

        let mut rows = Vec::new();
        // Line 1 is the header, skipped unconditionally.
        for (index, line) in content.lines().enumerate().skip(1) {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            match R::parse(&fields) {
                Some(row) => rows.push(row),
                None => warn!(
                    file = %self.path.display(),
                    line = index + 1,
                    content = line,
                    event = "malformed_ledger_row_skipped"
                ),
            }
        }
        Ok(rows)
    }

    /// Last recorded row for a chain, or `None` when the chain has none.
    pub fn latest(&self, chain: &ChainKey) -> Result<Option<R>> {
        Ok(self
            .rows()?
            .into_iter()
            .rev()
            .find(|row| row.chain() == chain))
    }

    /// Appends one row, creating the file (and its directory) with the
    /// header line on first write.
    pub fn append(&self, row: &R) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error("create directory for", &e))?;
        }
        let is_new = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error("open", &e))?;
        if is_new {
            writeln!(file, "{}", R::HEADER).map_err(|e| self.io_error("write header to", &e))?;
        }
        writeln!(file, "{}", row.to_line()).map_err(|e| self.io_error("append to", &e))?;
        Ok(())
    }

    fn io_error(&self, action: &str, error: &std::io::Error) -> OpsError {
        OpsError::Ledger {
            reason: format!("{action} {}: {error}", self.path.display()),
        }
    }
}

/// The three ledgers a deployment run touches, rooted in one directory.
#[derive(Debug, Clone)]
pub struct LedgerSet {
    pub tix: Ledger<TixRow>,
    pub adapters: Ledger<AdapterRow>,
    pub workflows: Ledger<WorkflowRow>,
}

impl LedgerSet {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            tix: Ledger::new(dir),
            adapters: Ledger::new(dir),
            workflows: Ledger::new(dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Eid;
    use alloy_primitives::Address;
    use tempfile::TempDir;

    fn adapter_row(chain: &str, eid: u32, byte: u8) -> AdapterRow {
        AdapterRow {
            chain: ChainKey::new(chain),
            eid: Eid::new(eid),
            adapter: Address::repeat_byte(byte),
        }
    }

    #[test]
    fn append_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let ledger: Ledger<AdapterRow> = Ledger::new(dir.path());

        ledger.append(&adapter_row("base-sepolia", 40245, 0x11)).unwrap();
        ledger.append(&adapter_row("arbitrum-sepolia", 40231, 0x22)).unwrap();

        let content = fs::read_to_string(ledger.path()).unwrap();
        insta::assert_snapshot!(content, @r###"
        chain,eid,adapter
        base-sepolia,40245,0x1111111111111111111111111111111111111111
        arbitrum-sepolia,40231,0x2222222222222222222222222222222222222222
        "###);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let ledger: Ledger<AdapterRow> = Ledger::new(dir.path());

        assert!(ledger.rows().unwrap().is_empty());
        assert!(ledger.latest(&ChainKey::new("base-sepolia")).unwrap().is_none());
    }

    #[test]
    fn latest_takes_the_last_matching_row() {
        let dir = TempDir::new().unwrap();
        let ledger: Ledger<AdapterRow> = Ledger::new(dir.path());

        ledger.append(&adapter_row("base-sepolia", 40245, 0x11)).unwrap();
        ledger.append(&adapter_row("arbitrum-sepolia", 40231, 0x22)).unwrap();
        ledger.append(&adapter_row("base-sepolia", 40245, 0x33)).unwrap();

        let latest = ledger.latest(&ChainKey::new("base-sepolia")).unwrap().unwrap();
        assert_eq!(latest.adapter, Address::repeat_byte(0x33));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        let ledger: Ledger<AdapterRow> = Ledger::new(dir.path());
        fs::write(
            ledger.path(),
            "chain,eid,adapter\n\
             base-sepolia,40245,0x1111111111111111111111111111111111111111\n\
             not-a-row\n\
             arbitrum-sepolia,,0x2222222222222222222222222222222222222222\n\
             arbitrum-sepolia,40231,0x2222222222222222222222222222222222222222\n",
        )
        .unwrap();

        let rows = ledger.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].chain, ChainKey::new("arbitrum-sepolia"));
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let dir = TempDir::new().unwrap();
        let ledger: Ledger<AdapterRow> = Ledger::new(dir.path());
        fs::write(
            ledger.path(),
            "chain,eid,adapter\r\nbase-sepolia,40245,0x1111111111111111111111111111111111111111\r\n",
        )
        .unwrap();

        let rows = ledger.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].eid, Eid::new(40245));
    }

    #[test]
    fn chain_lookup_ignores_key_casing() {
        let dir = TempDir::new().unwrap();
        let ledger: Ledger<AdapterRow> = Ledger::new(dir.path());
        fs::write(
            ledger.path(),
            "chain,eid,adapter\nBase-Sepolia,40245,0x1111111111111111111111111111111111111111\n",
        )
        .unwrap();

        let latest = ledger.latest(&ChainKey::new("base-sepolia")).unwrap();
        assert!(latest.is_some());
    }

    #[test]
    fn tix_rows_round_trip_with_optional_cells() {
        let dir = TempDir::new().unwrap();
        let ledger: Ledger<TixRow> = Ledger::new(dir.path());
        let row = TixRow {
            chain: ChainKey::new("polygon"),
            eid: None,
            token: Address::repeat_byte(0x44),
            service_deployer: None,
            upgradeable_deployer: Some(Address::repeat_byte(0x55)),
        };

        ledger.append(&row).unwrap();
        let read_back = ledger.latest(&ChainKey::new("polygon")).unwrap().unwrap();
        assert_eq!(read_back, row);
    }

    #[test]
    fn ledger_set_shares_the_directory() {
        let dir = TempDir::new().unwrap();
        let set = LedgerSet::new(dir.path());

        assert!(set.tix.path().ends_with("tix.csv"));
        assert!(set.adapters.path().ends_with("adapters.csv"));
        assert!(set.workflows.path().ends_with("tokenworkflows.csv"));
    }

    #[test]
    fn creates_ledger_directory_on_first_append() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deployments");
        let ledger: Ledger<AdapterRow> = Ledger::new(&nested);

        ledger.append(&adapter_row("fuji", 40106, 0x66)).unwrap();
        assert!(nested.join("adapters.csv").exists());
    }
}
