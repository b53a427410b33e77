//! Data model for the published chain registry
//!
//! The registry endpoint returns one large object keyed by arbitrary slugs
//! (for example `arbsep-testnet`). Those slugs are not stable, so nothing
//! here relies on them: lookups go through the chain keys embedded in the
//! entries themselves.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::chain::ChainKey;
use crate::error::{OpsError, Result};

/// Parsed registry response plus the raw body it came from.
///
/// The raw text is kept so snapshots preserve every field the service
/// returned, including ones this model does not read.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: BTreeMap<String, ChainEntry>,
    raw: String,
}

impl Registry {
    pub fn from_json(text: &str) -> Result<Self> {
        let entries = serde_json::from_str(text)?;
        Ok(Self {
            entries,
            raw: text.to_string(),
        })
    }

    /// Loads a previously saved snapshot.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OpsError::SnapshotNotFound {
                path: path.display().to_string(),
            });
        }
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Writes the snapshot, byte for byte as the service returned it.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, &self.raw)?;
        Ok(())
    }

    /// Finds the entry for a chain by its embedded chain keys.
    pub fn entry(&self, chain: &ChainKey) -> Option<&ChainEntry> {
        self.entries.values().find(|entry| entry.matches(chain))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One chain's registry entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEntry {
    #[serde(default)]
    pub chain_key: Option<String>,
    #[serde(default)]
    pub chain_details: Option<ChainDetails>,
    #[serde(default)]
    pub deployments: Vec<DeploymentEntry>,
    /// Verifier networks available on the chain, keyed by contract address.
    #[serde(default)]
    pub dvns: BTreeMap<String, DvnEntry>,
}

impl ChainEntry {
    /// True when any of the entry's embedded chain keys names this chain.
    pub fn matches(&self, chain: &ChainKey) -> bool {
        let key = chain.as_str();
        let eq = |candidate: &str| candidate.eq_ignore_ascii_case(key);

        self.chain_key.as_deref().is_some_and(eq)
            || self
                .chain_details
                .as_ref()
                .and_then(|details| details.chain_key.as_deref())
                .is_some_and(eq)
            || self
                .deployments
                .iter()
                .any(|deployment| deployment.chain_key.as_deref().is_some_and(eq))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDetails {
    #[serde(default)]
    pub chain_key: Option<String>,
    #[serde(default)]
    pub native_chain_id: Option<u64>,
    #[serde(default)]
    pub chain_status: Option<String>,
}

/// One protocol deployment on a chain. A chain typically carries one entry
/// per protocol version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentEntry {
    #[serde(default)]
    pub eid: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub chain_key: Option<String>,
    #[serde(default)]
    pub endpoint: Option<AddressRef>,
    #[serde(default)]
    pub endpoint_v2: Option<AddressRef>,
    #[serde(default)]
    pub endpoint_v2_view: Option<AddressRef>,
    #[serde(default)]
    pub read_lib_1002: Option<AddressRef>,
    #[serde(default)]
    pub send_uln_302: Option<AddressRef>,
    #[serde(default)]
    pub receive_uln_302: Option<AddressRef>,
    #[serde(default)]
    pub executor: Option<AddressRef>,
}

impl DeploymentEntry {
    pub fn is_mainnet_stage(&self) -> bool {
        self.stage.as_deref() == Some("mainnet")
    }
}

/// A `{ "address": "0x..." }` object as the registry encodes addresses.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressRef {
    #[serde(default)]
    pub address: Option<String>,
}

impl AddressRef {
    /// The address string, if present and non-empty.
    pub fn as_str(&self) -> Option<&str> {
        self.address.as_deref().filter(|address| !address.is_empty())
    }
}

/// A verifier network's registry record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DvnEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub canonical_name: Option<String>,
    #[serde(default)]
    pub lz_read_compatible: Option<bool>,
    #[serde(default)]
    pub deprecated: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
      "arbsep-testnet": {
        "chainKey": "arbitrum-sepolia",
        "chainDetails": { "chainKey": "arbitrum-sepolia", "nativeChainId": 421614 },
        "deployments": [
          {
            "eid": "40231",
            "version": 2,
            "stage": "testnet",
            "chainKey": "arbitrum-sepolia",
            "endpointV2": { "address": "0x6EDCE65403992e310A62460808c4b910D972f10f" },
            "readLib1002": { "address": "0x908E086E0e7D7d4F6e8633D90C587AC2F74f73cD" }
          }
        ]
      },
      "some-slug": {
        "chainDetails": { "chainKey": "base-sepolia" },
        "deployments": [
          { "eid": "40245", "version": 2, "chainKey": "base-sepolia" },
          { "eid": "10245", "version": 1, "chainKey": "base-sepolia" }
        ]
      },
      "inner-only": {
        "deployments": [
          { "eid": "30101", "version": 2, "chainKey": "ethereum" }
        ]
      }
    }"#;

    #[test]
    fn matches_by_top_level_chain_key() {
        let registry = Registry::from_json(SAMPLE).unwrap();
        assert!(registry.entry(&ChainKey::new("arbitrum-sepolia")).is_some());
    }

    #[test]
    fn matches_by_chain_details_key() {
        let registry = Registry::from_json(SAMPLE).unwrap();
        let entry = registry.entry(&ChainKey::new("base-sepolia")).unwrap();
        assert_eq!(entry.deployments.len(), 2);
    }

    #[test]
    fn matches_by_deployment_key() {
        let registry = Registry::from_json(SAMPLE).unwrap();
        assert!(registry.entry(&ChainKey::new("ethereum")).is_some());
    }

    #[test]
    fn unknown_chain_resolves_to_none() {
        let registry = Registry::from_json(SAMPLE).unwrap();
        assert!(registry.entry(&ChainKey::new("neon-testnet")).is_none());
    }

    #[test]
    fn snapshot_round_trip_preserves_raw_body() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");

        let registry = Registry::from_json(SAMPLE).unwrap();
        registry.save(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
        let loaded = Registry::load(&path).unwrap();
        assert_eq!(loaded.len(), registry.len());
    }

    #[test]
    fn missing_snapshot_is_a_dedicated_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        let error = Registry::load(&path).unwrap_err();
        assert!(matches!(error, OpsError::SnapshotNotFound { .. }));
    }
}
