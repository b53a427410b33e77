//! Compiled contract artifact loading
//!
//! Deployments read creation bytecode from compiler artifact files, one
//! JSON file per contract under the artifacts directory. Files carry at
//! least `{"abi": [...], "bytecode": "0x..."}`; only the bytecode is
//! consumed here.

use std::fs;
use std::path::{Path, PathBuf};

use alloy_primitives::{hex, Bytes};
use serde::Deserialize;
use tracing::debug;

use crate::error::{OpsError, Result};

/// Loads creation bytecode from `<dir>/<Name>.json` artifact files.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

#[derive(Deserialize)]
struct Artifact {
    #[serde(default)]
    bytecode: Option<String>,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full creation input for a contract: the artifact's bytecode with the
    /// ABI-encoded constructor arguments appended.
    pub fn creation_code(&self, name: &str, constructor_args: &[u8]) -> Result<Bytes> {
        let path = self.dir.join(format!("{name}.json"));
        let raw = fs::read_to_string(&path).map_err(|e| OpsError::Artifact {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        let artifact: Artifact = serde_json::from_str(&raw).map_err(|e| OpsError::Artifact {
            reason: format!("cannot parse {}: {e}", path.display()),
        })?;
        let bytecode = artifact
            .bytecode
            .map(|code| code.trim().to_owned())
            .filter(|code| !code.is_empty() && code != "0x")
            .ok_or_else(|| OpsError::Artifact {
                reason: format!("{} has no creation bytecode", path.display()),
            })?;
        let mut code = hex::decode(&bytecode).map_err(|e| OpsError::Artifact {
            reason: format!("{} bytecode is not hex: {e}", path.display()),
        })?;
        code.extend_from_slice(constructor_args);

        debug!(
            contract = name,
            bytes = code.len(),
            event = "artifact_loaded"
        );
        Ok(code.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(name: &str, contents: &str) -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(format!("{name}.json")), contents).unwrap();
        let store = ArtifactStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn appends_constructor_args_to_bytecode() {
        let (_dir, store) = store_with("Token", r#"{"abi": [], "bytecode": "0x6080"}"#);
        let code = store.creation_code("Token", &[0xaa, 0xbb]).unwrap();
        assert_eq!(code.as_ref(), &[0x60, 0x80, 0xaa, 0xbb]);
    }

    #[test]
    fn accepts_bytecode_without_hex_prefix() {
        let (_dir, store) = store_with("Token", r#"{"bytecode": "6080"}"#);
        let code = store.creation_code("Token", &[]).unwrap();
        assert_eq!(code.as_ref(), &[0x60, 0x80]);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let error = store.creation_code("Ghost", &[]).unwrap_err();
        assert!(error.to_string().contains("Ghost.json"));
    }

    #[test]
    fn empty_bytecode_is_rejected() {
        let (_dir, store) = store_with("Iface", r#"{"abi": [], "bytecode": "0x"}"#);
        let error = store.creation_code("Iface", &[]).unwrap_err();
        assert!(error.to_string().contains("no creation bytecode"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let (_dir, store) = store_with("Broken", "not json");
        let error = store.creation_code("Broken", &[]).unwrap_err();
        assert!(error.to_string().contains("cannot parse"));
    }
}
