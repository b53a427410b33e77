// SPDX-FileCopyrightText: 2026 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration for deployment commands
//!
//! All ambient state (signer key, API keys, RPC overrides, environment
//! selection) is read once into an [`OpsConfig`] and passed explicitly from
//! there, so drivers never consult the process environment themselves and
//! tests can build configurations directly.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use alloy_primitives::Address;
use bon::Builder;
use url::Url;

use crate::chain::{ChainKey, Environment, TARGET_CHAINS};
use crate::error::{OpsError, Result};

/// Published LayerZero deployment registry.
pub const DEFAULT_METADATA_URL: &str =
    "https://metadata.layerzero-api.com/v1/metadata/deployments";

/// Directory holding the append-only CSV ledgers.
pub const DEFAULT_LEDGER_DIR: &str = "deployments";

/// Directory holding compiled contract artifacts.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Local registry snapshot consumed by the offline commands.
pub const DEFAULT_SNAPSHOT_FILE: &str = "metadata.json";

/// Pause between chains in a batch, to stay friendly to public RPCs.
pub const DEFAULT_CHAIN_DELAY_MS: u64 = 1000;

const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";
const ALCHEMY_API_KEY_VAR: &str = "ALCHEMY_API_KEY";
const FINAL_OWNER_VAR: &str = "FINAL_OWNER";
const ENVIRONMENT_VAR: &str = "TIX_ENVIRONMENT";
const METADATA_URL_VAR: &str = "LZ_METADATA_URL";

/// Resolved configuration for a command invocation.
#[derive(Builder, Clone)]
pub struct OpsConfig {
    #[builder(into, default = PathBuf::from(DEFAULT_LEDGER_DIR))]
    pub ledger_dir: PathBuf,

    #[builder(into, default = PathBuf::from(DEFAULT_ARTIFACTS_DIR))]
    pub artifacts_dir: PathBuf,

    #[builder(into, default = PathBuf::from(DEFAULT_SNAPSHOT_FILE))]
    pub snapshot_path: PathBuf,

    #[builder(default = Url::parse(DEFAULT_METADATA_URL).unwrap())]
    pub metadata_url: Url,

    /// Raw hex signer key. Absent for read-only invocations.
    pub private_key: Option<String>,

    pub alchemy_api_key: Option<String>,

    /// Multisig or EOA that ends up owning everything after a sweep.
    pub final_owner: Option<Address>,

    /// Narrows batch commands to one environment. `None` means both.
    pub environment: Option<Environment>,

    #[builder(default = Duration::from_millis(DEFAULT_CHAIN_DELAY_MS))]
    pub chain_delay: Duration,

    /// Per-chain RPC URLs taken from `<CHAIN_KEY>_RPC_URL` variables.
    #[builder(default)]
    pub rpc_overrides: HashMap<ChainKey, Url>,
}

impl OpsConfig {
    /// Reads configuration from the process environment.
    ///
    /// Call after `dotenvy::dotenv()` so a local `.env` file is honored.
    /// Malformed values fail here rather than partway through a batch.
    pub fn from_env() -> Result<Self> {
        let private_key = non_empty_var(PRIVATE_KEY_VAR);
        let alchemy_api_key = non_empty_var(ALCHEMY_API_KEY_VAR);

        let final_owner = match non_empty_var(FINAL_OWNER_VAR) {
            Some(raw) => Some(raw.parse::<Address>().map_err(|e| {
                OpsError::InvalidConfig(format!("{FINAL_OWNER_VAR} is not a valid address: {e}"))
            })?),
            None => None,
        };

        let environment = match non_empty_var(ENVIRONMENT_VAR) {
            Some(raw) if raw.eq_ignore_ascii_case("all") => None,
            Some(raw) => Some(raw.parse::<Environment>()?),
            None => None,
        };

        let metadata_url = match non_empty_var(METADATA_URL_VAR) {
            Some(raw) => Url::parse(&raw)?,
            None => Url::parse(DEFAULT_METADATA_URL)?,
        };

        let mut rpc_overrides = HashMap::new();
        for key in TARGET_CHAINS {
            let chain = ChainKey::new(key);
            let var = chain.rpc_env_var();
            if let Some(raw) = non_empty_var(&var) {
                let url = Url::parse(&raw).map_err(|e| {
                    OpsError::InvalidConfig(format!("{var} is not a valid URL: {e}"))
                })?;
                rpc_overrides.insert(chain, url);
            }
        }

        Ok(Self {
            ledger_dir: PathBuf::from(DEFAULT_LEDGER_DIR),
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            metadata_url,
            private_key,
            alchemy_api_key,
            final_owner,
            environment,
            chain_delay: Duration::from_millis(DEFAULT_CHAIN_DELAY_MS),
            rpc_overrides,
        })
    }

    /// Resolves the RPC URL for a chain.
    ///
    /// Priority: explicit `<CHAIN_KEY>_RPC_URL` override, then Alchemy when
    /// an API key is configured and Alchemy serves the chain, then the
    /// public fallback endpoint. `None` when the chain has none of these.
    pub fn rpc_url(&self, chain: &ChainKey) -> Option<Url> {
        if let Some(url) = self.rpc_overrides.get(chain) {
            return Some(url.clone());
        }
        if let (Some(key), Some(subdomain)) =
            (self.alchemy_api_key.as_deref(), chain.alchemy_subdomain())
        {
            let raw = format!("https://{subdomain}.g.alchemy.com/v2/{key}");
            if let Ok(url) = Url::parse(&raw) {
                return Some(url);
            }
        }
        chain
            .default_rpc_url()
            .and_then(|raw| Url::parse(raw).ok())
    }

    /// Deploy targets narrowed by the configured environment.
    pub fn target_chains(&self) -> Vec<ChainKey> {
        crate::chain::target_chains(self.environment)
    }

    /// Human-readable environment selector, for logs and span attributes.
    pub fn mode(&self) -> &'static str {
        match self.environment {
            Some(Environment::Mainnet) => "mainnet",
            Some(Environment::Testnet) => "testnet",
            None => "all",
        }
    }

    pub fn require_private_key(&self) -> Result<&str> {
        self.private_key
            .as_deref()
            .ok_or(OpsError::MissingEnv {
                name: PRIVATE_KEY_VAR,
            })
    }

    pub fn require_final_owner(&self) -> Result<Address> {
        self.final_owner.ok_or(OpsError::MissingEnv {
            name: FINAL_OWNER_VAR,
        })
    }
}

impl fmt::Debug for OpsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpsConfig")
            .field("ledger_dir", &self.ledger_dir)
            .field("artifacts_dir", &self.artifacts_dir)
            .field("snapshot_path", &self.snapshot_path)
            .field("metadata_url", &self.metadata_url.as_str())
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("alchemy_api_key", &self.alchemy_api_key.as_ref().map(|_| "<redacted>"))
            .field("final_owner", &self.final_owner)
            .field("environment", &self.environment)
            .field("chain_delay", &self.chain_delay)
            .field("rpc_overrides", &self.rpc_overrides)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
