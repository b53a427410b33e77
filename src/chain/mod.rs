// SPDX-FileCopyrightText: 2026 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain identity and per-chain connectivity tables
//!
//! Chains are addressed everywhere by their LayerZero chain key (for example
//! `base-sepolia` or `avalanche-mainnet`). This module carries the key type,
//! the mainnet/testnet classifier derived from it, the deploy target list,
//! and the static RPC endpoint tables used when no explicit override is set.

mod eid;

pub use eid::Eid;

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{address, Address};

use crate::error::OpsError;

/// Chains the deploy batch walks, in runbook order.
///
/// The first entry is intentionally a cheap testnet so a misconfigured run
/// fails before touching anything expensive.
pub const TARGET_CHAINS: &[&str] = &[
    "base-sepolia",
    "ethereum",
    "polygon",
    "base-mainnet",
    "scroll-mainnet",
    "bttc-mainnet",
    "sepolia-testnet",
    "amoy-testnet",
    "base-testnet",
    "scroll-sepolia",
    "polygon-mumbai",
    "bttc-testnet",
    "scroll-testnet",
    "redbelly-testnet",
    "hedera-testnet",
    "neon-testnet",
    "taraxa-testnet-2",
    "arbitrum",
    "optimism",
    "bsc",
    "avalanche-mainnet",
    "celo-mainnet",
    "zora",
    "worldchain",
    "arbitrum-sepolia",
    "optimism-sepolia",
    "bsc-testnet",
    "fuji",
    "unichain-testnet",
    "taraxa-mainnet",
];

/// Hardhat's default local chain id.
pub const LOCALHOST_CHAIN_ID: u64 = 31337;

/// Placeholder endpoint used when deploying against a local node, where no
/// real LayerZero endpoint exists to validate.
pub const LOCALHOST_MOCK_ENDPOINT: Address =
    address!("0000000000000000000000000000000000000001");

/// Native chain ids paired with the registry chain key each one resolves
/// through, ascending by id. Chain 69 is the retired Optimism Kovan id some
/// consumers still carry; it maps to the live Optimism entry.
pub const NATIVE_CHAIN_IDS: &[(u64, &str)] = &[
    (1, "ethereum"),
    (10, "optimism"),
    (56, "bsc"),
    (69, "optimism"),
    (97, "bsc-testnet"),
    (130, "unichain-mainnet"),
    (137, "polygon"),
    (295, "hedera-mainnet"),
    (480, "worldchain"),
    (1301, "unichain-testnet"),
    (8453, "base"),
    (42161, "arbitrum"),
    (42220, "celo-mainnet"),
    (43113, "fuji"),
    (43114, "avalanche-mainnet"),
    (44787, "celo-testnet"),
    (80001, "polygon-mumbai"),
    (80002, "amoy-testnet"),
    (84532, "base-sepolia"),
    (421614, "arbitrum-sepolia"),
    (534351, "scroll-sepolia"),
    (534352, "scroll-mainnet"),
    (7777777, "zora"),
    (11155111, "sepolia-testnet"),
    (11155420, "optimism-sepolia"),
    (999999999, "zora-testnet"),
];

/// Canonical native chain id for a chain key, where one is on record.
///
/// Legacy aliases never win: the first matching pair in ascending id order
/// is the canonical one, so `optimism` maps to 10 even though 69 also
/// points at it.
pub fn chain_id_for(chain: &ChainKey) -> Option<u64> {
    NATIVE_CHAIN_IDS
        .iter()
        .find(|(_, key)| *key == chain.as_str())
        .map(|(id, _)| *id)
}

/// Canonical LayerZero chain key.
///
/// Construction trims and lowercases, so keys compare consistently no matter
/// how they arrived (CLI flags, CSV rows, registry entries).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainKey(String);

impl ChainKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(key.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Classifies the chain by naming convention.
    ///
    /// Anything containing a known testnet marker is a testnet; everything
    /// else is treated as mainnet. This deliberately replaces a hand-kept
    /// mainnet allowlist, which drifted every time a chain was added.
    pub fn environment(&self) -> Environment {
        const TESTNET_MARKERS: &[&str] = &["sepolia", "testnet", "mumbai", "amoy", "fuji"];
        if TESTNET_MARKERS.iter().any(|marker| self.0.contains(marker)) {
            Environment::Testnet
        } else {
            Environment::Mainnet
        }
    }

    /// Name of the environment variable that overrides this chain's RPC URL,
    /// for example `BASE_SEPOLIA_RPC_URL`.
    pub fn rpc_env_var(&self) -> String {
        format!("{}_RPC_URL", self.0.to_ascii_uppercase().replace('-', "_"))
    }

    /// Alchemy subdomain for this chain, when Alchemy serves it.
    pub fn alchemy_subdomain(&self) -> Option<&'static str> {
        let subdomain = match self.0.as_str() {
            "sepolia-testnet" => "eth-sepolia",
            "ethereum" | "ethereum-mainnet" => "eth-mainnet",
            "base-sepolia" => "base-sepolia",
            "base" | "base-mainnet" => "base-mainnet",
            "polygon-mumbai" => "polygon-mumbai",
            "amoy-testnet" => "polygon-amoy",
            "polygon" | "polygon-mainnet" => "polygon-mainnet",
            "arbitrum-sepolia" => "arb-sepolia",
            "arbitrum" | "arbitrum-mainnet" => "arb-mainnet",
            "optimism-sepolia" => "opt-sepolia",
            "optimism" | "optimism-mainnet" => "opt-mainnet",
            "fuji" => "avax-fuji",
            "avalanche-mainnet" => "avax-mainnet",
            "scroll-mainnet" => "scroll-mainnet",
            "unichain-mainnet" => "unichain-mainnet",
            "celo-mainnet" => "celo-mainnet",
            "celo-testnet" => "celo-alfajores",
            "zora" => "zora-mainnet",
            "zora-testnet" => "zora-sepolia",
            "worldchain" => "worldchain-mainnet",
            _ => return None,
        };
        Some(subdomain)
    }

    /// Public fallback RPC endpoint for chains that have a stable one.
    pub fn default_rpc_url(&self) -> Option<&'static str> {
        let url = match self.0.as_str() {
            "ethereum" | "ethereum-mainnet" => "https://cloudflare-eth.com",
            "sepolia-testnet" => "https://rpc.sepolia.org",
            "base" | "base-mainnet" => "https://mainnet.base.org",
            "base-sepolia" => "https://sepolia.base.org",
            "polygon" | "polygon-mainnet" => "https://polygon-rpc.com",
            "polygon-mumbai" => "https://rpc.ankr.com/polygon_mumbai",
            "amoy-testnet" => "https://rpc-amoy.polygon.technology",
            "arbitrum" | "arbitrum-mainnet" => "https://arb1.arbitrum.io/rpc",
            "arbitrum-sepolia" => "https://sepolia-rollup.arbitrum.io/rpc",
            "scroll" | "scroll-mainnet" => "https://rpc.scroll.io",
            "scroll-testnet" | "scroll-sepolia" => "https://sepolia-rpc.scroll.io",
            "optimism" | "optimism-mainnet" => "https://mainnet.optimism.io",
            "optimism-sepolia" => "https://sepolia.optimism.io",
            "fuji" => "https://api.avax-test.network/ext/bc/C/rpc",
            "avalanche-mainnet" => "https://api.avax.network/ext/bc/C/rpc",
            "hedera-testnet" => "https://testnet.hashio.io/api",
            "hedera-mainnet" => "https://mainnet.hashio.io/api",
            _ => return None,
        };
        Some(url)
    }
}

impl fmt::Display for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ChainKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// Deployment environment a chain belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Mainnet,
    Testnet,
}

impl Environment {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Environment::Mainnet => "mainnet",
            Environment::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Environment::Mainnet),
            "testnet" => Ok(Environment::Testnet),
            other => Err(OpsError::InvalidConfig(format!(
                "unknown environment {other:?}, expected mainnet or testnet"
            ))),
        }
    }
}

/// Returns the deploy targets, optionally narrowed to one environment.
pub fn target_chains(environment: Option<Environment>) -> Vec<ChainKey> {
    TARGET_CHAINS
        .iter()
        .map(|key| ChainKey::new(key))
        .filter(|chain| environment.is_none_or(|env| chain.environment() == env))
        .collect()
}
