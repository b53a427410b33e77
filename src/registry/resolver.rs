//! Chain resolution over a registry snapshot
//!
//! Turns a raw [`ChainEntry`] into the concrete addresses the rest of the
//! toolkit works with. Chains usually publish a version 1 and a version 2
//! deployment side by side; the highest version wins, with `mainnet` stage
//! breaking ties among equal versions.

use alloy_primitives::Address;
use tracing::{error, info};

use crate::chain::{ChainKey, Eid};
use crate::error::{OpsError, Result};
use crate::registry::model::{AddressRef, ChainEntry, DeploymentEntry, Registry};
use crate::spans;

/// Verifier id preferred when several read-compatible networks exist.
const PREFERRED_DVN_ID: &str = "layerzero-labs";

/// Everything the toolkit needs to know about one chain's messaging stack.
#[derive(Debug, Clone)]
pub struct ResolvedChain {
    pub chain: ChainKey,
    pub eid: Eid,
    pub version: u32,
    pub stage: Option<String>,
    pub endpoint: Address,
    /// Library applications must be wired to for read requests. Version 1
    /// deployments have no separate read library; the endpoint stands in.
    pub read_library: Address,
    pub send_library: Option<Address>,
    pub receive_library: Option<Address>,
    pub executor: Option<Address>,
    pub read_dvn: Option<ReadDvn>,
}

/// A read-compatible verifier network on a chain.
#[derive(Debug, Clone)]
pub struct ReadDvn {
    pub address: Address,
    pub id: Option<String>,
    pub canonical_name: Option<String>,
}

/// Resolves a chain against the registry snapshot.
///
/// Fails when the chain has no entry, when the selected deployment is
/// unusable, or when a version 2 deployment publishes no read library.
/// Optional addresses that are absent or malformed resolve to `None`.
pub fn resolve(registry: &Registry, chain: &ChainKey) -> Result<ResolvedChain> {
    let span = spans::resolve_chain(chain);
    let _guard = span.enter();

    let entry = registry.entry(chain).ok_or_else(|| {
        let err = OpsError::RegistryEntryNotFound {
            chain: chain.to_string(),
        };
        spans::record_error(&err);
        error!(chain = %chain, event = "registry_entry_missing");
        err
    })?;

    let deployment = latest_deployment(entry)
        .ok_or_else(|| invalid_entry(chain, "entry lists no deployments"))?;
    let version = deployment.version.unwrap_or(0);

    let eid: Eid = deployment
        .eid
        .as_deref()
        .ok_or_else(|| invalid_entry(chain, "deployment has no endpoint id"))?
        .parse()
        .map_err(|_| invalid_entry(chain, "deployment has a non-numeric endpoint id"))?;

    let endpoint = required_address(chain, "endpoint", endpoint_ref(deployment, version))?;

    let read_library = if version >= 2 {
        match deployment
            .read_lib_1002
            .as_ref()
            .and_then(AddressRef::as_str)
        {
            Some(text) => parse_address(chain, "read library", text)?,
            None => {
                let err = OpsError::MissingReadLibrary {
                    chain: chain.to_string(),
                };
                spans::record_error(&err);
                error!(chain = %chain, version, event = "read_library_missing");
                return Err(err);
            }
        }
    } else {
        endpoint
    };

    let resolved = ResolvedChain {
        chain: chain.clone(),
        eid,
        version,
        stage: deployment.stage.clone(),
        endpoint,
        read_library,
        send_library: optional_address(deployment.send_uln_302.as_ref()),
        receive_library: optional_address(deployment.receive_uln_302.as_ref()),
        executor: optional_address(deployment.executor.as_ref()),
        read_dvn: read_dvn(entry),
    };

    info!(
        chain = %chain,
        eid = %resolved.eid,
        version = resolved.version,
        endpoint = %resolved.endpoint,
        read_library = %resolved.read_library,
        event = "chain_resolved"
    );
    Ok(resolved)
}

/// Picks the deployment the toolkit should target.
///
/// Highest version wins; among equal versions a `mainnet` stage outranks
/// any other stage, and the first listed deployment wins remaining ties.
pub fn latest_deployment(entry: &ChainEntry) -> Option<&DeploymentEntry> {
    let mut best: Option<&DeploymentEntry> = None;
    for deployment in &entry.deployments {
        if best.is_none_or(|current| rank(deployment) > rank(current)) {
            best = Some(deployment);
        }
    }
    best
}

fn rank(deployment: &DeploymentEntry) -> (u32, bool) {
    (deployment.version.unwrap_or(0), deployment.is_mainnet_stage())
}

/// Selects the verifier network read requests should be routed through.
///
/// Only read-compatible networks qualify. The canonical LayerZero Labs
/// network is preferred when present; otherwise the first qualifying entry
/// in address order is used.
pub fn read_dvn(entry: &ChainEntry) -> Option<ReadDvn> {
    let candidates: Vec<ReadDvn> = entry
        .dvns
        .iter()
        .filter_map(|(address, dvn)| {
            if dvn.lz_read_compatible != Some(true) {
                return None;
            }
            let address: Address = address.parse().ok()?;
            Some(ReadDvn {
                address,
                id: dvn.id.clone(),
                canonical_name: dvn.canonical_name.clone(),
            })
        })
        .collect();

    candidates
        .iter()
        .find(|dvn| dvn.id.as_deref() == Some(PREFERRED_DVN_ID))
        .or_else(|| candidates.first())
        .cloned()
}

fn endpoint_ref(deployment: &DeploymentEntry, version: u32) -> Option<&AddressRef> {
    if version >= 2 {
        deployment
            .endpoint_v2
            .as_ref()
            .or(deployment.endpoint_v2_view.as_ref())
    } else {
        deployment.endpoint.as_ref()
    }
}

fn required_address(
    chain: &ChainKey,
    label: &str,
    reference: Option<&AddressRef>,
) -> Result<Address> {
    let text = reference
        .and_then(AddressRef::as_str)
        .ok_or_else(|| invalid_entry(chain, format!("deployment has no {label} address")))?;
    parse_address(chain, label, text)
}

fn parse_address(chain: &ChainKey, label: &str, text: &str) -> Result<Address> {
    text.parse().map_err(|_| {
        invalid_entry(chain, format!("deployment has a malformed {label} address {text:?}"))
    })
}

fn optional_address(reference: Option<&AddressRef>) -> Option<Address> {
    reference
        .and_then(AddressRef::as_str)
        .and_then(|text| text.parse().ok())
}

fn invalid_entry(chain: &ChainKey, reason: impl Into<String>) -> OpsError {
    let err = OpsError::InvalidRegistryEntry {
        chain: chain.to_string(),
        reason: reason.into(),
    };
    spans::record_error(&err);
    error!(chain = %chain, error = %err, event = "registry_entry_invalid");
    err
}
