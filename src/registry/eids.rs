//! Endpoint id export for downstream services
//!
//! Some consumers key their configuration by native chain id rather than
//! chain key, so this module renders a C# dictionary literal mapping native
//! chain ids to endpoint ids, ready to paste into their configuration
//! source.

use tracing::debug;

use crate::chain::{ChainKey, Eid, NATIVE_CHAIN_IDS};
use crate::registry::model::{ChainEntry, Registry};

/// Renders the chain id to endpoint id map as a C# dictionary literal.
///
/// Chains missing from the snapshot, or present without any usable
/// endpoint id, are left out. Rows are ordered by native chain id.
pub fn export_eid_map(registry: &Registry) -> String {
    let mut pairs: Vec<(u64, Eid)> = NATIVE_CHAIN_IDS
        .iter()
        .filter_map(|(chain_id, key)| {
            let entry = registry.entry(&ChainKey::new(key))?;
            preferred_eid(entry).map(|eid| (*chain_id, eid))
        })
        .collect();
    pairs.sort_by_key(|(chain_id, _)| *chain_id);

    debug!(
        mapped = pairs.len(),
        known = NATIVE_CHAIN_IDS.len(),
        event = "eid_map_rendered"
    );

    let mut out = String::from("new Dictionary<int, int> {\n");
    for (chain_id, eid) in pairs {
        out.push_str(&format!("  {{ {chain_id}, {eid} }},\n"));
    }
    out.push('}');
    out
}

/// The endpoint id a consumer should use for an entry. Version 2 ids are
/// preferred; any deployment carrying a numeric id is the fallback.
fn preferred_eid(entry: &ChainEntry) -> Option<Eid> {
    let parsed = |deployment: &crate::registry::model::DeploymentEntry| {
        deployment.eid.as_deref().and_then(|eid| eid.parse().ok())
    };

    entry
        .deployments
        .iter()
        .find_map(|deployment| {
            if deployment.version == Some(2) {
                parsed(deployment)
            } else {
                None
            }
        })
        .or_else(|| entry.deployments.iter().find_map(parsed))
}
