//! Chain registry snapshots and resolution
//!
//! The messaging vendor publishes one large JSON document describing every
//! chain it serves. This module downloads that document, persists it as a
//! local snapshot so the rest of the toolkit can run offline, and resolves
//! individual chains to the deployment addresses the tooling needs.

mod eids;
mod model;
mod resolver;

pub use eids::export_eid_map;
pub use model::{AddressRef, ChainDetails, ChainEntry, DeploymentEntry, DvnEntry, Registry};
pub use resolver::{latest_deployment, read_dvn, resolve, ReadDvn, ResolvedChain};

use tracing::info;
use url::Url;

use crate::error::Result;
use crate::spans;

/// Downloads the current registry document from the metadata service.
///
/// The returned [`Registry`] keeps the raw response body, so a subsequent
/// [`Registry::save`] writes exactly what the service sent.
pub async fn fetch_registry(url: &Url) -> Result<Registry> {
    let span = spans::fetch_registry(url);
    let _guard = span.enter();

    let response = reqwest::Client::new()
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?;
    let body = response.text().await?;
    let registry = Registry::from_json(&body)?;

    info!(entries = registry.len(), event = "registry_fetched");
    Ok(registry)
}
