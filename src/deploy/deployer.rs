//! Per-chain contract deployment
//!
//! One chain at a time: validate the LayerZero endpoint, land the token
//! and its two service deployers, land the read adapter, register
//! everything in the token's service directory, record it all in the
//! ledgers, and wire the adapter to its peers. Every step consults the
//! ledger first, so a rerun after a partial failure picks up where the
//! last run stopped instead of deploying duplicates.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use bon::Builder;
use tracing::{debug, info, warn};

use crate::chain::{ChainKey, Eid, LOCALHOST_CHAIN_ID, LOCALHOST_MOCK_ENDPOINT};
use crate::contracts::{read_adapter, service_deployer, tix_token};
use crate::deploy::artifact::ArtifactStore;
use crate::deploy::wirer::PeerWirer;
use crate::error::{OpsError, Result};
use crate::ledger::{AdapterRow, LedgerSet, TixRow};
use crate::registry::ResolvedChain;
use crate::spans;
use crate::traits::{ChainClient, ChainConnector};

/// Directory names the deployed contracts register under.
const SERVICE_DEPLOYER_NAME: &str = "ServiceDeployer";
const UPGRADEABLE_DEPLOYER_NAME: &str = "UpgradeableServiceDeployer";
const ADAPTER_SERVICE_NAME: &str = "OmniAdapter";

/// Supply minted when the token first deploys: ten million tokens at
/// eighteen decimals.
fn initial_supply() -> U256 {
    U256::from(10_000_000_000_000_000_000_000_000_u128)
}

/// Address set produced by one chain's deployment.
#[derive(Debug, Clone)]
pub struct ChainDeployment {
    pub chain: ChainKey,
    pub eid: Eid,
    pub endpoint: Address,
    pub token: Address,
    pub service_deployer: Option<Address>,
    pub upgradeable_deployer: Option<Address>,
    pub adapter: Address,
    pub reused_token: bool,
    pub reused_adapter: bool,
}

struct TokenAddresses {
    token: Address,
    service_deployer: Option<Address>,
    upgradeable_deployer: Option<Address>,
    reused: bool,
}

/// Deploys the token system to one chain, reusing anything the ledger
/// already records.
#[derive(Builder, Clone)]
pub struct ChainDeployer {
    ledgers: LedgerSet,
    artifacts: ArtifactStore,
    connector: Arc<dyn ChainConnector>,
}

impl ChainDeployer {
    /// Runs the full deployment sequence against one connected chain.
    ///
    /// Returns `None` when the chain has no usable endpoint, which the
    /// caller treats as a failed chain without a transaction ever having
    /// been sent. Transaction and RPC failures are hard errors.
    pub async fn deploy_to_chain(
        &self,
        client: &dyn ChainClient,
        resolved: &ResolvedChain,
    ) -> Result<Option<ChainDeployment>> {
        let span = spans::deploy_chain(&resolved.chain, resolved.eid.as_u32());
        let _guard = span.enter();

        let endpoint = match self.usable_endpoint(client, resolved).await? {
            Some(endpoint) => endpoint,
            None => return Ok(None),
        };

        let token = self.ensure_token(client, resolved).await?;
        let (adapter, reused_adapter) = self
            .ensure_adapter(client, resolved, endpoint, token.token)
            .await?;

        self.register_adapter(client, token.token, adapter).await;
        self.record_adapter(resolved, adapter)?;

        let wirer = PeerWirer::builder()
            .connector(self.connector.clone())
            .adapters(self.ledgers.adapters.clone())
            .build();
        if let Err(e) = wirer.wire_peers(client, adapter, resolved.eid).await {
            warn!(error = %e, event = "peer_wiring_failed");
        }

        info!(
            token = %token.token,
            adapter = %adapter,
            reused_token = token.reused,
            reused_adapter,
            event = "chain_deployed"
        );
        Ok(Some(ChainDeployment {
            chain: resolved.chain.clone(),
            eid: resolved.eid,
            endpoint,
            token: token.token,
            service_deployer: token.service_deployer,
            upgradeable_deployer: token.upgradeable_deployer,
            adapter,
            reused_token: token.reused,
            reused_adapter,
        }))
    }

    /// Picks the endpoint to deploy against, or `None` when the chain has
    /// no usable one. A local node gets the mock endpoint without a code
    /// check, since nothing real is deployed there.
    async fn usable_endpoint(
        &self,
        client: &dyn ChainClient,
        resolved: &ResolvedChain,
    ) -> Result<Option<Address>> {
        if client.chain_id().await? == LOCALHOST_CHAIN_ID {
            debug!(event = "localhost_endpoint_substituted");
            return Ok(Some(LOCALHOST_MOCK_ENDPOINT));
        }
        if resolved.endpoint == Address::ZERO {
            warn!(chain = %resolved.chain, event = "endpoint_missing");
            return Ok(None);
        }
        if !client.has_code(resolved.endpoint).await? {
            warn!(
                chain = %resolved.chain,
                endpoint = %resolved.endpoint,
                event = "endpoint_has_no_code"
            );
            return Ok(None);
        }
        Ok(Some(resolved.endpoint))
    }

    /// Reuses the recorded token when it still has code, otherwise deploys
    /// the token with both service deployers and registers them.
    async fn ensure_token(
        &self,
        client: &dyn ChainClient,
        resolved: &ResolvedChain,
    ) -> Result<TokenAddresses> {
        if let Some(row) = self.ledgers.tix.latest(&resolved.chain)? {
            if client.has_code(row.token).await? {
                info!(token = %row.token, event = "token_reused");
                let service_deployer = match row.service_deployer {
                    Some(address) => Some(address),
                    None => {
                        self.lookup_service(client, row.token, SERVICE_DEPLOYER_NAME)
                            .await
                    }
                };
                let upgradeable_deployer = match row.upgradeable_deployer {
                    Some(address) => Some(address),
                    None => {
                        self.lookup_service(client, row.token, UPGRADEABLE_DEPLOYER_NAME)
                            .await
                    }
                };
                return Ok(TokenAddresses {
                    token: row.token,
                    service_deployer,
                    upgradeable_deployer,
                    reused: true,
                });
            }
            warn!(token = %row.token, event = "recorded_token_has_no_code");
        }

        let signer = client
            .signer_address()
            .ok_or(OpsError::MissingEnv { name: "PRIVATE_KEY" })?;

        let token = self
            .deploy_artifact(
                client,
                resolved,
                "TixToken",
                &tix_token::constructor_args(initial_supply()),
            )
            .await?;
        let deployer = self
            .deploy_artifact(
                client,
                resolved,
                SERVICE_DEPLOYER_NAME,
                &service_deployer::constructor_args(token),
            )
            .await?;
        let upgradeable = self
            .deploy_artifact(
                client,
                resolved,
                UPGRADEABLE_DEPLOYER_NAME,
                &service_deployer::constructor_args(token),
            )
            .await?;

        let role = client.service_worker_role(token).await?;
        client.grant_role(token, role, deployer).await?;
        client.grant_role(token, role, upgradeable).await?;
        client
            .register_service(
                token,
                SERVICE_DEPLOYER_NAME,
                "Service deployment contract",
                deployer,
                signer,
            )
            .await?;
        client
            .register_service(
                token,
                UPGRADEABLE_DEPLOYER_NAME,
                "Upgradeable service deployment contract",
                upgradeable,
                signer,
            )
            .await?;

        self.ledgers.tix.append(&TixRow {
            chain: resolved.chain.clone(),
            eid: Some(resolved.eid),
            token,
            service_deployer: Some(deployer),
            upgradeable_deployer: Some(upgradeable),
        })?;

        Ok(TokenAddresses {
            token,
            service_deployer: Some(deployer),
            upgradeable_deployer: Some(upgradeable),
            reused: false,
        })
    }

    /// Best-effort lookup of a named service in the token's directory.
    ///
    /// Returns `None` when nothing is registered under the name or the
    /// read fails; a reused token's missing deployer is reported, never
    /// fatal.
    async fn lookup_service(
        &self,
        client: &dyn ChainClient,
        token: Address,
        name: &str,
    ) -> Option<Address> {
        match client.service(token, tix_token::service_id(name)).await {
            Ok(address) if address != Address::ZERO => Some(address),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, service = name, event = "service_lookup_failed");
                None
            }
        }
    }

    /// Reuses the recorded adapter when it still has code, otherwise
    /// deploys a fresh one bound to this endpoint and token.
    async fn ensure_adapter(
        &self,
        client: &dyn ChainClient,
        resolved: &ResolvedChain,
        endpoint: Address,
        token: Address,
    ) -> Result<(Address, bool)> {
        if let Some(row) = self.ledgers.adapters.latest(&resolved.chain)? {
            if client.has_code(row.adapter).await? {
                info!(adapter = %row.adapter, event = "adapter_reused");
                return Ok((row.adapter, true));
            }
            warn!(adapter = %row.adapter, event = "recorded_adapter_has_no_code");
        }
        let adapter = self
            .deploy_artifact(
                client,
                resolved,
                "TixReadAdapter",
                &read_adapter::constructor_args(endpoint, token),
            )
            .await?;
        Ok((adapter, false))
    }

    /// Registers the adapter in the token's service directory. On a reused
    /// token the signer usually lacks the worker role, so failures here are
    /// reported and swallowed.
    async fn register_adapter(&self, client: &dyn ChainClient, token: Address, adapter: Address) {
        match client
            .service(token, tix_token::service_id(ADAPTER_SERVICE_NAME))
            .await
        {
            Ok(current) if current == adapter => {
                debug!(event = "adapter_already_registered");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, event = "adapter_registration_failed");
                return;
            }
        }
        let Some(signer) = client.signer_address() else {
            warn!(reason = "no signer", event = "adapter_registration_skipped");
            return;
        };
        if let Err(e) = client
            .register_service(
                token,
                ADAPTER_SERVICE_NAME,
                "Cross-chain adapter",
                adapter,
                signer,
            )
            .await
        {
            warn!(error = %e, event = "adapter_registration_failed");
        }
    }

    /// Appends an adapter row unless the latest row already carries this
    /// address.
    fn record_adapter(&self, resolved: &ResolvedChain, adapter: Address) -> Result<()> {
        if let Some(row) = self.ledgers.adapters.latest(&resolved.chain)? {
            if row.adapter == adapter {
                return Ok(());
            }
        }
        self.ledgers.adapters.append(&AdapterRow {
            chain: resolved.chain.clone(),
            eid: resolved.eid,
            adapter,
        })
    }

    /// Deploys one compiled artifact and returns its address.
    async fn deploy_artifact(
        &self,
        client: &dyn ChainClient,
        resolved: &ResolvedChain,
        name: &str,
        constructor_args: &[u8],
    ) -> Result<Address> {
        let span = spans::deploy_contract(name, &resolved.chain);
        let _guard = span.enter();

        let code = self.artifacts.creation_code(name, constructor_args)?;
        let address = client.deploy_contract(code).await?;
        info!(contract = name, address = %address, event = "contract_deployed");
        Ok(address)
    }
}
