// SPDX-FileCopyrightText: 2026 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Alloy-based chain client implementation.

use std::sync::Arc;

use alloy_network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use crate::chain::ChainKey;
use crate::config::OpsConfig;
use crate::contracts::endpoint::EndpointContract;
use crate::contracts::ownable::OwnableContract;
use crate::contracts::read_adapter::TixReadAdapterContract;
use crate::contracts::tix_token::TixTokenContract;
use crate::error::{OpsError, Result};
use crate::traits::{ChainClient, ChainConnector};

/// Production chain client wrapping Alloy's [`Provider`] trait.
///
/// One client serves one chain. When built with a signer the client can
/// submit transactions; without one it answers reads and rejects writes.
///
/// # Type Parameters
///
/// - `P`: The underlying Alloy provider implementation
///
/// # Examples
///
/// ```rust,no_run
/// use tix_ops::providers::AlloyChainClient;
/// use tix_ops::ChainKey;
/// use alloy_provider::ProviderBuilder;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect_http("https://sepolia.base.org".parse()?);
/// let client = AlloyChainClient::new(ChainKey::new("base-sepolia"), provider, None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AlloyChainClient<P>
where
    P: Provider<Ethereum> + Clone,
{
    chain: ChainKey,
    provider: P,
    signer: Option<Address>,
}

impl<P> AlloyChainClient<P>
where
    P: Provider<Ethereum> + Clone,
{
    /// Creates a new client for `chain` over the given Alloy provider.
    ///
    /// `signer` is the address transactions will be sent from; pass `None`
    /// for a read-only client.
    pub fn new(chain: ChainKey, provider: P, signer: Option<Address>) -> Self {
        Self {
            chain,
            provider,
            signer,
        }
    }

    /// Returns a reference to the underlying Alloy provider.
    pub fn inner(&self) -> &P {
        &self.provider
    }

    fn require_signer(&self) -> Result<Address> {
        self.signer.ok_or(OpsError::MissingEnv {
            name: "PRIVATE_KEY",
        })
    }

    async fn send_and_confirm(&self, tx: TransactionRequest, action: &str) -> Result<()> {
        let pending = self.provider.send_transaction(tx).await?;
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| OpsError::TransactionFailed {
                reason: format!("{action}: {e}"),
            })?;
        if !receipt.status() {
            return Err(OpsError::TransactionFailed {
                reason: format!("{action} reverted in {}", receipt.transaction_hash),
            });
        }
        debug!(tx_hash = %receipt.transaction_hash, action, "Transaction confirmed");
        Ok(())
    }
}

#[async_trait]
impl<P> ChainClient for AlloyChainClient<P>
where
    P: Provider<Ethereum> + Clone + Send + Sync,
{
    fn chain(&self) -> &ChainKey {
        &self.chain
    }

    fn signer_address(&self) -> Option<Address> {
        self.signer
    }

    #[instrument(skip(self), fields(chain = %self.chain))]
    async fn chain_id(&self) -> Result<u64> {
        trace!("Fetching chain id");
        let chain_id = self.provider.get_chain_id().await?;
        debug!(chain_id, "Chain id retrieved");
        Ok(chain_id)
    }

    #[instrument(skip(self), fields(chain = %self.chain, address = %address))]
    async fn has_code(&self, address: Address) -> Result<bool> {
        trace!("Fetching account code");
        let code = self.provider.get_code_at(address).await?;
        debug!(bytes = code.len(), "Account code retrieved");
        Ok(!code.is_empty())
    }

    #[instrument(skip(self, code), fields(chain = %self.chain))]
    async fn deploy_contract(&self, code: Bytes) -> Result<Address> {
        let from = self.require_signer()?;
        trace!(bytes = code.len(), "Submitting contract creation");

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(code);
        let pending = self.provider.send_transaction(tx).await?;
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| OpsError::DeploymentFailed {
                reason: e.to_string(),
            })?;

        if !receipt.status() {
            return Err(OpsError::DeploymentFailed {
                reason: format!("creation transaction {} reverted", receipt.transaction_hash),
            });
        }
        let address = receipt
            .contract_address
            .ok_or_else(|| OpsError::DeploymentFailed {
                reason: format!(
                    "creation transaction {} carries no contract address",
                    receipt.transaction_hash
                ),
            })?;

        debug!(contract_address = %address, tx_hash = %receipt.transaction_hash, "Contract deployed");
        Ok(address)
    }

    async fn service_worker_role(&self, token: Address) -> Result<B256> {
        let token = TixTokenContract::new(token, self.provider.clone());
        Ok(token.service_worker_role().await?)
    }

    async fn grant_role(&self, token: Address, role: B256, account: Address) -> Result<()> {
        let from = self.require_signer()?;
        let token = TixTokenContract::new(token, self.provider.clone());
        let tx = token.grant_role_transaction(from, role, account);
        self.send_and_confirm(tx, "grant role").await
    }

    async fn register_service(
        &self,
        token: Address,
        name: &str,
        description: &str,
        service: Address,
        owner: Address,
    ) -> Result<()> {
        let from = self.require_signer()?;
        let token = TixTokenContract::new(token, self.provider.clone());
        let tx = token.register_service_transaction(from, name, description, service, owner);
        self.send_and_confirm(tx, "register service").await
    }

    async fn service(&self, token: Address, id: B256) -> Result<Address> {
        let token = TixTokenContract::new(token, self.provider.clone());
        Ok(token.service(id).await?)
    }

    async fn peer(&self, adapter: Address, eid: u32) -> Result<B256> {
        let adapter = TixReadAdapterContract::new(adapter, self.provider.clone());
        Ok(adapter.peer(eid).await?)
    }

    async fn set_peer(&self, adapter: Address, eid: u32, peer: B256) -> Result<()> {
        let from = self.require_signer()?;
        let adapter = TixReadAdapterContract::new(adapter, self.provider.clone());
        let tx = adapter.set_peer_transaction(from, eid, peer);
        self.send_and_confirm(tx, "set peer").await
    }

    async fn send_library(
        &self,
        endpoint: Address,
        oapp: Address,
        eid: u32,
    ) -> Result<Option<Address>> {
        let endpoint = EndpointContract::new(endpoint, self.provider.clone());
        Ok(endpoint.send_library(oapp, eid).await?)
    }

    async fn owner(&self, contract: Address) -> Result<Address> {
        let contract = OwnableContract::new(contract, self.provider.clone());
        Ok(contract.owner().await?)
    }

    async fn pending_owner(&self, contract: Address) -> Option<Address> {
        let contract = OwnableContract::new(contract, self.provider.clone());
        contract.pending_owner().await
    }

    async fn estimate_transfer_ownership(
        &self,
        contract: Address,
        new_owner: Address,
    ) -> Result<u64> {
        let from = self.require_signer()?;
        let contract = OwnableContract::new(contract, self.provider.clone());
        let tx = contract.transfer_ownership_transaction(from, new_owner);
        Ok(self.provider.estimate_gas(tx).await?)
    }

    async fn transfer_ownership(
        &self,
        contract: Address,
        new_owner: Address,
        gas_limit: u64,
    ) -> Result<()> {
        let from = self.require_signer()?;
        let contract = OwnableContract::new(contract, self.provider.clone());
        let tx = contract
            .transfer_ownership_transaction(from, new_owner)
            .with_gas_limit(gas_limit);
        self.send_and_confirm(tx, "transfer ownership").await
    }
}

/// Opens [`AlloyChainClient`] connections from the run configuration.
///
/// RPC endpoints follow the configuration's resolution order: explicit
/// override, then the Alchemy gateway, then the chain's public endpoint.
#[derive(Clone, Debug)]
pub struct AlloyConnector {
    config: OpsConfig,
}

impl AlloyConnector {
    /// Creates a connector over the given configuration.
    pub fn new(config: OpsConfig) -> Self {
        Self { config }
    }
}

impl ChainConnector for AlloyConnector {
    fn connect(&self, chain: &ChainKey) -> Result<Arc<dyn ChainClient>> {
        let url = self
            .config
            .rpc_url(chain)
            .ok_or_else(|| OpsError::MissingRpcUrl {
                chain: chain.to_string(),
            })?;

        match self.config.private_key.as_deref() {
            Some(key) => {
                let signer: PrivateKeySigner = key.parse()?;
                let signer_address = signer.address();
                let wallet = EthereumWallet::from(signer);
                let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);
                debug!(chain = %chain, signer = %signer_address, "Chain client connected");
                Ok(Arc::new(AlloyChainClient::new(
                    chain.clone(),
                    provider,
                    Some(signer_address),
                )))
            }
            None => {
                let provider = ProviderBuilder::new().connect_http(url);
                debug!(chain = %chain, "Chain client connected read-only");
                Ok(Arc::new(AlloyChainClient::new(
                    chain.clone(),
                    provider,
                    None,
                )))
            }
        }
    }

    fn can_transact(&self, chain: &ChainKey) -> bool {
        self.config.rpc_url(chain).is_some() && self.config.private_key.is_some()
    }
}
