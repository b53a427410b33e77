//! Token and service registry bindings
//!
//! The token contract doubles as the on-chain service registry: deployer
//! contracts are granted the service worker role on it and registered under
//! hashed service names, which is also how later runs rediscover them.

use alloy_network::Ethereum;
use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolConstructor};
use tracing::{debug, info};

use TixToken::TixTokenInstance;

/// The registry id for a service name.
pub fn service_id(name: &str) -> B256 {
    keccak256(name.as_bytes())
}

/// Encodes the token's constructor arguments.
pub fn constructor_args(initial_supply: U256) -> Vec<u8> {
    TixToken::constructorCall {
        initialSupply: initial_supply,
    }
    .abi_encode()
}

/// Type-safe wrapper for the token contract.
#[derive(Debug, Clone)]
pub struct TixTokenContract<P: Provider<Ethereum>> {
    instance: TixTokenInstance<P>,
}

impl<P: Provider<Ethereum> + Clone> TixTokenContract<P> {
    /// Creates a new wrapper for the token at the given address.
    pub fn new(address: Address, provider: P) -> Self {
        debug!(contract_address = %address, event = "tix_token_contract_initialized");
        Self {
            instance: TixToken::new(address, provider),
        }
    }

    /// The role identifier service deployers must hold.
    pub async fn service_worker_role(&self) -> Result<B256, alloy_contract::Error> {
        debug!(event = "fetching_service_worker_role");
        let role = self.instance.SERVICE_WORKER().call().await?;
        info!(role = %role, event = "service_worker_role_retrieved");
        Ok(role)
    }

    /// Looks up a registered service address by registry id.
    pub async fn service(&self, id: B256) -> Result<Address, alloy_contract::Error> {
        debug!(service_id = %id, event = "looking_up_service");
        let service = self.instance.getService(id).call().await?;
        info!(service_id = %id, service = %service, event = "service_retrieved");
        Ok(service)
    }

    /// Builds an unsent transaction granting `role` to `account`.
    pub fn grant_role_transaction(
        &self,
        from: Address,
        role: B256,
        account: Address,
    ) -> TransactionRequest {
        info!(role = %role, account = %account, event = "building_grant_role_transaction");
        self.instance
            .grantRole(role, account)
            .from(from)
            .into_transaction_request()
    }

    /// Builds an unsent transaction registering a service in the registry.
    pub fn register_service_transaction(
        &self,
        from: Address,
        name: &str,
        description: &str,
        service: Address,
        owner: Address,
    ) -> TransactionRequest {
        info!(name, service = %service, event = "building_register_service_transaction");
        self.instance
            .registerService(name.to_string(), description.to_string(), service, owner)
            .from(from)
            .into_transaction_request()
    }

    /// Returns the contract address.
    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

// Supply, role, and service registry surface of the token
sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract TixToken {
        constructor(uint256 initialSupply);

        function SERVICE_WORKER() external view returns (bytes32);
        function grantRole(bytes32 role, address account) external;
        function registerService(string name, string description, address service, address owner) external;
        function getService(bytes32 serviceId) external view returns (address);
    }
);
