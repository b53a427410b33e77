//! Ownable bindings for the ownership sweep
//!
//! Covers the single-step `transferOwnership` every target exposes plus the
//! two-step `pendingOwner` probe. Not every target implements the two-step
//! interface; a revert on the probe reads as no pending owner.

use alloy_network::Ethereum;
use alloy_primitives::Address;
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use Ownable::OwnableInstance;

/// Type-safe wrapper for ownable contracts.
#[derive(Debug, Clone)]
pub struct OwnableContract<P: Provider<Ethereum>> {
    instance: OwnableInstance<P>,
}

impl<P: Provider<Ethereum> + Clone> OwnableContract<P> {
    /// Creates a new wrapper for the contract at the given address.
    pub fn new(address: Address, provider: P) -> Self {
        debug!(contract_address = %address, event = "ownable_contract_initialized");
        Self {
            instance: Ownable::new(address, provider),
        }
    }

    /// The current owner of the contract.
    pub async fn owner(&self) -> Result<Address, alloy_contract::Error> {
        debug!(event = "checking_owner");
        let owner = self.instance.owner().call().await?;
        info!(owner = %owner, event = "owner_retrieved");
        Ok(owner)
    }

    /// A pending two-step handover, if one is set.
    pub async fn pending_owner(&self) -> Option<Address> {
        debug!(event = "checking_pending_owner");
        match self.instance.pendingOwner().call().await {
            Ok(pending) if pending != Address::ZERO => {
                info!(pending_owner = %pending, event = "pending_owner_retrieved");
                Some(pending)
            }
            _ => None,
        }
    }

    /// Builds an unsent transaction handing ownership to `new_owner`.
    pub fn transfer_ownership_transaction(
        &self,
        from: Address,
        new_owner: Address,
    ) -> TransactionRequest {
        info!(new_owner = %new_owner, event = "building_transfer_ownership_transaction");
        self.instance
            .transferOwnership(new_owner)
            .from(from)
            .into_transaction_request()
    }

    /// Returns the contract address.
    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

// Ownership surface shared by the deployed contracts
sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Ownable {
        function owner() external view returns (address);
        function pendingOwner() external view returns (address);
        function transferOwnership(address newOwner) external;
    }
);
