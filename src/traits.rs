//! Core trait abstractions for multi-chain operations.
//!
//! This module defines the traits that enable dependency injection and
//! testing of the deployment tooling. By abstracting per-chain RPC traffic
//! and time control behind traits, users can implement fake versions for
//! comprehensive testing, including chains that are unreachable, contracts
//! that revert, and transactions that land without effect.
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use tix_ops::{ChainClient, ChainKey};
//! use std::collections::HashMap;
//!
//! struct FakeChainClient {
//!     chain: ChainKey,
//!     owners: HashMap<Address, Address>,
//! }
//!
//! #[async_trait::async_trait]
//! impl ChainClient for FakeChainClient {
//!     fn chain(&self) -> &ChainKey {
//!         &self.chain
//!     }
//!
//!     async fn owner(&self, contract: Address) -> Result<Address> {
//!         self.owners
//!             .get(&contract)
//!             .copied()
//!             .ok_or_else(|| OpsError::TransactionFailed {
//!                 reason: "no owner".into(),
//!             })
//!     }
//!
//!     // ...remaining methods follow the same shape
//! }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;

use crate::chain::ChainKey;
use crate::error::Result;

/// Trait for everything the toolkit does against one chain.
///
/// One client wraps one RPC connection, optionally backed by a signer.
/// Read operations work either way; mutating operations require a signer
/// and implementations reject them without one.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Chains with and without deployed bytecode at ledger addresses
/// - Peer registries in any starting state
/// - Reverting ownership reads and gas estimations
/// - Transactions that fail after submission
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The chain this client is connected to.
    fn chain(&self) -> &ChainKey;

    /// The signer's address, when the client was built with a private key.
    fn signer_address(&self) -> Option<Address>;

    /// The chain id reported by the RPC node.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn chain_id(&self) -> Result<u64>;

    /// Whether any bytecode is deployed at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn has_code(&self, address: Address) -> Result<bool>;

    /// Submits a contract creation transaction and waits for it to land.
    ///
    /// `code` is the creation bytecode with constructor arguments already
    /// appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be sent, reverts, or
    /// lands without a contract address.
    async fn deploy_contract(&self, code: Bytes) -> Result<Address>;

    /// Reads the service worker role id from the token at `token`.
    async fn service_worker_role(&self, token: Address) -> Result<B256>;

    /// Grants `role` to `account` on the token's access control list.
    async fn grant_role(&self, token: Address, role: B256, account: Address) -> Result<()>;

    /// Registers a named service in the token's service registry.
    async fn register_service(
        &self,
        token: Address,
        name: &str,
        description: &str,
        service: Address,
        owner: Address,
    ) -> Result<()>;

    /// Looks up a registered service address by registry id.
    ///
    /// Returns the zero address when nothing is registered under `id`.
    async fn service(&self, token: Address, id: B256) -> Result<Address>;

    /// Reads the peer an adapter has registered for `eid`, zero when unset.
    async fn peer(&self, adapter: Address, eid: u32) -> Result<B256>;

    /// Registers `peer` for `eid` on the adapter.
    async fn set_peer(&self, adapter: Address, eid: u32, peer: B256) -> Result<()>;

    /// The send library the endpoint has configured for `oapp` toward
    /// `eid`, or `None` when the endpoint reports none is set.
    async fn send_library(
        &self,
        endpoint: Address,
        oapp: Address,
        eid: u32,
    ) -> Result<Option<Address>>;

    /// The current owner of an ownable contract.
    async fn owner(&self, contract: Address) -> Result<Address>;

    /// A pending two-step ownership handover, if one is set.
    ///
    /// Contracts without the two-step interface report `None`.
    async fn pending_owner(&self, contract: Address) -> Option<Address>;

    /// Estimates gas for an ownership transfer, without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error if the node rejects the estimation; callers fall
    /// back to a fixed limit in that case.
    async fn estimate_transfer_ownership(&self, contract: Address, new_owner: Address)
        -> Result<u64>;

    /// Transfers ownership of `contract` to `new_owner` with an explicit
    /// gas limit and waits for the transaction to land.
    async fn transfer_ownership(
        &self,
        contract: Address,
        new_owner: Address,
        gas_limit: u64,
    ) -> Result<()>;
}

/// Trait for opening [`ChainClient`] connections by chain key.
///
/// Cross-chain operations hop between chains mid-run; the connector is how
/// they obtain clients for chains other than the one they started on.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Remote chains that are unreachable mid-run
/// - Runs with and without signing credentials
pub trait ChainConnector: Send + Sync {
    /// Opens a client for `chain`.
    ///
    /// # Errors
    ///
    /// Returns an error if no RPC endpoint is known for the chain or the
    /// connection cannot be established.
    fn connect(&self, chain: &ChainKey) -> Result<Arc<dyn ChainClient>>;

    /// Whether a client for `chain` could both connect and sign.
    ///
    /// Best-effort operations check this before attempting writes on a
    /// remote chain, rather than failing the surrounding run.
    fn can_transact(&self, chain: &ChainKey) -> bool;
}

/// Trait for time-based operations.
///
/// This trait abstracts sleep and time queries, enabling fast-forward
/// testing where tests can instantly advance through inter-chain pacing
/// delays without actually waiting.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Asynchronously sleeps for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Returns the current instant in time.
    fn now(&self) -> Instant;
}
