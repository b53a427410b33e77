//! Test utilities and fake implementations for the deployment tooling
//!
//! This module provides fake implementations of the toolkit's traits that
//! enable comprehensive testing without any RPC traffic. State is scripted
//! up front: which addresses carry bytecode, what deployments will produce,
//! who owns what, and which operations should fail.
//!
//! These fakes are designed to be used in integration tests to verify
//! deployment idempotency, wiring order, status classification, and the
//! ownership sweep's skip conditions.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::chain::ChainKey;
use crate::contracts::tix_token::service_id;
use crate::error::{OpsError, Result};
use crate::traits::{ChainClient, ChainConnector, Clock};

/// Role id every fake token reports for its service worker role.
pub const SERVICE_WORKER_ROLE: B256 = B256::repeat_byte(0x57);

// ============================================================================
// Fake Chain Client
// ============================================================================

/// A transaction the fake client accepted, in submission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FakeTransaction {
    Deploy {
        address: Address,
    },
    GrantRole {
        token: Address,
        role: B256,
        account: Address,
    },
    RegisterService {
        token: Address,
        name: String,
        description: String,
        service: Address,
        owner: Address,
    },
    SetPeer {
        adapter: Address,
        eid: u32,
        peer: B256,
    },
    TransferOwnership {
        contract: Address,
        new_owner: Address,
        gas_limit: u64,
    },
}

/// A fake chain client backed by scripted state.
///
/// This allows testing scenarios like:
/// - Ledger addresses with or without live bytecode
/// - Deployments that produce known addresses, or fail
/// - Peer registries and send libraries in any starting state
/// - Ownership reads, estimations, and transfers that revert
#[derive(Clone, Debug)]
pub struct FakeChainClient {
    chain: ChainKey,
    signer: Arc<Mutex<Option<Address>>>,
    chain_id: Arc<Mutex<u64>>,
    code: Arc<Mutex<HashSet<Address>>>,
    deployments: Arc<Mutex<VecDeque<Address>>>,
    services: Arc<Mutex<HashMap<(Address, B256), Address>>>,
    peers: Arc<Mutex<HashMap<(Address, u32), B256>>>,
    send_libraries: Arc<Mutex<HashMap<(Address, u32), Option<Address>>>>,
    owners: Arc<Mutex<HashMap<Address, Address>>>,
    pending_owners: Arc<Mutex<HashMap<Address, Address>>>,
    gas_estimates: Arc<Mutex<HashMap<Address, u64>>>,
    transactions: Arc<Mutex<Vec<FakeTransaction>>>,
    fail_deploys: Arc<Mutex<bool>>,
    fail_service_lookups: Arc<Mutex<bool>>,
    fail_contracts: Arc<Mutex<HashSet<Address>>>,
    fail_transfer_reasons: Arc<Mutex<HashMap<Address, String>>>,
}

impl FakeChainClient {
    pub fn new(chain: ChainKey) -> Self {
        Self {
            chain,
            signer: Arc::new(Mutex::new(None)),
            chain_id: Arc::new(Mutex::new(1)),
            code: Arc::new(Mutex::new(HashSet::new())),
            deployments: Arc::new(Mutex::new(VecDeque::new())),
            services: Arc::new(Mutex::new(HashMap::new())),
            peers: Arc::new(Mutex::new(HashMap::new())),
            send_libraries: Arc::new(Mutex::new(HashMap::new())),
            owners: Arc::new(Mutex::new(HashMap::new())),
            pending_owners: Arc::new(Mutex::new(HashMap::new())),
            gas_estimates: Arc::new(Mutex::new(HashMap::new())),
            transactions: Arc::new(Mutex::new(Vec::new())),
            fail_deploys: Arc::new(Mutex::new(false)),
            fail_service_lookups: Arc::new(Mutex::new(false)),
            fail_contracts: Arc::new(Mutex::new(HashSet::new())),
            fail_transfer_reasons: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sets the signer address the client reports and sends from.
    pub fn set_signer(&self, signer: Address) {
        *self.signer.lock().unwrap() = Some(signer);
    }

    /// Sets the chain id the RPC node reports.
    pub fn set_chain_id(&self, chain_id: u64) {
        *self.chain_id.lock().unwrap() = chain_id;
    }

    /// Marks an address as carrying deployed bytecode.
    pub fn add_code(&self, address: Address) {
        self.code.lock().unwrap().insert(address);
    }

    /// Queues the address the next contract creation will produce.
    ///
    /// Deployed addresses are also marked as carrying bytecode.
    pub fn queue_deployment(&self, address: Address) {
        self.deployments.lock().unwrap().push_back(address);
    }

    /// Seeds the service registry of `token` with a named service.
    pub fn set_service(&self, token: Address, name: &str, service: Address) {
        self.services
            .lock()
            .unwrap()
            .insert((token, service_id(name)), service);
    }

    /// Seeds the peer an adapter has registered for an endpoint id.
    pub fn seed_peer(&self, adapter: Address, eid: u32, peer: B256) {
        self.peers.lock().unwrap().insert((adapter, eid), peer);
    }

    /// Scripts the send library the endpoint reports for an application.
    ///
    /// `None` models the endpoint's "no library configured" answer.
    pub fn set_send_library(&self, oapp: Address, eid: u32, library: Option<Address>) {
        self.send_libraries
            .lock()
            .unwrap()
            .insert((oapp, eid), library);
    }

    /// Sets the owner an ownable contract reports.
    pub fn set_owner(&self, contract: Address, owner: Address) {
        self.owners.lock().unwrap().insert(contract, owner);
    }

    /// Sets a pending two-step handover on a contract.
    pub fn set_pending_owner(&self, contract: Address, pending: Address) {
        self.pending_owners.lock().unwrap().insert(contract, pending);
    }

    /// Scripts a successful gas estimation for ownership transfers of
    /// `contract`. Contracts without one reject the estimation.
    pub fn set_gas_estimate(&self, contract: Address, gas: u64) {
        self.gas_estimates.lock().unwrap().insert(contract, gas);
    }

    /// Makes every subsequent contract creation fail.
    pub fn fail_deploys(&self) {
        *self.fail_deploys.lock().unwrap() = true;
    }

    /// Makes service registry lookups fail.
    pub fn fail_service_lookups(&self) {
        *self.fail_service_lookups.lock().unwrap() = true;
    }

    /// Makes reads and writes against `address` fail.
    pub fn fail_contract(&self, address: Address) {
        self.fail_contracts.lock().unwrap().insert(address);
    }

    /// Makes ownership transfers of `contract` fail with `reason`.
    pub fn fail_transfer(&self, contract: Address, reason: &str) {
        self.fail_transfer_reasons
            .lock()
            .unwrap()
            .insert(contract, reason.to_string());
    }

    /// The transactions accepted so far, in submission order.
    pub fn transactions(&self) -> Vec<FakeTransaction> {
        self.transactions.lock().unwrap().clone()
    }

    fn record(&self, transaction: FakeTransaction) {
        self.transactions.lock().unwrap().push(transaction);
    }

    fn check_contract(&self, address: Address, action: &str) -> Result<()> {
        if self.fail_contracts.lock().unwrap().contains(&address) {
            return Err(OpsError::TransactionFailed {
                reason: format!("scripted {action} failure at {address}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for FakeChainClient {
    fn chain(&self) -> &ChainKey {
        &self.chain
    }

    fn signer_address(&self) -> Option<Address> {
        *self.signer.lock().unwrap()
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn has_code(&self, address: Address) -> Result<bool> {
        Ok(self.code.lock().unwrap().contains(&address))
    }

    async fn deploy_contract(&self, _code: Bytes) -> Result<Address> {
        if *self.fail_deploys.lock().unwrap() {
            return Err(OpsError::DeploymentFailed {
                reason: "scripted deploy failure".to_string(),
            });
        }
        let address = self.deployments.lock().unwrap().pop_front().ok_or_else(|| {
            OpsError::DeploymentFailed {
                reason: "no deployment scripted".to_string(),
            }
        })?;
        self.code.lock().unwrap().insert(address);
        self.record(FakeTransaction::Deploy { address });
        Ok(address)
    }

    async fn service_worker_role(&self, token: Address) -> Result<B256> {
        self.check_contract(token, "role read")?;
        Ok(SERVICE_WORKER_ROLE)
    }

    async fn grant_role(&self, token: Address, role: B256, account: Address) -> Result<()> {
        self.check_contract(token, "grant role")?;
        self.record(FakeTransaction::GrantRole {
            token,
            role,
            account,
        });
        Ok(())
    }

    async fn register_service(
        &self,
        token: Address,
        name: &str,
        description: &str,
        service: Address,
        owner: Address,
    ) -> Result<()> {
        self.check_contract(token, "register service")?;
        self.services
            .lock()
            .unwrap()
            .insert((token, service_id(name)), service);
        self.record(FakeTransaction::RegisterService {
            token,
            name: name.to_string(),
            description: description.to_string(),
            service,
            owner,
        });
        Ok(())
    }

    async fn service(&self, token: Address, id: B256) -> Result<Address> {
        if *self.fail_service_lookups.lock().unwrap() {
            return Err(OpsError::TransactionFailed {
                reason: "scripted service lookup failure".to_string(),
            });
        }
        Ok(self
            .services
            .lock()
            .unwrap()
            .get(&(token, id))
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn peer(&self, adapter: Address, eid: u32) -> Result<B256> {
        self.check_contract(adapter, "peer read")?;
        Ok(self
            .peers
            .lock()
            .unwrap()
            .get(&(adapter, eid))
            .copied()
            .unwrap_or(B256::ZERO))
    }

    async fn set_peer(&self, adapter: Address, eid: u32, peer: B256) -> Result<()> {
        self.check_contract(adapter, "set peer")?;
        self.peers.lock().unwrap().insert((adapter, eid), peer);
        self.record(FakeTransaction::SetPeer { adapter, eid, peer });
        Ok(())
    }

    async fn send_library(
        &self,
        endpoint: Address,
        oapp: Address,
        eid: u32,
    ) -> Result<Option<Address>> {
        self.check_contract(endpoint, "send library read")?;
        Ok(self
            .send_libraries
            .lock()
            .unwrap()
            .get(&(oapp, eid))
            .copied()
            .flatten())
    }

    async fn owner(&self, contract: Address) -> Result<Address> {
        self.check_contract(contract, "owner read")?;
        self.owners
            .lock()
            .unwrap()
            .get(&contract)
            .copied()
            .ok_or_else(|| OpsError::TransactionFailed {
                reason: format!("owner read reverted at {contract}"),
            })
    }

    async fn pending_owner(&self, contract: Address) -> Option<Address> {
        self.pending_owners.lock().unwrap().get(&contract).copied()
    }

    async fn estimate_transfer_ownership(
        &self,
        contract: Address,
        _new_owner: Address,
    ) -> Result<u64> {
        self.gas_estimates
            .lock()
            .unwrap()
            .get(&contract)
            .copied()
            .ok_or_else(|| OpsError::TransactionFailed {
                reason: format!("estimation rejected for {contract}"),
            })
    }

    async fn transfer_ownership(
        &self,
        contract: Address,
        new_owner: Address,
        gas_limit: u64,
    ) -> Result<()> {
        if let Some(reason) = self.fail_transfer_reasons.lock().unwrap().get(&contract) {
            return Err(OpsError::TransactionFailed {
                reason: reason.clone(),
            });
        }
        self.owners.lock().unwrap().insert(contract, new_owner);
        self.record(FakeTransaction::TransferOwnership {
            contract,
            new_owner,
            gas_limit,
        });
        Ok(())
    }
}

// ============================================================================
// Fake Connector
// ============================================================================

/// A fake connector serving pre-registered [`FakeChainClient`]s.
///
/// This allows testing scenarios like:
/// - Remote chains that are unreachable mid-run
/// - Runs where some chains can read but not sign
#[derive(Clone, Debug, Default)]
pub struct FakeConnector {
    clients: Arc<Mutex<HashMap<ChainKey, Arc<FakeChainClient>>>>,
    unreachable: Arc<Mutex<HashSet<ChainKey>>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client to be served for its chain.
    pub fn add_client(&self, client: Arc<FakeChainClient>) {
        self.clients
            .lock()
            .unwrap()
            .insert(client.chain().clone(), client);
    }

    /// Makes connections to `chain` fail even if a client is registered.
    pub fn mark_unreachable(&self, chain: &ChainKey) {
        self.unreachable.lock().unwrap().insert(chain.clone());
    }

    /// The registered client for `chain`, for assertions.
    pub fn client(&self, chain: &ChainKey) -> Option<Arc<FakeChainClient>> {
        self.clients.lock().unwrap().get(chain).cloned()
    }
}

impl ChainConnector for FakeConnector {
    fn connect(&self, chain: &ChainKey) -> Result<Arc<dyn ChainClient>> {
        if self.unreachable.lock().unwrap().contains(chain) {
            return Err(OpsError::MissingRpcUrl {
                chain: chain.to_string(),
            });
        }
        self.clients
            .lock()
            .unwrap()
            .get(chain)
            .cloned()
            .map(|client| client as Arc<dyn ChainClient>)
            .ok_or_else(|| OpsError::MissingRpcUrl {
                chain: chain.to_string(),
            })
    }

    fn can_transact(&self, chain: &ChainKey) -> bool {
        if self.unreachable.lock().unwrap().contains(chain) {
            return false;
        }
        self.clients
            .lock()
            .unwrap()
            .get(chain)
            .is_some_and(|client| client.signer_address().is_some())
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A fake clock that allows fast-forwarding time in tests.
///
/// This enables testing the pacing between chains without actually waiting.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock().unwrap();
        *time += duration;
    }

    /// Get the total time "slept" by this clock
    pub fn total_sleep_time(&self) -> Duration {
        self.sleep_log.lock().unwrap().iter().sum()
    }

    /// Get the number of times sleep was called
    pub fn sleep_count(&self) -> usize {
        self.sleep_log.lock().unwrap().len()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleep_log.lock().unwrap().push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}
