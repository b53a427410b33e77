//! Cross-chain read adapter bindings
//!
//! The adapter connects the token to the messaging endpoint. Peers are
//! stored per destination endpoint id as 32-byte values; an unset peer
//! reads as zero.

use alloy_network::Ethereum;
use alloy_primitives::{Address, B256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolConstructor};
use tracing::{debug, info};

use TixReadAdapter::TixReadAdapterInstance;

/// The 32-byte peer encoding of an adapter address, left-padded with zeros.
pub fn encode_peer(adapter: Address) -> B256 {
    adapter.into_word()
}

/// Encodes the adapter's constructor arguments.
pub fn constructor_args(endpoint: Address, token: Address) -> Vec<u8> {
    TixReadAdapter::constructorCall {
        endpoint,
        tixToken: token,
    }
    .abi_encode()
}

/// Type-safe wrapper for the read adapter contract.
#[derive(Debug, Clone)]
pub struct TixReadAdapterContract<P: Provider<Ethereum>> {
    instance: TixReadAdapterInstance<P>,
}

impl<P: Provider<Ethereum> + Clone> TixReadAdapterContract<P> {
    /// Creates a new wrapper for the adapter at the given address.
    pub fn new(address: Address, provider: P) -> Self {
        debug!(contract_address = %address, event = "read_adapter_contract_initialized");
        Self {
            instance: TixReadAdapter::new(address, provider),
        }
    }

    /// The peer registered for a destination endpoint id, zero when unset.
    pub async fn peer(&self, eid: u32) -> Result<B256, alloy_contract::Error> {
        debug!(eid, event = "checking_peer");
        let peer = self.instance.peers(eid).call().await?;
        info!(eid, peer = %peer, event = "peer_retrieved");
        Ok(peer)
    }

    /// Builds an unsent transaction registering a peer for an endpoint id.
    pub fn set_peer_transaction(&self, from: Address, eid: u32, peer: B256) -> TransactionRequest {
        info!(eid, peer = %peer, event = "building_set_peer_transaction");
        self.instance
            .setPeer(eid, peer)
            .from(from)
            .into_transaction_request()
    }

    /// Returns the contract address.
    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

// Peer management surface of the adapter
sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract TixReadAdapter {
        constructor(address endpoint, address tixToken);

        function peers(uint32 eid) external view returns (bytes32);
        function setPeer(uint32 eid, bytes32 peer) external;
        function READ_CHANNEL() external view returns (uint32);
    }
);
