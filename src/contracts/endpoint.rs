// SPDX-FileCopyrightText: 2026 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Messaging endpoint bindings
//!
//! Only the send-library query is bound: it is how the status check tells a
//! wired adapter apart from one the endpoint has never been configured for.

use alloy_network::Ethereum;
use alloy_primitives::Address;
use alloy_provider::Provider;
use alloy_sol_types::sol;
use tracing::{debug, info};

use EndpointV2::EndpointV2Instance;

/// Revert selector of `LZ_DefaultSendLibUnavailable()`, the endpoint's
/// answer when no send library has been configured for an application.
pub const DEFAULT_SEND_LIB_UNAVAILABLE: [u8; 4] = [0x6c, 0x1c, 0xcd, 0xb5];

/// Type-safe wrapper for the messaging endpoint contract.
#[derive(Debug, Clone)]
pub struct EndpointContract<P: Provider<Ethereum>> {
    instance: EndpointV2Instance<P>,
}

impl<P: Provider<Ethereum> + Clone> EndpointContract<P> {
    /// Creates a new wrapper for the endpoint at the given address.
    pub fn new(address: Address, provider: P) -> Self {
        debug!(contract_address = %address, event = "endpoint_contract_initialized");
        Self {
            instance: EndpointV2::new(address, provider),
        }
    }

    /// The send library configured for `sender` toward `dst_eid`, or `None`
    /// when the endpoint reports that none has been set.
    pub async fn send_library(
        &self,
        sender: Address,
        dst_eid: u32,
    ) -> Result<Option<Address>, alloy_contract::Error> {
        debug!(sender = %sender, dst_eid, event = "checking_send_library");
        match self.instance.getSendLibrary(sender, dst_eid).call().await {
            Ok(library) => {
                info!(sender = %sender, dst_eid, library = %library, event = "send_library_retrieved");
                Ok(Some(library))
            }
            Err(error) if is_send_lib_unset(&error) => {
                info!(sender = %sender, dst_eid, event = "send_library_unset");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Returns the contract address.
    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

fn is_send_lib_unset(error: &alloy_contract::Error) -> bool {
    error
        .as_revert_data()
        .is_some_and(|data| has_unavailable_selector(&data))
}

fn has_unavailable_selector(data: &[u8]) -> bool {
    data.starts_with(&DEFAULT_SEND_LIB_UNAVAILABLE)
}

// Library management surface of the messaging endpoint
sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract EndpointV2 {
        function getSendLibrary(address sender, uint32 dstEid) external view returns (address);
        function getReceiveLibrary(address receiver, uint32 srcEid) external view returns (address);
        function setSendLibrary(address oapp, uint32 eid, address newLib) external;
        function setReceiveLibrary(address oapp, uint32 eid, address newLib, uint256 gracePeriod) external;
    }
);
