//! Deployment bindings for the service deployer pair
//!
//! Both the standard and the upgradeable deployer take the token address as
//! their only constructor argument. After deployment they are operated
//! through the token's service registry, so no call bindings live here.

use alloy_primitives::Address;
use alloy_sol_types::{sol, SolConstructor};

/// Encodes the constructor arguments both deployer variants share.
pub fn constructor_args(token: Address) -> Vec<u8> {
    ServiceDeployer::constructorCall { tixToken: token }.abi_encode()
}

sol!(
    #[allow(missing_docs)]
    contract ServiceDeployer {
        constructor(address tixToken);
    }
);
