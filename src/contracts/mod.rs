//! Contract bindings for the omnichain token stack
//!
//! This module contains Alloy-generated bindings and thin instrumented
//! wrappers for the contracts the toolkit deploys and operates.
//!
//! ## Public API
//!
//! - [`TixTokenContract`](tix_token::TixTokenContract): token plus its service registry
//! - [`TixReadAdapterContract`](read_adapter::TixReadAdapterContract): peer wiring
//! - [`EndpointContract`](endpoint::EndpointContract): messaging endpoint queries
//! - [`OwnableContract`](ownable::OwnableContract): ownership reads and transfers

pub mod endpoint;
pub mod ownable;
pub mod read_adapter;
pub mod service_deployer;
pub mod tix_token;
