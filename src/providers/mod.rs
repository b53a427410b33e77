//! Production implementations of the toolkit's trait abstractions.
//!
//! This module provides the "real" implementations of the traits defined in
//! [`crate::traits`] that talk to actual blockchain networks and the system
//! clock.
//!
//! Users running the tooling against live chains will typically use these
//! providers, while test code will implement custom fakes.

mod alloy;
mod tokio_clock;

pub use self::alloy::{AlloyChainClient, AlloyConnector};
pub use self::tokio_clock::TokioClock;
