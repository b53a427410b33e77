// SPDX-FileCopyrightText: 2026 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Contract deployment and peer wiring
//!
//! The deployment surface splits into the per-chain sequence
//! ([`deployer`]), the batch driver that walks chains through it
//! ([`runner`]), peer reconciliation across chains ([`wirer`]), the
//! standalone workflow contract ([`workflows`]), and compiled artifact
//! loading ([`artifact`]).

pub mod artifact;
pub mod deployer;
pub mod runner;
pub mod wirer;
pub mod workflows;

pub use artifact::ArtifactStore;
pub use deployer::{ChainDeployer, ChainDeployment};
pub use runner::{ChainOutcome, DeployReport, DeployRunner, DeployStatus};
pub use wirer::{PeerAction, PeerDirection, PeerOutcome, PeerWirer, WireSummary};
pub use workflows::{
    WorkflowDeployer, WorkflowOutcome, WorkflowReport, WorkflowStatus, DEFAULT_WORKFLOW_CHAINS,
};
