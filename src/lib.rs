//! # tix-ops
//!
//! Deployment and operations toolkit for the TIX token's cross-chain fleet.
//!
//! The toolkit drives one token, two service deployer contracts and one
//! read adapter per chain across thirty-odd EVM networks. Chain facts come
//! from the messaging vendor's registry, every deployed address lands in an
//! append-only CSV ledger, and every command consults that ledger first, so
//! a failed batch is rerun rather than repaired by hand.
//!
//! ## Quick Start: deploying
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tix_ops::config::OpsConfig;
//! use tix_ops::deploy::{ArtifactStore, DeployRunner};
//! use tix_ops::ledger::LedgerSet;
//! use tix_ops::providers::{AlloyConnector, TokioClock};
//! use tix_ops::registry::Registry;
//!
//! # async fn example() -> Result<(), tix_ops::OpsError> {
//! let config = OpsConfig::from_env()?;
//! let registry = Registry::load(&config.snapshot_path)?;
//!
//! let runner = DeployRunner::builder()
//!     .config(config.clone())
//!     .registry(registry)
//!     .ledgers(LedgerSet::new(&config.ledger_dir))
//!     .artifacts(ArtifactStore::new(&config.artifacts_dir))
//!     .connector(Arc::new(AlloyConnector::new(config.clone())))
//!     .clock(Arc::new(TokioClock::new()))
//!     .build();
//!
//! let report = runner.run(&config.target_chains()).await;
//! assert!(report.all_succeeded());
//! # Ok(())
//! # }
//! ```
//!
//! ## Quick Start: checking wiring
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tix_ops::config::OpsConfig;
//! use tix_ops::ledger::LedgerSet;
//! use tix_ops::providers::AlloyConnector;
//! use tix_ops::registry::Registry;
//! use tix_ops::status::WiredStatusChecker;
//!
//! # async fn example() -> Result<(), tix_ops::OpsError> {
//! let config = OpsConfig::from_env()?;
//! let checker = WiredStatusChecker::builder()
//!     .registry(Registry::load(&config.snapshot_path)?)
//!     .ledgers(LedgerSet::new(&config.ledger_dir))
//!     .connector(Arc::new(AlloyConnector::new(config.clone())))
//!     .maybe_environment(config.environment)
//!     .build();
//!
//! let report = checker.check().await?;
//! for adapter in &report.adapters {
//!     println!("{}: {:?}", adapter.chain, adapter.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Idempotent deployments** driven by append-only CSV ledgers
//! - **Registry-driven chain resolution** preferring v2 entries with a v1 fallback
//! - **Type-safe contract interactions** using Alloy
//! - **Builder pattern** for orchestrator construction
//! - **Scripted fakes** for exercising every flow without an RPC endpoint
//!
//! ## Public API
//!
//! - [`OpsConfig`] - environment-driven configuration for every command
//! - [`Registry`] and [`ResolvedChain`] - registry snapshots and per-chain resolution
//! - [`deploy::DeployRunner`] and [`deploy::ChainDeployer`] - batch and per-chain deployment
//! - [`deploy::PeerWirer`] - bidirectional cross-chain peer wiring
//! - [`status::WiredStatusChecker`] - read-only wiring gate for CI
//! - [`ownership::OwnershipSweeper`] and [`ownership::OwnerCheck`] - ownership sweeps and inspection
//! - [`LedgerSet`] - the append-only CSV ledgers
//! - [`OpsError`] and [`Result`] - error types for error handling

pub mod chain;
pub mod config;
pub mod contracts;
pub mod deploy;
pub mod error;
pub mod ledger;
pub mod ownership;
pub mod providers;
pub mod registry;
pub mod status;
pub mod traits;

// Convenience re-exports for the types nearly every caller touches
pub use chain::{ChainKey, Eid, Environment};
pub use config::OpsConfig;
pub use error::{OpsError, Result};
pub use ledger::LedgerSet;
pub use registry::{Registry, ResolvedChain};

// Public module for advanced users who need custom instrumentation
pub mod spans;

// Scripted fakes for exercising flows without live RPC endpoints
pub mod testing;
