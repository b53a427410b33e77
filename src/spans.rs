//! OpenTelemetry span helpers for deployment operations
//!
//! This module provides orthogonal span instrumentation following production
//! best practices: static span names, structured attributes, and separation
//! from business logic.
//!
//! # Usage
//!
//! These span helpers are used internally by the deploy, wiring, and
//! ownership drivers but are exposed publicly for advanced users who need
//! custom instrumentation or want to integrate with existing OpenTelemetry
//! setups.
//!
//! # Example
//!
//! ```rust,no_run
//! use tix_ops::spans;
//! use tix_ops::ChainKey;
//!
//! let span = spans::deploy_chain(&ChainKey::new("base-sepolia"), 40245);
//! let _guard = span.enter();
//! // Your custom deployment logic here
//! ```

use alloy_primitives::Address;
use tracing::Span;
use url::Url;

use crate::chain::ChainKey;

/// Create span for fetching the chain registry from the metadata service.
///
/// Parent: Top-level command span (auto-attached by tracing)
/// Children: HTTP client request spans (from reqwest instrumentation)
#[inline]
pub fn fetch_registry(url: &Url) -> Span {
    tracing::info_span!(
        "tix_ops.fetch_registry",
        url = %url,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for resolving one chain's registry entry.
///
/// Parent: Command span or tix_ops.deploy_run
/// Children: None
#[inline]
pub fn resolve_chain(chain: &ChainKey) -> Span {
    tracing::info_span!(
        "tix_ops.resolve_chain",
        chain = %chain,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a full deploy batch.
///
/// Parent: Top-level command span
/// Children: tix_ops.deploy_chain (one per target)
#[inline]
pub fn deploy_run(mode: &str, chain_count: usize) -> Span {
    tracing::info_span!(
        "tix_ops.deploy_run",
        mode = mode,
        chain_count = chain_count,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for deploying the full stack to one chain.
///
/// Parent: tix_ops.deploy_run
/// Children: tix_ops.deploy_contract, tix_ops.wire_peers
#[inline]
pub fn deploy_chain(chain: &ChainKey, eid: u32) -> Span {
    tracing::info_span!(
        "tix_ops.deploy_chain",
        chain = %chain,
        eid = eid,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a single contract deployment.
///
/// Parent: tix_ops.deploy_chain
/// Children: Provider RPC calls (from alloy instrumentation)
#[inline]
pub fn deploy_contract(name: &str, chain: &ChainKey) -> Span {
    tracing::debug_span!(
        "tix_ops.deploy_contract",
        contract = name,
        chain = %chain,
    )
}

/// Create span for cross-wiring a freshly deployed adapter against the
/// recorded fleet.
///
/// Parent: tix_ops.deploy_chain
/// Children: tix_ops.set_peer (one per direction per remote)
#[inline]
pub fn wire_peers(chain: &ChainKey, adapter: &Address) -> Span {
    tracing::info_span!(
        "tix_ops.wire_peers",
        chain = %chain,
        adapter = %adapter,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for one peer registration attempt.
///
/// Parent: tix_ops.wire_peers
/// Children: Provider RPC calls
#[inline]
pub fn set_peer(remote_chain: &ChainKey, eid: u32, direction: &str) -> Span {
    tracing::debug_span!(
        "tix_ops.set_peer",
        remote_chain = %remote_chain,
        eid = eid,
        direction = direction,
    )
}

/// Create span for a wiring status sweep over the recorded adapters.
///
/// Parent: Top-level command span
/// Children: tix_ops.check_adapter (one per adapter row)
#[inline]
pub fn wired_status(adapter_count: usize) -> Span {
    tracing::info_span!(
        "tix_ops.wired_status",
        adapter_count = adapter_count,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for checking one adapter's send-library wiring.
///
/// Parent: tix_ops.wired_status
/// Children: Provider RPC calls
#[inline]
pub fn check_adapter(chain: &ChainKey, adapter: &Address) -> Span {
    tracing::info_span!(
        "tix_ops.check_adapter",
        chain = %chain,
        adapter = %adapter,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for an ownership sweep across the ledgers.
///
/// Parent: Top-level command span
/// Children: tix_ops.transfer_ownership (one per contract)
#[inline]
pub fn sweep_ownership(scope: &str, final_owner: &Address) -> Span {
    tracing::info_span!(
        "tix_ops.sweep_ownership",
        scope = scope,
        final_owner = %final_owner,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for one ownership transfer attempt.
///
/// Parent: tix_ops.sweep_ownership
/// Children: Provider RPC calls
#[inline]
pub fn transfer_ownership(label: &str, contract: &Address, chain: &ChainKey) -> Span {
    tracing::info_span!(
        "tix_ops.transfer_ownership",
        label = label,
        contract = %contract,
        chain = %chain,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a workflow deployment batch.
///
/// Parent: Top-level command span
/// Children: tix_ops.deploy_contract (one per chain)
#[inline]
pub fn deploy_workflows(chain_count: usize) -> Span {
    tracing::info_span!(
        "tix_ops.deploy_workflows",
        chain_count = chain_count,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Record error attributes on the current span.
///
/// Follows OpenTelemetry semantic conventions for error tracking:
/// - error.type: The error type/variant
/// - error.message: Human-readable error message
/// - error.source: Optional source error from the chain
///
/// # Example
///
/// ```rust,no_run
/// use tix_ops::spans;
/// use tix_ops::OpsError;
///
/// # fn example() -> Result<(), OpsError> {
/// let span = tracing::info_span!("tix_ops.operation");
/// let _guard = span.enter();
///
/// let result = some_operation();
/// if let Err(ref e) = result {
///     spans::record_error(e);
/// }
/// result
/// # }
/// # fn some_operation() -> Result<(), OpsError> { Ok(()) }
/// ```
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = tracing::Span::current();
    current_span.record(
        "error.type",
        error.to_string().split(':').next().unwrap_or("Unknown"),
    );
    current_span.record("error.message", error.to_string());
    current_span.record("otel.status_code", "ERROR");

    // Record error chain if available
    if let Some(source) = error.source() {
        current_span.record("error.source", source.to_string());
    }
}

/// Record error attributes with custom context on the current span.
///
/// This variant allows adding additional context fields to the error.
///
/// # Example
///
/// ```rust,no_run
/// use tix_ops::spans;
///
/// # fn example() {
/// let span = tracing::info_span!("tix_ops.operation");
/// let _guard = span.enter();
///
/// if let Err(e) = some_operation() {
///     spans::record_error_with_context(
///         "TransactionFailed",
///         &format!("Failed to submit transaction: {}", e),
///         Some("Transaction may have been dropped from mempool"),
///     );
/// }
/// # }
/// # fn some_operation() -> Result<(), String> { Ok(()) }
/// ```
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
