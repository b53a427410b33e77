use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpsError {
    #[error("Chain not supported: {chain}")]
    ChainNotSupported { chain: String },

    #[error("No registry entry found for chain: {chain}")]
    RegistryEntryNotFound { chain: String },

    #[error("Invalid registry entry for {chain}: {reason}")]
    InvalidRegistryEntry { chain: String, reason: String },

    #[error("No read library published for {chain}; a version 2 entry must carry one")]
    MissingReadLibrary { chain: String },

    #[error("Registry snapshot not found at {path}; run fetch-metadata first")]
    SnapshotNotFound { path: String },

    #[error("Missing required environment variable: {name}")]
    MissingEnv { name: &'static str },

    #[error("No RPC URL available for chain: {chain}")]
    MissingRpcUrl { chain: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Ledger error: {reason}")]
    Ledger { reason: String },

    #[error("Artifact error: {reason}")]
    Artifact { reason: String },

    #[error("Deployment failed: {reason}")]
    DeploymentFailed { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("Contract error: {0}")]
    Contract(#[from] alloy_contract::Error),

    #[error("ABI error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Signer error: {0}")]
    Signer(#[from] alloy_signer_local::LocalSignerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, OpsError>;
