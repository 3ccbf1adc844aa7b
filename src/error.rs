use thiserror::Error;

/// Main error type for the whale-transfer monitor
#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Price feed error: {0}")]
    PriceFeed(#[from] PriceFeedError),

    #[error("Token registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Errors from the Solana JSON-RPC transport
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC method error: code={code}, message={message}")]
    Method { code: i64, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Errors from the USD price feed
#[derive(Error, Debug)]
pub enum PriceFeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Price feed returned status {status}")]
    Status { status: u16 },

    #[error("Malformed price response: {0}")]
    Malformed(String),
}

/// Errors raised while loading the token registry
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read token list file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token list parsing failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Token list source returned status {status}")]
    Status { status: u16 },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parsing failed: {0}")]
    Parsing(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
}

/// Errors surfaced by a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Block scan failed: {0}")]
    Scan(#[from] RpcError),

    #[error("Request deadline of {seconds}s exceeded")]
    DeadlineExceeded { seconds: u64 },
}

/// Errors from the HTTP serving layer
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Server error: {0}")]
    Server(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, WatcherError>;
