use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub rpc: RpcConfig,
    pub price_feed: PriceFeedConfig,
    pub registry: RegistryConfig,
    pub scan: ScanConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Solana RPC client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Solana JSON-RPC endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// USD price feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    /// Price feed base URL (CoinGecko-compatible API)
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Token registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Token list source: an http(s) URL or a local file path
    pub token_list_source: String,
}

/// Block scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Number of recent slots to scan per request
    pub window_size: u64,
    /// Minimum USD value for a transfer to be reported (inclusive)
    pub threshold_usd: f64,
    /// Wall-clock deadline for one pipeline run in seconds
    pub deadline_seconds: u64,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server host/bind address
    pub host: String,
    /// Server port
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            price_feed: PriceFeedConfig::default(),
            registry: RegistryConfig::default(),
            scan: ScanConfig::default(),
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mainnet-beta.solana.com".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.coingecko.com/api/v3".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            token_list_source:
                "https://raw.githubusercontent.com/solana-labs/token-list/main/src/tokens/solana.tokenlist.json"
                    .to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            threshold_usd: 10_000.0,
            deadline_seconds: 25,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    /// Environment variables take precedence over file values
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file().unwrap_or_default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file() -> Result<Self, ConfigError> {
        let config_path = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if !Path::new(&config_path).exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ConfigError::FileNotFound(config_path.clone()))?;
        let config: AppConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parsing(e.to_string()))?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // RPC configuration
        if let Ok(endpoint) = env::var("SOLANA_RPC_URL") {
            self.rpc.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("RPC_TIMEOUT_SECONDS") {
            self.rpc.timeout_seconds =
                timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "RPC_TIMEOUT_SECONDS".to_string(),
                    value: timeout,
                })?;
        }

        // Price feed configuration
        if let Ok(endpoint) = env::var("PRICE_FEED_URL") {
            self.price_feed.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("PRICE_FEED_TIMEOUT_SECONDS") {
            self.price_feed.timeout_seconds =
                timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "PRICE_FEED_TIMEOUT_SECONDS".to_string(),
                    value: timeout,
                })?;
        }

        // Registry configuration
        if let Ok(source) = env::var("TOKEN_LIST_SOURCE") {
            self.registry.token_list_source = source;
        }

        // Scan configuration
        if let Ok(window) = env::var("SCAN_WINDOW_SIZE") {
            self.scan.window_size = window.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SCAN_WINDOW_SIZE".to_string(),
                value: window,
            })?;
        }
        if let Ok(threshold) = env::var("USD_THRESHOLD") {
            self.scan.threshold_usd =
                threshold.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "USD_THRESHOLD".to_string(),
                    value: threshold,
                })?;
        }
        if let Ok(deadline) = env::var("SCAN_DEADLINE_SECONDS") {
            self.scan.deadline_seconds =
                deadline.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "SCAN_DEADLINE_SECONDS".to_string(),
                    value: deadline,
                })?;
        }

        // API configuration
        if let Ok(host) = env::var("API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = env::var("API_PORT") {
            self.api.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "API_PORT".to_string(),
                value: port,
            })?;
        }

        // Logging configuration
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate endpoint URLs
        if !self.rpc.endpoint.starts_with("http://") && !self.rpc.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(self.rpc.endpoint.clone()));
        }
        if !self.price_feed.endpoint.starts_with("http://")
            && !self.price_feed.endpoint.starts_with("https://")
        {
            return Err(ConfigError::InvalidUrl(self.price_feed.endpoint.clone()));
        }

        // Validate timeout values
        if self.rpc.timeout_seconds == 0 || self.rpc.timeout_seconds > 300 {
            return Err(ConfigError::InvalidValue {
                key: "rpc.timeout_seconds".to_string(),
                value: self.rpc.timeout_seconds.to_string(),
            });
        }
        if self.price_feed.timeout_seconds == 0 || self.price_feed.timeout_seconds > 300 {
            return Err(ConfigError::InvalidValue {
                key: "price_feed.timeout_seconds".to_string(),
                value: self.price_feed.timeout_seconds.to_string(),
            });
        }

        // Validate registry source
        if self.registry.token_list_source.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "registry.token_list_source".to_string(),
                value: self.registry.token_list_source.clone(),
            });
        }

        // Validate scan window (public RPC endpoints rate-limit aggressively)
        if self.scan.window_size == 0 || self.scan.window_size > 100 {
            return Err(ConfigError::InvalidValue {
                key: "scan.window_size".to_string(),
                value: self.scan.window_size.to_string(),
            });
        }

        // Validate USD threshold
        if !self.scan.threshold_usd.is_finite() || self.scan.threshold_usd < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "scan.threshold_usd".to_string(),
                value: self.scan.threshold_usd.to_string(),
            });
        }

        // Validate deadline
        if self.scan.deadline_seconds == 0 || self.scan.deadline_seconds > 300 {
            return Err(ConfigError::InvalidValue {
                key: "scan.deadline_seconds".to_string(),
                value: self.scan.deadline_seconds.to_string(),
            });
        }

        // Validate API port
        if self.api.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "api.port".to_string(),
                value: self.api.port.to_string(),
            });
        }

        // Validate log level
        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }

        // Validate log format
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                value: self.logging.format.clone(),
            });
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample_config() -> Result<String, ConfigError> {
        let config = Self::default();
        toml::to_string_pretty(&config).map_err(|e| ConfigError::Parsing(e.to_string()))
    }
}
