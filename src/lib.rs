pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod prices;
pub mod registry;

pub use blockchain::{BlockScanner, ScanOutcome, SolanaRpcClient};
pub use config::{ApiConfig, AppConfig, LoggingConfig, PriceFeedConfig, RegistryConfig, RpcConfig, ScanConfig};
pub use error::{Result, WatcherError};
pub use logging::{LogContext, MetricsLogger, PerformanceMonitor};
pub use models::{EnrichedTransfer, TransferRecord};
pub use pipeline::Pipeline;
pub use prices::PriceResolver;
pub use registry::TokenRegistry;
