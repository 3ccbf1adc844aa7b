use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::timeout;

use crate::blockchain::{BlockScanner, SolanaRpcClient};
use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::logging::{LogContext, PerformanceMonitor};
use crate::models::EnrichedTransfer;
use crate::pipeline::enrichment::enrich_transfers;
use crate::prices::PriceResolver;
use crate::registry::TokenRegistry;

/// Wires scan -> price lookup -> enrichment under a wall-clock deadline.
///
/// Holds no mutable state; every run starts from the chain's current tip,
/// so concurrent requests cannot interfere with each other.
pub struct Pipeline {
    scanner: BlockScanner,
    resolver: PriceResolver,
    registry: Arc<TokenRegistry>,
    threshold_usd: f64,
    deadline: Duration,
}

impl Pipeline {
    pub fn new(
        scanner: BlockScanner,
        resolver: PriceResolver,
        registry: Arc<TokenRegistry>,
        threshold_usd: f64,
        deadline: Duration,
    ) -> Self {
        Self {
            scanner,
            resolver,
            registry,
            threshold_usd,
            deadline,
        }
    }

    /// Build a pipeline with clients configured from the application config
    pub fn from_config(config: &AppConfig, registry: Arc<TokenRegistry>) -> Self {
        let rpc_client = SolanaRpcClient::new_with_config(
            config.rpc.endpoint.clone(),
            config.rpc.timeout_seconds,
        );
        let scanner = BlockScanner::new(rpc_client, config.scan.window_size);
        let resolver = PriceResolver::new_with_config(
            config.price_feed.endpoint.clone(),
            config.price_feed.timeout_seconds,
        );

        Self::new(
            scanner,
            resolver,
            registry,
            config.scan.threshold_usd,
            Duration::from_secs(config.scan.deadline_seconds),
        )
    }

    /// Run one full cycle.
    ///
    /// Handled emptiness (no latest slot, missing blocks, dead price feed,
    /// unknown mints) yields `Ok` with fewer or no results; only transport
    /// failures and deadline overruns surface as errors.
    pub async fn run(&self) -> Result<Vec<EnrichedTransfer>, PipelineError> {
        let monitor = PerformanceMonitor::new("pipeline_run");

        let result = match timeout(self.deadline, self.run_inner()).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::DeadlineExceeded {
                seconds: self.deadline.as_secs(),
            }),
        };

        monitor.finish_with_result(&result);
        result
    }

    async fn run_inner(&self) -> Result<Vec<EnrichedTransfer>, PipelineError> {
        let outcome = self.scanner.scan().await?;

        // The price feed keys on feed ids, not mint addresses; mints the
        // registry does not list have no feed to query.
        let feed_ids: HashSet<String> = outcome
            .mints
            .iter()
            .filter_map(|mint| self.registry.feed_id(mint))
            .map(str::to_string)
            .collect();

        let prices = self.resolver.resolve(&feed_ids).await;
        let enriched = enrich_transfers(
            &outcome.records,
            &self.registry,
            &prices,
            self.threshold_usd,
        );

        let context = LogContext::new("pipeline", "run")
            .with_metadata("scanned", json!(outcome.records.len()))
            .with_metadata("qualified", json!(enriched.len()));
        context.info(&format!(
            "{} of {} transfers valued at or above {} USD",
            enriched.len(),
            outcome.records.len(),
            self.threshold_usd
        ));

        Ok(enriched)
    }

    pub fn window_size(&self) -> u64 {
        self.scanner.window_size()
    }

    pub fn threshold_usd(&self) -> f64 {
        self.threshold_usd
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_registry() -> Arc<TokenRegistry> {
        let mut feeds = HashMap::new();
        feeds.insert(
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
            "usd-coin".to_string(),
        );
        Arc::new(TokenRegistry::from_entries(feeds))
    }

    #[test]
    fn test_from_config_wires_scan_settings() {
        let mut config = AppConfig::default();
        config.scan.window_size = 7;
        config.scan.threshold_usd = 2_500.0;

        let pipeline = Pipeline::from_config(&config, test_registry());

        assert_eq!(pipeline.window_size(), 7);
        assert_eq!(pipeline.threshold_usd(), 2_500.0);
        assert_eq!(pipeline.registry().len(), 1);
    }
}
