use std::collections::{HashMap, HashSet};
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::PriceFeedError;
use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};

/// Feed id -> USD unit price
pub type PriceMap = HashMap<String, f64>;

#[derive(Debug, Deserialize)]
struct PriceEntry {
    usd: Option<f64>,
}

pub struct PriceResolver {
    client: Client,
    endpoint: String,
}

impl PriceResolver {
    pub fn new(endpoint: String) -> Self {
        Self::new_with_config(endpoint, 10)
    }

    pub fn new_with_config(endpoint: String, timeout_seconds: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_seconds))
                .build()
                .expect("Failed to create HTTP client"),
            endpoint,
        }
    }

    /// Resolve USD prices for a set of feed ids with one batched request.
    ///
    /// An empty input resolves to an empty map without touching the network.
    /// Upstream failures also resolve to an empty map: prices are
    /// best-effort and a dead feed must not take the pipeline down, it only
    /// means no transfer can clear the threshold this round.
    pub async fn resolve(&self, feed_ids: &HashSet<String>) -> PriceMap {
        if feed_ids.is_empty() {
            return PriceMap::new();
        }

        let monitor = PerformanceMonitor::new("price_lookup")
            .with_metadata("requested", json!(feed_ids.len()));
        let result = self.fetch_prices(feed_ids).await;
        let duration = monitor.finish_with_result(&result);

        match result {
            Ok(prices) => {
                MetricsLogger::log_price_lookup(feed_ids.len(), prices.len(), duration, true);
                prices
            }
            Err(e) => {
                MetricsLogger::log_price_lookup(feed_ids.len(), 0, duration, false);
                let context = LogContext::new("price_resolver", "resolve")
                    .with_metadata("error", json!(e.to_string()));
                context.warn("Price feed unavailable, treating all prices as unknown");
                PriceMap::new()
            }
        }
    }

    async fn fetch_prices(&self, feed_ids: &HashSet<String>) -> Result<PriceMap, PriceFeedError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.endpoint.trim_end_matches('/'),
            batch_ids(feed_ids)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PriceFeedError::Status {
                status: status.as_u16(),
            });
        }

        let body: HashMap<String, PriceEntry> = response
            .json()
            .await
            .map_err(|e| PriceFeedError::Malformed(e.to_string()))?;

        // Entries the feed answered without a usd quote are simply unknown
        let mut prices = PriceMap::new();
        for (feed_id, entry) in body {
            if let Some(usd) = entry.usd {
                prices.insert(feed_id, usd);
            }
        }

        Ok(prices)
    }
}

/// Join feed ids into the batch query parameter, sorted so the request URL
/// is deterministic regardless of set iteration order.
fn batch_ids(feed_ids: &HashSet<String>) -> String {
    let mut ids: Vec<&str> = feed_ids.iter().map(String::as_str).collect();
    ids.sort_unstable();
    ids.join(",")
}
