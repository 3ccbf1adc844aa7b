use std::collections::HashMap;
use std::path::Path;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::RegistryError;
use crate::logging::LogContext;

/// Solana token-list format, pared down to the fields the registry needs
#[derive(Debug, Deserialize)]
struct TokenListFile {
    #[serde(default)]
    tokens: Vec<TokenListEntry>,
}

#[derive(Debug, Deserialize)]
struct TokenListEntry {
    address: String,
    #[serde(default)]
    extensions: Option<TokenExtensions>,
}

#[derive(Debug, Deserialize)]
struct TokenExtensions {
    #[serde(rename = "coingeckoId")]
    coingecko_id: Option<String>,
}

/// Immutable snapshot mapping mint addresses to price-feed ids.
///
/// Built once at startup and shared behind an `Arc`; refreshing means
/// loading a new snapshot and swapping the `Arc`, never mutating in place.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    feeds: HashMap<String, String>,
}

impl TokenRegistry {
    pub fn from_entries(feeds: HashMap<String, String>) -> Self {
        Self { feeds }
    }

    /// Load a token list from an http(s) URL or a local file path
    pub async fn load(source: &str, client: &Client) -> Result<Self, RegistryError> {
        let body = if source.starts_with("http://") || source.starts_with("https://") {
            let response = client.get(source).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(RegistryError::Status {
                    status: status.as_u16(),
                });
            }
            response.text().await?
        } else {
            tokio::fs::read_to_string(Path::new(source)).await?
        };

        let registry = Self::from_token_list(&body)?;

        let context = LogContext::new("token_registry", "load")
            .with_metadata("source", json!(source))
            .with_metadata("tokens", json!(registry.len()));
        if registry.is_empty() {
            context.warn("Token list loaded but no entry carries a price feed id");
        } else {
            context.info(&format!("Loaded {} price-feed mappings", registry.len()));
        }

        Ok(registry)
    }

    /// Parse token-list JSON. Entries without a `coingeckoId` extension have
    /// no price feed and are omitted; a mint listed twice keeps the last
    /// entry.
    pub fn from_token_list(body: &str) -> Result<Self, RegistryError> {
        let file: TokenListFile = serde_json::from_str(body)?;

        let mut feeds = HashMap::new();
        for entry in file.tokens {
            if let Some(feed_id) = entry.extensions.and_then(|e| e.coingecko_id) {
                feeds.insert(entry.address, feed_id);
            }
        }

        Ok(Self { feeds })
    }

    pub fn feed_id(&self, mint: &str) -> Option<&str> {
        self.feeds.get(mint).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }
}
