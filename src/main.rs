use clap::Parser;
use solana_whale_watcher::api::ApiServer;
use solana_whale_watcher::config::AppConfig;
use solana_whale_watcher::error::RegistryError;
use solana_whale_watcher::logging::{init_logging, LogContext};
use solana_whale_watcher::pipeline::Pipeline;
use solana_whale_watcher::registry::TokenRegistry;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "solana-whale-watcher")]
#[command(about = "HTTP API server reporting high-value SPL token transfers")]
#[command(version = "0.1.0")]
struct Args {
    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> solana_whale_watcher::Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", AppConfig::generate_sample_config()?);
        return Ok(());
    }

    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let host = args.host.unwrap_or_else(|| config.api.host.clone());
    let port = args.port.unwrap_or(config.api.port);

    // Load the token registry once at startup; the server is useless
    // without it, so a failure here is fatal
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(RegistryError::Http)?;

    let registry = match TokenRegistry::load(&config.registry.token_list_source, &http_client).await
    {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!(
                "Failed to load token registry from '{}': {}",
                config.registry.token_list_source, e
            );
            eprintln!("The server cannot price transfers without a token registry.");
            std::process::exit(1);
        }
    };

    if registry.is_empty() {
        log::warn!("Token registry is empty; every scan will return an empty result");
    }

    let pipeline = Arc::new(Pipeline::from_config(&config, Arc::new(registry)));

    let context = LogContext::new("server", "startup")
        .with_metadata("host", serde_json::json!(host))
        .with_metadata("port", serde_json::json!(port))
        .with_metadata("window_size", serde_json::json!(config.scan.window_size))
        .with_metadata("threshold_usd", serde_json::json!(config.scan.threshold_usd));
    context.info("Starting HTTP API server");

    let server = ApiServer::new(pipeline, host, port);

    if let Err(e) = server.start().await {
        log::error!("Server failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}
