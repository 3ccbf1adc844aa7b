use clap::Parser;
use solana_whale_watcher::config::AppConfig;
use solana_whale_watcher::error::RegistryError;
use solana_whale_watcher::pipeline::Pipeline;
use solana_whale_watcher::registry::TokenRegistry;
use std::sync::Arc;
use std::time::Duration;

/// One-shot scan: run the pipeline once and print the qualifying
/// transfers as JSON on stdout.
#[derive(Parser)]
#[command(name = "scan")]
#[command(about = "Scan recent Solana blocks for high-value SPL token transfers")]
#[command(version = "0.1.0")]
struct Args {
    /// Number of recent slots to scan (overrides config)
    #[arg(long)]
    window: Option<u64>,

    /// Minimum USD value to report, inclusive (overrides config)
    #[arg(long)]
    threshold: Option<f64>,

    /// Solana RPC endpoint (overrides config)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Token list URL or file path (overrides config)
    #[arg(long)]
    token_list: Option<String>,

    /// Print compact single-line JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> solana_whale_watcher::Result<()> {
    // Keep the CLI quiet by default; logs go to stderr, results to stdout
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(window) = args.window {
        config.scan.window_size = window;
    }
    if let Some(threshold) = args.threshold {
        config.scan.threshold_usd = threshold;
    }
    if let Some(rpc_url) = args.rpc_url {
        config.rpc.endpoint = rpc_url;
    }
    if let Some(token_list) = args.token_list {
        config.registry.token_list_source = token_list;
    }

    // Re-validate after CLI overrides
    if let Err(e) = config.validate() {
        eprintln!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

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
            eprintln!("Transfers cannot be priced without a token registry.");
            std::process::exit(1);
        }
    };

    let pipeline = Pipeline::from_config(&config, Arc::new(registry));

    match pipeline.run().await {
        Ok(transfers) => {
            let output = if args.compact {
                serde_json::to_string(&transfers)
            } else {
                serde_json::to_string_pretty(&transfers)
            };
            match output {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Failed to serialize results: {}", e);
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Scan failed: {}", e);
            std::process::exit(1);
        }
    }
}
