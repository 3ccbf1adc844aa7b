use log::{debug, error, info, trace, warn};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::LoggingConfig;

/// Structured logging context for the watcher
pub struct LogContext {
    pub component: String,
    pub operation: String,
    pub metadata: HashMap<String, Value>,
}

impl LogContext {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn with_slot(self, slot: u64) -> Self {
        self.with_metadata("slot", json!(slot))
    }

    pub fn with_mint(self, mint: &str) -> Self {
        self.with_metadata("mint", json!(mint))
    }

    pub fn with_amount(self, amount: f64) -> Self {
        self.with_metadata("amount", json!(amount))
    }

    pub fn with_duration_ms(self, duration_ms: u64) -> Self {
        self.with_metadata("duration_ms", json!(duration_ms))
    }

    fn format_message(&self, level: &str, message: &str) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut log_entry = json!({
            "timestamp": timestamp,
            "level": level,
            "component": self.component,
            "operation": self.operation,
            "message": message,
        });

        // Add metadata
        for (key, value) in &self.metadata {
            log_entry[key] = value.clone();
        }

        log_entry.to_string()
    }

    pub fn info(&self, message: &str) {
        info!("{}", self.format_message("INFO", message));
    }

    pub fn warn(&self, message: &str) {
        warn!("{}", self.format_message("WARN", message));
    }

    pub fn error(&self, message: &str) {
        error!("{}", self.format_message("ERROR", message));
    }

    pub fn debug(&self, message: &str) {
        debug!("{}", self.format_message("DEBUG", message));
    }

    pub fn trace(&self, message: &str) {
        trace!("{}", self.format_message("TRACE", message));
    }
}

/// Performance monitoring utilities
pub struct PerformanceMonitor {
    pub start_time: SystemTime,
    operation: String,
    metadata: HashMap<String, Value>,
}

impl PerformanceMonitor {
    pub fn new(operation: &str) -> Self {
        Self {
            start_time: SystemTime::now(),
            operation: operation.to_string(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn finish(self) -> u64 {
        let duration = SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or_default()
            .as_millis() as u64;

        let mut context = LogContext::new("performance", &self.operation).with_duration_ms(duration);

        for (key, value) in self.metadata {
            context = context.with_metadata(&key, value);
        }

        context.info(&format!("Operation completed in {}ms", duration));
        duration
    }

    pub fn finish_with_result<T, E>(self, result: &Result<T, E>) -> u64
    where
        E: std::fmt::Display,
    {
        let duration = SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or_default()
            .as_millis() as u64;

        let mut context = LogContext::new("performance", &self.operation).with_duration_ms(duration);

        for (key, value) in self.metadata {
            context = context.with_metadata(&key, value);
        }

        match result {
            Ok(_) => {
                context.info(&format!("Operation completed successfully in {}ms", duration));
            }
            Err(e) => {
                context = context.with_metadata("error", json!(e.to_string()));
                context.error(&format!("Operation failed after {}ms: {}", duration, e));
            }
        }

        duration
    }
}

/// Application metrics and monitoring
pub struct MetricsLogger;

impl MetricsLogger {
    pub fn log_rpc_call(method: &str, duration_ms: u64, success: bool) {
        let context = LogContext::new("metrics", "rpc_call")
            .with_metadata("method", json!(method))
            .with_duration_ms(duration_ms)
            .with_metadata("success", json!(success));

        if success {
            context.debug(&format!("RPC call {} completed in {}ms", method, duration_ms));
        } else {
            context.warn(&format!("RPC call {} failed after {}ms", method, duration_ms));
        }
    }

    pub fn log_block_scanned(slot: u64, transfer_count: usize) {
        let context = LogContext::new("metrics", "block_scanned")
            .with_slot(slot)
            .with_metadata("transfer_count", json!(transfer_count));

        context.debug(&format!(
            "Slot {} scanned with {} token transfers",
            slot, transfer_count
        ));
    }

    pub fn log_scan_cycle(
        latest_slot: u64,
        window_size: u64,
        record_count: usize,
        mint_count: usize,
        duration_ms: u64,
    ) {
        let context = LogContext::new("metrics", "scan_cycle")
            .with_metadata("latest_slot", json!(latest_slot))
            .with_metadata("window_size", json!(window_size))
            .with_metadata("record_count", json!(record_count))
            .with_metadata("mint_count", json!(mint_count))
            .with_duration_ms(duration_ms);

        context.info(&format!(
            "Scanned {} slots from {}: {} transfers across {} mints in {}ms",
            window_size, latest_slot, record_count, mint_count, duration_ms
        ));
    }

    pub fn log_price_lookup(requested: usize, resolved: usize, duration_ms: u64, success: bool) {
        let context = LogContext::new("metrics", "price_lookup")
            .with_metadata("requested", json!(requested))
            .with_metadata("resolved", json!(resolved))
            .with_duration_ms(duration_ms)
            .with_metadata("success", json!(success));

        if success {
            context.debug(&format!(
                "Price lookup resolved {} of {} feed ids in {}ms",
                resolved, requested, duration_ms
            ));
        } else {
            context.warn(&format!(
                "Price lookup failed after {}ms, continuing without prices",
                duration_ms
            ));
        }
    }

    pub fn log_request_served(path: &str, result_count: usize, duration_ms: u64) {
        let context = LogContext::new("metrics", "request_served")
            .with_metadata("path", json!(path))
            .with_metadata("result_count", json!(result_count))
            .with_duration_ms(duration_ms);

        context.info(&format!(
            "Served {} with {} results in {}ms",
            path, result_count, duration_ms
        ));
    }
}

/// Initialize structured logging for the application
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pretty = config.format == "pretty";

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.level))
        .format(move |buf, record| {
            use std::io::Write;

            // Structured messages are JSON; pretty-print them when configured
            if let Ok(json_value) =
                serde_json::from_str::<Value>(record.args().to_string().as_str())
            {
                if pretty {
                    writeln!(buf, "{}", serde_json::to_string_pretty(&json_value)?)
                } else {
                    writeln!(buf, "{}", json_value)
                }
            } else {
                // Fall back to standard format for non-structured logs
                writeln!(
                    buf,
                    "{} [{}] {}: {}",
                    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    record.args()
                )
            }
        })
        .try_init()?;

    info!("Structured logging initialized");
    Ok(())
}
