use serde::{Deserialize, Serialize};

/// A token transfer pulled out of one parsed instruction.
///
/// `slot` is filled in by the block scanner; the extractor itself only sees
/// a single transaction and leaves it at zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferRecord {
    pub slot: u64,
    pub mint: String,
    pub raw_amount: u64,
    pub decimals: u8,
    pub amount: f64, // raw_amount scaled by 10^decimals
    pub source: Option<String>,
    pub destination: Option<String>,
}

/// A transfer joined with registry and price data, ready to serve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedTransfer {
    pub slot: u64,
    pub mint: String,
    pub raw_amount: u64,
    pub decimals: u8,
    pub amount: f64,
    pub usd_value: f64,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub feed_id: String,
    pub unit_price: f64,
}
