use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;

use crate::blockchain::rpc_client::TransactionData;
use crate::models::TransferRecord;

/// SPL token program on Solana mainnet
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Token-2022 program; emits the same parsed transfer shapes
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// Program ids whose instructions count as token transfers
pub static TOKEN_PROGRAM_IDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| [TOKEN_PROGRAM_ID, TOKEN_2022_PROGRAM_ID].into_iter().collect());

/// A parsed token-program instruction, dispatched on its `type` tag.
///
/// The two transfer shapes differ only in where the amount lives: simple
/// transfers carry a bare integer, checked transfers nest an
/// `{amount, decimals}` pair under `tokenAmount`. Everything else the token
/// program can do lands in `Other` and is ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "info")]
pub enum ParsedTokenInstruction {
    #[serde(rename = "transfer")]
    Transfer(SimpleTransferInfo),
    #[serde(rename = "transferChecked")]
    TransferChecked(CheckedTransferInfo),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct SimpleTransferInfo {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub mint: Option<String>,
    pub amount: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
pub struct CheckedTransferInfo {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub mint: Option<String>,
    #[serde(rename = "tokenAmount")]
    pub token_amount: Option<TokenAmount>,
    pub amount: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
pub struct TokenAmount {
    pub amount: RawAmount,
    pub decimals: u8,
}

/// Token amounts arrive as decimal strings from current nodes, but older
/// payloads used bare integers; accept both.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Integer(u64),
    Text(String),
}

impl RawAmount {
    fn as_u64(&self) -> Option<u64> {
        match self {
            RawAmount::Integer(n) => Some(*n),
            RawAmount::Text(s) => s.parse().ok(),
        }
    }
}

struct NormalizedTransfer {
    mint: String,
    raw_amount: u64,
    decimals: u8,
    source: Option<String>,
    destination: Option<String>,
}

impl ParsedTokenInstruction {
    /// Collapse both transfer shapes into one normalized form. `None` means
    /// the instruction is not a transfer we can report: wrong kind, no mint,
    /// or an amount that does not read as an integer.
    fn normalize(self) -> Option<NormalizedTransfer> {
        match self {
            ParsedTokenInstruction::Transfer(info) => Some(NormalizedTransfer {
                mint: info.mint?,
                raw_amount: info.amount?.as_u64()?,
                decimals: 0,
                source: info.source,
                destination: info.destination,
            }),
            ParsedTokenInstruction::TransferChecked(info) => {
                let (raw_amount, decimals) = match info.token_amount {
                    Some(token_amount) => (token_amount.amount.as_u64()?, token_amount.decimals),
                    // Degenerate checked transfer without the structured pair
                    None => (info.amount?.as_u64()?, 0),
                };
                Some(NormalizedTransfer {
                    mint: info.mint?,
                    raw_amount,
                    decimals,
                    source: info.source,
                    destination: info.destination,
                })
            }
            ParsedTokenInstruction::Other => None,
        }
    }
}

/// Scale a raw smallest-unit amount to its human representation
pub fn scale_amount(raw_amount: u64, decimals: u8) -> f64 {
    raw_amount as f64 / 10f64.powi(decimals as i32)
}

/// Pull every reportable token transfer out of one transaction.
///
/// Instructions that are not from a token program, are not parsed, or are
/// malformed in any way are skipped without failing the rest of the
/// transaction. Records come back in instruction order with `slot` left at
/// zero for the scanner to fill in.
pub fn extract_transfers(transaction: &TransactionData) -> Vec<TransferRecord> {
    let mut records = Vec::new();

    for instruction in &transaction.message.instructions {
        let program_id = match instruction.program_id.as_deref() {
            Some(id) => id,
            None => continue,
        };
        if !TOKEN_PROGRAM_IDS.contains(program_id) {
            continue;
        }

        let parsed = match &instruction.parsed {
            Some(value) => value.clone(),
            None => continue,
        };

        let instruction_kind: ParsedTokenInstruction = match serde_json::from_value(parsed) {
            Ok(kind) => kind,
            Err(_) => continue,
        };

        if let Some(normalized) = instruction_kind.normalize() {
            records.push(TransferRecord {
                slot: 0, // Set by the scanner with the block's slot
                amount: scale_amount(normalized.raw_amount, normalized.decimals),
                mint: normalized.mint,
                raw_amount: normalized.raw_amount,
                decimals: normalized.decimals,
                source: normalized.source,
                destination: normalized.destination,
            });
        }
    }

    records
}
