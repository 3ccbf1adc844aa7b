pub mod block_scanner;
pub mod rpc_client;
pub mod transfer_extractor;

pub use block_scanner::{BlockScanner, ScanOutcome};
pub use rpc_client::{BlockData, SolanaRpcClient};
pub use transfer_extractor::{
    extract_transfers, scale_amount, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
