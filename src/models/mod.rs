pub mod transfer;

pub use transfer::{EnrichedTransfer, TransferRecord};
