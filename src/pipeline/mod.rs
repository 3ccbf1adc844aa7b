pub mod enrichment;
pub mod orchestrator;

pub use enrichment::enrich_transfers;
pub use orchestrator::Pipeline;
