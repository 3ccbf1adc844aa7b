pub mod price_resolver;

pub use price_resolver::{PriceMap, PriceResolver};
