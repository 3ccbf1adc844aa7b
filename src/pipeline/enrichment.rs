use crate::models::{EnrichedTransfer, TransferRecord};
use crate::prices::PriceMap;
use crate::registry::TokenRegistry;

/// Join transfer records with registry and price data, keeping only the
/// transfers whose USD value reaches the threshold (inclusive).
///
/// Records whose mint has no feed id, or whose feed id got no price this
/// round, cannot be valued and are dropped. Input order is preserved.
pub fn enrich_transfers(
    records: &[TransferRecord],
    registry: &TokenRegistry,
    prices: &PriceMap,
    threshold_usd: f64,
) -> Vec<EnrichedTransfer> {
    let mut enriched = Vec::new();

    for record in records {
        let feed_id = match registry.feed_id(&record.mint) {
            Some(feed_id) => feed_id,
            None => continue,
        };

        let unit_price = match prices.get(feed_id) {
            Some(price) => *price,
            None => continue,
        };

        let usd_value = record.amount * unit_price;
        if usd_value >= threshold_usd {
            enriched.push(EnrichedTransfer {
                slot: record.slot,
                mint: record.mint.clone(),
                raw_amount: record.raw_amount,
                decimals: record.decimals,
                amount: record.amount,
                usd_value,
                source: record.source.clone(),
                destination: record.destination.clone(),
                feed_id: feed_id.to_string(),
                unit_price,
            });
        }
    }

    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

    fn record(slot: u64, mint: &str, amount: f64) -> TransferRecord {
        TransferRecord {
            slot,
            mint: mint.to_string(),
            raw_amount: (amount * 1_000_000.0) as u64,
            decimals: 6,
            amount,
            source: Some("source-account".to_string()),
            destination: Some("destination-account".to_string()),
        }
    }

    fn registry() -> TokenRegistry {
        let mut feeds = HashMap::new();
        feeds.insert(USDC_MINT.to_string(), "usd-coin".to_string());
        feeds.insert(WSOL_MINT.to_string(), "wrapped-solana".to_string());
        TokenRegistry::from_entries(feeds)
    }

    fn prices() -> PriceMap {
        let mut prices = PriceMap::new();
        prices.insert("usd-coin".to_string(), 1.0);
        prices.insert("wrapped-solana".to_string(), 150.0);
        prices
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let records = vec![record(10, USDC_MINT, 10_000.0)];

        let enriched = enrich_transfers(&records, &registry(), &prices(), 10_000.0);
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].usd_value, 10_000.0);
    }

    #[test]
    fn test_below_threshold_is_dropped() {
        let records = vec![record(10, USDC_MINT, 9_999.99)];

        let enriched = enrich_transfers(&records, &registry(), &prices(), 10_000.0);
        assert!(enriched.is_empty());
    }

    #[test]
    fn test_unknown_mint_is_dropped_even_with_prices_present() {
        let records = vec![record(10, "UnregisteredMint1111111111111111111111111111", 1_000_000.0)];

        let enriched = enrich_transfers(&records, &registry(), &prices(), 0.0);
        assert!(enriched.is_empty());
    }

    #[test]
    fn test_unpriced_feed_is_dropped() {
        let records = vec![record(10, WSOL_MINT, 1_000_000.0)];
        let mut partial_prices = PriceMap::new();
        partial_prices.insert("usd-coin".to_string(), 1.0);

        let enriched = enrich_transfers(&records, &registry(), &partial_prices, 0.0);
        assert!(enriched.is_empty());
    }

    #[test]
    fn test_enriched_fields_are_joined() {
        let records = vec![record(250_138_776, WSOL_MINT, 100.0)];

        let enriched = enrich_transfers(&records, &registry(), &prices(), 10_000.0);
        assert_eq!(enriched.len(), 1);

        let transfer = &enriched[0];
        assert_eq!(transfer.slot, 250_138_776);
        assert_eq!(transfer.mint, WSOL_MINT);
        assert_eq!(transfer.feed_id, "wrapped-solana");
        assert_eq!(transfer.unit_price, 150.0);
        assert_eq!(transfer.usd_value, 15_000.0);
        assert_eq!(transfer.source.as_deref(), Some("source-account"));
    }

    #[test]
    fn test_order_is_preserved() {
        let records = vec![
            record(12, USDC_MINT, 50_000.0),
            record(12, WSOL_MINT, 200.0),
            record(11, USDC_MINT, 70_000.0),
        ];

        let enriched = enrich_transfers(&records, &registry(), &prices(), 10_000.0);
        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched[0].usd_value, 50_000.0);
        assert_eq!(enriched[1].usd_value, 30_000.0);
        assert_eq!(enriched[2].usd_value, 70_000.0);
    }

    #[test]
    fn test_zero_threshold_keeps_all_priced_records() {
        let records = vec![record(10, USDC_MINT, 0.000001)];

        let enriched = enrich_transfers(&records, &registry(), &prices(), 0.0);
        assert_eq!(enriched.len(), 1);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let enriched = enrich_transfers(&[], &registry(), &prices(), 10_000.0);
        assert!(enriched.is_empty());
    }
}
