//! Marketplace price reconciliation for PhoneSpec.
//!
//! Parses marketplace result pages into listing candidates, keeps only the
//! listings that are really the target model and storage, and summarizes
//! their prices.

pub mod aggregate;
pub mod filter;
pub mod listings;
pub mod marketplace;

use phonespec_shared::PriceSummary;
use tracing::info;

pub use aggregate::{aggregate, summarize};
pub use filter::{
    ACCESSORY_KEYWORDS, BRAND_PREFIXES, ListingFilter, MODEL_VARIANT_TOKENS, Rejection,
    StorageSpec, filter_listings, strip_brand,
};
pub use listings::{parse_listings, strip_trailing_color};
pub use marketplace::Marketplace;

/// Parse, filter and summarize one marketplace results page.
pub fn price_page(
    marketplace: Marketplace,
    html: &str,
    target_name: &str,
    target_storage: &str,
) -> PriceSummary {
    let candidates = parse_listings(marketplace, html);
    let prices = filter_listings(target_name, target_storage, &candidates);
    let summary = summarize(&prices);

    info!(
        %marketplace,
        candidates = candidates.len(),
        accepted = prices.len(),
        min = summary.min_value,
        med = summary.med_value,
        max = summary.max_value,
        "marketplace prices summarized"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        let path = format!("{}/../../../fixtures/html/{name}", env!("CARGO_MANIFEST_DIR"));
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {path}: {e}"))
    }

    #[test]
    fn olx_page_end_to_end() {
        let summary = price_page(Marketplace::Olx, &fixture("olx.html"), "Apple iPhone 15 Pro", "256GB");
        assert_eq!(
            summary,
            PriceSummary {
                min_value: 5500,
                med_value: 5700,
                max_value: 5899,
                count: 2,
            }
        );
    }

    #[test]
    fn amazon_plus_listing_excluded_for_base_model() {
        let summary = price_page(Marketplace::Amazon, &fixture("amazon.html"), "Apple iPhone 15", "128GB");
        assert_eq!(summary.count, 1);
        assert_eq!(summary.min_value, 4299);
    }

    #[test]
    fn mercadolivre_ultra_excluded() {
        let summary = price_page(
            Marketplace::MercadoLivre,
            &fixture("mercadolivre.html"),
            "Samsung Galaxy S24",
            "256GB",
        );
        assert_eq!(summary.count, 1);
        assert_eq!(summary.max_value, 3899);
    }

    #[test]
    fn nothing_relevant_is_zero_summary() {
        let summary = price_page(Marketplace::Olx, &fixture("olx.html"), "Moto G84", "256GB");
        assert_eq!(summary, PriceSummary::empty());
    }
}
