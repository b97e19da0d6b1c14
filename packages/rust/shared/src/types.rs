//! Core domain types for PhoneSpec device records and price summaries.
//!
//! The serialized shape (camelCase, `deviceTitle`, `variations`, ...) is the
//! one consumed by the admin frontend, so field renames here are breaking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Listings priced at or above this are treated as non-phone noise.
pub const LISTING_PRICE_CEILING: u32 = 100_000;

// ---------------------------------------------------------------------------
// SpecMap
// ---------------------------------------------------------------------------

/// Raw field-label → text-value record recovered from one source page.
///
/// Keys are source-specific labels ("Processador", "Memória RAM", "5G").
/// Created fresh per extraction and discarded after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecMap(BTreeMap<String, String>);

impl SpecMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a single field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// First non-blank value among `keys`, in priority order.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.trim().is_empty())
    }

    /// Like [`first_of`](Self::first_of) but returns an owned, possibly empty string.
    pub fn first_or_empty(&self, keys: &[&str]) -> String {
        self.first_of(keys).unwrap_or_default().to_string()
    }

    /// Whether `key` holds the affirmative marker "Sim".
    pub fn is_yes(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.eq_ignore_ascii_case("sim"))
    }

    /// Merge `other` into this map; `other` wins on key collisions.
    pub fn merge(&mut self, other: SpecMap) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SpecMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// Min / mean / max triple for one condition (new or used).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_value: u32,
    pub med_value: u32,
    pub max_value: u32,
}

/// Price block attached to every variant. All zeros until priced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBlock {
    pub new: PriceRange,
    pub used: PriceRange,
}

/// Aggregated marketplace prices for one model + storage.
///
/// `med_value` is the rounded arithmetic mean, not a statistical median.
/// All-zero with `count == 0` is the canonical "no data" state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub min_value: u32,
    pub med_value: u32,
    pub max_value: u32,
    pub count: usize,
}

impl PriceSummary {
    /// The zero-result summary returned when no listing survives filtering.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// A (title, price) pair read from a marketplace results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCandidate {
    pub title: String,
    pub price: u32,
}

impl ListingCandidate {
    /// Build a candidate, or `None` if the title is blank or the price is
    /// outside `1..LISTING_PRICE_CEILING`.
    pub fn new(title: impl Into<String>, price: u32) -> Option<Self> {
        let title = title.into();
        let title = title.trim();
        if title.is_empty() || price == 0 || price >= LISTING_PRICE_CEILING {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            price,
        })
    }
}

// ---------------------------------------------------------------------------
// DeviceDraft / Variant
// ---------------------------------------------------------------------------

/// One sellable RAM × storage configuration.
///
/// `id` is 1-based and scoped to the containing [`DeviceDraft`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: u32,
    /// Manufacturer model code (e.g. SM-G988B). Left empty by extraction.
    #[serde(rename = "deviceVersion")]
    pub version: String,
    #[serde(rename = "deviceProcessor")]
    pub processor: String,
    /// RAM in GB as a decimal string.
    #[serde(rename = "deviceMemory")]
    pub ram_gb: String,
    /// Storage in GB as a decimal string (1 TB = 1000).
    #[serde(rename = "deviceStorage")]
    pub storage_gb: String,
    #[serde(rename = "deviceBroadband")]
    pub connectivity: String,
    #[serde(rename = "deviceYear")]
    pub year: String,
    #[serde(rename = "devicePrice")]
    pub price: PriceBlock,
}

/// Screen attributes, each a free-text substring (empty when unknown).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub size: String,
    pub resolution: String,
    #[serde(rename = "type")]
    pub panel_type: String,
    pub refresh: String,
}

/// Camera attributes, each a free-text substring (empty when unknown).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    pub main: String,
    pub front: String,
}

/// Normalized device record produced by one extraction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDraft {
    #[serde(rename = "deviceTitle")]
    pub title: String,
    #[serde(rename = "deviceBrand")]
    pub brand: String,
    #[serde(rename = "deviceProcessor")]
    pub processor: String,
    /// Four-digit release year.
    #[serde(rename = "deviceYear")]
    pub year: String,
    #[serde(rename = "deviceBroadband")]
    pub connectivity: String,
    #[serde(rename = "deviceImage", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub system: String,
    pub screen: Screen,
    pub camera: Camera,
    pub battery: String,
    pub dimensions: String,
    pub weight: String,
    #[serde(rename = "variations")]
    pub variants: Vec<Variant>,
    /// Source id the draft was extracted from.
    pub source: String,
    #[serde(rename = "allSpecs")]
    pub all_specs: SpecMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_map_fallback_lookup() {
        let map: SpecMap = [("Chipset", "Snapdragon 8 Gen 3"), ("Processador", "  ")]
            .into_iter()
            .collect();
        assert_eq!(
            map.first_of(&["Processador", "Chipset", "CPU"]),
            Some("Snapdragon 8 Gen 3")
        );
        assert_eq!(map.first_or_empty(&["CPU"]), "");
    }

    #[test]
    fn spec_map_yes_marker() {
        let mut map = SpecMap::new();
        map.insert("5G", "Sim");
        map.insert("3G", "Não");
        assert!(map.is_yes("5G"));
        assert!(!map.is_yes("3G"));
        assert!(!map.is_yes("4G"));
    }

    #[test]
    fn listing_candidate_price_band() {
        assert!(ListingCandidate::new("iPhone 15", 4500).is_some());
        assert!(ListingCandidate::new("iPhone 15", 0).is_none());
        assert!(ListingCandidate::new("iPhone 15", LISTING_PRICE_CEILING).is_none());
        assert!(ListingCandidate::new("   ", 4500).is_none());
    }

    #[test]
    fn price_summary_empty_state() {
        let empty = PriceSummary::empty();
        assert!(!empty.has_data());
        assert_eq!(empty.min_value, 0);

        let json = serde_json::to_value(empty).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"minValue": 0, "medValue": 0, "maxValue": 0, "count": 0})
        );
    }

    #[test]
    fn variant_serializes_frontend_shape() {
        let variant = Variant {
            id: 1,
            version: String::new(),
            processor: "Apple A16".into(),
            ram_gb: "6".into(),
            storage_gb: "128".into(),
            connectivity: "4G/5G".into(),
            year: "2023".into(),
            price: PriceBlock::default(),
        };
        let json = serde_json::to_value(&variant).expect("serialize");
        assert_eq!(json["deviceMemory"], "6");
        assert_eq!(json["deviceStorage"], "128");
        assert_eq!(json["devicePrice"]["used"]["maxValue"], 0);
    }
}
