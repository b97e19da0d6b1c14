//! Shared types, error model, and configuration for PhoneSpec.
//!
//! This crate is the foundation depended on by all other PhoneSpec crates.
//! It provides:
//! - [`PhoneSpecError`]: the unified error type
//! - Domain types ([`SpecMap`], [`DeviceDraft`], [`Variant`], [`PriceSummary`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], config loading)
//! - Slug formatting ([`format_slug`])

pub mod config;
pub mod error;
pub mod slug;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, FetchSection, SourcesConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_config,
};
pub use error::{PhoneSpecError, Result};
pub use slug::{capitalize, format_slug, slug_to_title};
pub use types::{
    Camera, DeviceDraft, LISTING_PRICE_CEILING, ListingCandidate, PriceBlock, PriceRange,
    PriceSummary, Screen, SpecMap, Variant,
};
