//! Request pipelines for PhoneSpec.
//!
//! This crate ties together fetching, device suggestions, spec extraction
//! and marketplace pricing into the end-to-end operations the CLI exposes.

pub mod fetch;
pub mod pipeline;
pub mod suggest;

pub use fetch::{DocumentFetcher, HttpFetcher};
pub use pipeline::{
    ProgressReporter, SilentProgress, kimovil_url, marketplace_prices, oficinadanet_url,
    scrape_kimovil, search_phone, suggest_devices,
};
pub use suggest::{DeviceSuggestion, MAX_SUGGESTIONS, MIN_SUGGEST_CHARS};
