//! Spec source trait and built-in source adapters.
//!
//! Each adapter knows where one site keeps its specification data and turns a
//! fetched page into a [`SourceExtraction`]. Adapters are pure: they never
//! fetch and never fail, a page they cannot read yields an empty extraction.

mod kimovil;
mod oficinadanet;

use std::sync::LazyLock;

use phonespec_shared::{PhoneSpecError, Result, SpecMap};
use scraper::{ElementRef, Html, Selector};

use crate::variants::VersionRow;

pub use kimovil::KimovilSource;
pub use oficinadanet::OficinaDaNetSource;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Raw result of running one source adapter over a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceExtraction {
    /// Field label → free-text value, as found on the page.
    pub specs: SpecMap,
    /// (RAM, storage) rows read straight from a version table, if the source
    /// publishes one. Empty for description-only sources.
    pub versions: Vec<VersionRow>,
}

/// Trait for site-specific spec extraction.
///
/// Adapters are tried in priority order during detection;
/// [`OficinaDaNetSource`] is the always-last fallback.
pub trait SpecSource: Send + Sync {
    /// Stable identifier used in URLs, config and the `source` field.
    fn id(&self) -> &'static str;

    /// Whether this adapter recognizes the parsed page.
    fn detect(&self, doc: &Html) -> bool;

    /// Extract fields from the parsed page. `raw` is the unparsed document,
    /// for signals that are easier to find in markup than in the tree.
    fn extract(&self, doc: &Html, raw: &str) -> SourceExtraction;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds registered sources in detection priority order.
pub struct SourceRegistry {
    sources: Vec<Box<dyn SpecSource>>,
}

impl SourceRegistry {
    /// Create a registry with all built-in sources (tabular first, description fallback last).
    pub fn new() -> Self {
        Self {
            sources: vec![Box::new(KimovilSource), Box::new(OficinaDaNetSource)],
        }
    }

    /// Look up a source by id.
    pub fn get(&self, id: &str) -> Result<&dyn SpecSource> {
        self.sources
            .iter()
            .find(|s| s.id() == id)
            .map(|s| s.as_ref())
            .ok_or_else(|| {
                PhoneSpecError::validation(format!(
                    "unknown source '{id}': expected one of {}",
                    self.ids().join(", ")
                ))
            })
    }

    /// Detect the best source for the given page.
    /// Always returns a source (the description fallback matches anything).
    pub fn detect(&self, doc: &Html) -> &dyn SpecSource {
        self.sources
            .iter()
            .find(|s| s.detect(doc))
            .map(|s| s.as_ref())
            .unwrap_or(&OficinaDaNetSource)
    }

    /// Registered source ids in priority order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.id()).collect()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Shared DOM helpers
// ---------------------------------------------------------------------------

pub(crate) static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).expect("valid selector"));

/// Trimmed text content of an element.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// `content` attribute of the first element matching `sel`, if non-blank.
pub(crate) fn meta_content(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
}
