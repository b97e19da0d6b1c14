//! Description-text source (Oficina da Net product pages).
//!
//! These pages carry a prose summary ("O processador é um ...", "bateria de
//! 5000 mAh") rather than a spec table, so extraction is pattern-driven.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{META_DESCRIPTION, SourceExtraction, SpecSource, element_text, meta_content};
use crate::rules::{DESCRIPTION_RULES, apply_rules, detect_network_flags};

static DESCRIPTION_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#obj-det-descr").expect("valid selector"));
static DESCRIPTION_CLASS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".description").expect("valid selector"));

/// Prose-description extractor. Matches any page, so it is the registry's
/// last resort.
pub struct OficinaDaNetSource;

impl OficinaDaNetSource {
    pub const ID: &'static str = "oficinadanet";
}

/// The text region the description rules run over: meta description first,
/// then the product description block, then any `.description` element.
pub(crate) fn description_text(doc: &Html) -> String {
    if let Some(meta) = meta_content(doc, &META_DESCRIPTION) {
        return meta;
    }
    [&*DESCRIPTION_BLOCK, &*DESCRIPTION_CLASS]
        .into_iter()
        .filter_map(|sel| doc.select(sel).next())
        .map(element_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

impl SpecSource for OficinaDaNetSource {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn detect(&self, _doc: &Html) -> bool {
        true
    }

    fn extract(&self, doc: &Html, raw: &str) -> SourceExtraction {
        let text = description_text(doc);
        let mut specs = apply_rules(&text, &DESCRIPTION_RULES);
        specs.merge(detect_network_flags(raw));

        tracing::debug!(
            description_chars = text.len(),
            fields = specs.len(),
            "description source extracted"
        );

        SourceExtraction {
            specs,
            versions: Vec::new(),
        }
    }
}
