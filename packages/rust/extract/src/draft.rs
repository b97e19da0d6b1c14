//! Page → [`DeviceDraft`] orchestration.

use phonespec_shared::{DeviceDraft, Result};
use scraper::Html;
use tracing::{info, instrument};

use crate::adapters::{SourceExtraction, SourceRegistry, SpecSource};
use crate::normalize::{Clock, SystemClock, normalize};
use crate::variants::{SharedAttributes, expand_variants, variants_from_rows};

/// A draft plus how much the source actually contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub draft: DeviceDraft,
    /// Number of raw fields the source produced before normalization.
    pub fields_found: usize,
}

impl ExtractionOutcome {
    /// True when the source yielded nothing and the draft is pure defaults.
    ///
    /// Not an error: callers decide whether to surface or discard it.
    pub fn is_no_signal(&self) -> bool {
        self.fields_found == 0
    }
}

/// Extract a draft from `document` using the source registered as `source_id`.
///
/// Fails only for an unknown source id; an unreadable page produces a
/// defaults-only draft flagged by [`ExtractionOutcome::is_no_signal`].
pub fn extract_spec(document: &str, source_id: &str, device_slug: &str) -> Result<ExtractionOutcome> {
    let registry = SourceRegistry::new();
    let source = registry.get(source_id)?;
    Ok(extract_with(document, source, device_slug, &SystemClock))
}

/// Like [`extract_spec`] but picks the source by inspecting the page.
pub fn extract_spec_detected(document: &str, device_slug: &str) -> ExtractionOutcome {
    let registry = SourceRegistry::new();
    let doc = Html::parse_document(document);
    let source = registry.detect(&doc);
    run_source(&doc, document, source, device_slug, &SystemClock)
}

/// Extraction with an explicit source and clock.
pub fn extract_with(
    document: &str,
    source: &dyn SpecSource,
    device_slug: &str,
    clock: &dyn Clock,
) -> ExtractionOutcome {
    let doc = Html::parse_document(document);
    run_source(&doc, document, source, device_slug, clock)
}

#[instrument(skip_all, fields(source = source.id(), slug = device_slug))]
fn run_source(
    doc: &Html,
    raw: &str,
    source: &dyn SpecSource,
    device_slug: &str,
    clock: &dyn Clock,
) -> ExtractionOutcome {
    let extraction = source.extract(doc, raw);
    let fields_found = extraction.specs.len();
    let draft = build_draft(extraction, source.id(), device_slug, clock);

    info!(
        fields_found,
        variants = draft.variants.len(),
        connectivity = %draft.connectivity,
        "extraction complete"
    );

    ExtractionOutcome {
        draft,
        fields_found,
    }
}

/// Normalize a source extraction into a draft.
///
/// Version rows, when present, replace the RAM × storage cross product.
pub fn build_draft(
    extraction: SourceExtraction,
    source_id: &str,
    device_slug: &str,
    clock: &dyn Clock,
) -> DeviceDraft {
    let SourceExtraction { specs, versions } = extraction;
    let fields = normalize(&specs, device_slug, clock);

    let shared = SharedAttributes {
        processor: fields.processor.clone(),
        connectivity: fields.connectivity.clone(),
        year: fields.year.clone(),
    };
    let variants = if versions.is_empty() {
        expand_variants(&fields.ram_options, &fields.storage_options, &shared)
    } else {
        variants_from_rows(&versions, &shared)
    };

    DeviceDraft {
        title: fields.title,
        brand: fields.brand,
        processor: fields.processor,
        year: fields.year,
        connectivity: fields.connectivity,
        image: fields.image,
        system: fields.system,
        screen: fields.screen,
        camera: fields.camera,
        battery: fields.battery,
        dimensions: fields.dimensions,
        weight: fields.weight,
        variants,
        source: source_id.to_string(),
        all_specs: specs,
    }
}
