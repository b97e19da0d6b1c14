//! Spec extraction for PhoneSpec.
//!
//! Turns a fetched source page into a normalized [`DeviceDraft`]:
//! source adapters recover a raw [`SpecMap`], the normalizer resolves
//! canonical fields, and the variant expander builds RAM × storage variants.
//!
//! [`DeviceDraft`]: phonespec_shared::DeviceDraft
//! [`SpecMap`]: phonespec_shared::SpecMap

pub mod adapters;
pub mod connectivity;
pub mod draft;
pub mod normalize;
pub mod rules;
pub mod variants;

pub use adapters::{KimovilSource, OficinaDaNetSource, SourceExtraction, SourceRegistry, SpecSource};
pub use connectivity::{FALLBACK_CONNECTIVITY, NetworkFlags, resolve_connectivity};
pub use draft::{ExtractionOutcome, build_draft, extract_spec, extract_spec_detected, extract_with};
pub use normalize::{Clock, FixedClock, NormalizedFields, SystemClock, normalize};
pub use variants::{SharedAttributes, VersionRow, expand_variants, variants_from_rows};
