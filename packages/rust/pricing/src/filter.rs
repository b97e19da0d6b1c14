//! Listing relevance filter.
//!
//! Marketplace search backends return loose full-text matches. Every
//! candidate title must pass all of the checks in [`ListingFilter`] before
//! its price is counted.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use phonespec_shared::ListingCandidate;
use regex::Regex;
use tracing::{debug, instrument};

/// Substrings that mark a listing as an accessory rather than a phone.
pub const ACCESSORY_KEYWORDS: &[&str] = &[
    "carregador",
    "capa",
    "pelicula",
    "película",
    "fone",
    "cabo",
    "fonte",
    "bateria",
    "tela",
    "capinha",
    "suporte",
    "adaptador",
];

/// Model-line qualifiers. A listing carrying one the target lacks is a
/// different model.
pub const MODEL_VARIANT_TOKENS: &[&str] = &[
    "max", "plus", "mini", "ultra", "lite", "air", "se", "edge", "note", "fold", "flip",
];

/// Leading brand tokens dropped from the target name before matching.
pub const BRAND_PREFIXES: &[&str] = &["Apple"];

/// Variant words at least this long also match glued onto the end of a title
/// word ("promax", "s24ultra"). Shorter ones ("se") match whole words only.
pub const MIN_GLUED_VARIANT_CHARS: usize = 3;

/// Target-name words shorter than this are not required in titles.
pub const MIN_MODEL_WORD_CHARS: usize = 3;

static BRAND_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^(?:{})\s+", BRAND_PREFIXES.join("|"))).expect("valid regex")
});

static STORAGE_SPEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(GB|TB)").expect("valid regex"));

/// Remove a leading single-brand marker ("Apple iPhone Air" → "iPhone Air").
pub fn strip_brand(name: &str) -> String {
    BRAND_PREFIX_RE.replace(name.trim(), "").trim().to_string()
}

/// Lower-cased alphanumeric runs of `text`.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Whether a lower-cased title token carries `variant`, alone or as a suffix.
fn carries_variant(token: &str, variant: &str) -> bool {
    token == variant || (variant.len() >= MIN_GLUED_VARIANT_CHARS && token.ends_with(variant))
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// A storage size as typed by the caller ("256GB", "1 tb").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSpec {
    pub value: u32,
    /// Upper-cased unit, `GB` or `TB`.
    pub unit: String,
}

impl StorageSpec {
    /// Parse the first `<digits><GB|TB>` in `text`.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = STORAGE_SPEC_RE.captures(text)?;
        Some(Self {
            value: caps[1].parse().ok()?,
            unit: caps[2].to_ascii_uppercase(),
        })
    }

    /// Word-bounded, optionally parenthesized, spacing-tolerant title pattern.
    fn title_pattern(&self) -> Regex {
        Regex::new(&format!(r"(?i)\(?\s*\b{}\s*{}\b\s*\)?", self.value, self.unit))
            .expect("storage pattern built from digits and a fixed unit")
    }
}

impl fmt::Display for StorageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Why a listing title was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Accessory(&'static str),
    MissingModelWord(String),
    ExtraVariant(&'static str),
    StorageMismatch,
}

/// Relevance test for one target model + storage, built once per request.
#[derive(Debug)]
pub struct ListingFilter {
    model_words: Vec<String>,
    name_tokens: HashSet<String>,
    target_variants: HashSet<&'static str>,
    storage: Option<Regex>,
}

impl ListingFilter {
    pub fn new(target_name: &str, target_storage: &str) -> Self {
        let name = strip_brand(target_name);
        let lower = name.to_lowercase();

        let model_words = lower
            .split_whitespace()
            .filter(|w| w.chars().count() >= MIN_MODEL_WORD_CHARS)
            .map(str::to_string)
            .collect();

        let name_tokens: HashSet<String> = tokens(&name).collect();
        let target_variants = MODEL_VARIANT_TOKENS
            .iter()
            .copied()
            .filter(|v| name_tokens.contains(*v))
            .collect();

        let storage = StorageSpec::parse(target_storage).map(|s| s.title_pattern());

        Self {
            model_words,
            name_tokens,
            target_variants,
            storage,
        }
    }

    /// First failed check for `title`, or `None` if the listing is relevant.
    pub fn rejection(&self, title: &str) -> Option<Rejection> {
        let lower = title.to_lowercase();

        if let Some(keyword) = ACCESSORY_KEYWORDS.iter().find(|k| lower.contains(*k)) {
            return Some(Rejection::Accessory(*keyword));
        }

        if let Some(word) = self.model_words.iter().find(|w| !lower.contains(w.as_str())) {
            return Some(Rejection::MissingModelWord(word.clone()));
        }

        // Tokens the target name itself contains never count as extra variants.
        let title_tokens: Vec<String> = tokens(&lower)
            .filter(|t| !self.name_tokens.contains(t))
            .collect();
        if let Some(variant) = MODEL_VARIANT_TOKENS
            .iter()
            .filter(|v| !self.target_variants.contains(**v))
            .find(|v| title_tokens.iter().any(|t| carries_variant(t, v)))
        {
            return Some(Rejection::ExtraVariant(*variant));
        }

        match &self.storage {
            Some(pattern) if !pattern.is_match(title) => Some(Rejection::StorageMismatch),
            _ => None,
        }
    }

    pub fn accepts(&self, title: &str) -> bool {
        self.rejection(title).is_none()
    }
}

/// Prices of the relevant candidates, deduplicated by value in first-seen order.
#[instrument(skip_all, fields(target = target_name, storage = target_storage, candidates = candidates.len()))]
pub fn filter_listings(
    target_name: &str,
    target_storage: &str,
    candidates: &[ListingCandidate],
) -> Vec<u32> {
    let filter = ListingFilter::new(target_name, target_storage);
    let mut seen = HashSet::new();
    let mut prices = Vec::new();

    for candidate in candidates {
        match filter.rejection(&candidate.title) {
            Some(reason) => debug!(title = %candidate.title, ?reason, "listing rejected"),
            None => {
                if seen.insert(candidate.price) {
                    prices.push(candidate.price);
                }
            }
        }
    }

    debug!(accepted = prices.len(), "listings filtered");
    prices
}
