//! Declarative pattern rules for free-text spec extraction.
//!
//! Each rule maps one SpecMap field to a regex anchored on a Portuguese cue
//! phrase plus a post-processing step. Rules run independently over the same
//! text and never consume each other's matches, so table order is irrelevant.

use std::sync::LazyLock;

use phonespec_shared::SpecMap;
use regex::Regex;
use tracing::debug;

/// A single extraction rule.
pub struct PatternRule {
    /// SpecMap key written on match.
    pub field: &'static str,
    /// Compiled pattern; capture group 1 holds the value.
    pub pattern: Regex,
    /// Applied to the captured value before insertion.
    pub post: fn(&str) -> String,
}

impl PatternRule {
    fn new(field: &'static str, pattern: &str, post: fn(&str) -> String) -> Self {
        Self {
            field,
            pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("rule {field}: {e}")),
            post,
        }
    }

    /// Run this rule against `text`, returning the post-processed capture.
    pub fn apply(&self, text: &str) -> Option<String> {
        let caps = self.pattern.captures(text)?;
        let value = (self.post)(caps.get(1)?.as_str());
        (!value.is_empty()).then_some(value)
    }
}

fn trimmed(s: &str) -> String {
    s.trim().to_string()
}

/// Description-text rules for Oficina da Net pages.
pub static DESCRIPTION_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        PatternRule::new("Processador", r"(?i)processador é (?:um |o )?([^.]+)", trimmed),
        PatternRule::new("Sistema", r"(?i)vem com ([^,]+Android[^,]+)", trimmed),
        PatternRule::new(
            "Data lançamento",
            r"(?i)lançado em (\d{2}/\d{2}/\d{4})",
            trimmed,
        ),
        PatternRule::new(
            "Memória RAM",
            r"(?i)(\d+\s*GB(?:,\s*\d+\s*GB)*(?:\s*e\s*\d+\s*GB)?)\s+de memória RAM",
            trimmed,
        ),
        PatternRule::new(
            "Armazenamento",
            r"(?i)(\d+\s*(?:GB|TB)(?:,\s*\d+\s*(?:GB|TB))*(?:\s*e\s*\d+\s*(?:GB|TB)?)?)[,\s]*(?:UFS|de armazenamento)",
            trimmed,
        ),
        PatternRule::new("Tela", r"(?i)tela ([^,]+\d+\.?\d*\s*polegadas)", trimmed),
        PatternRule::new("Bateria", r"(?i)bateria de (\d+\s*mAh)", trimmed),
    ]
});

/// Apply every rule to `text` and collect the matches into a fresh map.
pub fn apply_rules(text: &str, rules: &[PatternRule]) -> SpecMap {
    rules
        .iter()
        .filter_map(|rule| {
            let value = rule.apply(text)?;
            debug!(field = rule.field, %value, "rule matched");
            Some((rule.field, value))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Network generation flags
// ---------------------------------------------------------------------------

/// Network generations scanned for in the raw document, as SpecMap keys.
pub const NETWORK_GENERATIONS: [&str; 3] = ["5G", "4G", "3G"];

static NETWORK_PATTERNS: LazyLock<Vec<(&'static str, Regex, Regex)>> = LazyLock::new(|| {
    NETWORK_GENERATIONS
        .iter()
        .map(|generation| {
            let inline = Regex::new(&format!(r"(?i){generation}[^<]*Sim")).expect("inline net regex");
            let cells = Regex::new(&format!(
                r"(?i)<div[^>]*>{generation}</div>[^<]*<div[^>]*>Sim</div>"
            ))
            .expect("cell net regex");
            (*generation, inline, cells)
        })
        .collect()
});

/// Scan the full document for "NG ... Sim" markers.
///
/// Each generation is an independent flag; matches are written as `"Sim"`.
pub fn detect_network_flags(document: &str) -> SpecMap {
    NETWORK_PATTERNS
        .iter()
        .filter(|(_, inline, cells)| inline.is_match(document) || cells.is_match(document))
        .map(|(generation, _, _)| {
            debug!(generation, "network generation detected");
            (*generation, "Sim")
        })
        .collect()
}
