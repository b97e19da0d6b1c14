//! Field normalization: SpecMap → canonical attributes.
//!
//! Canonical attributes are resolved through an explicit table of
//! (primary key, fallback keys...) per attribute. Memory fields are split into
//! distinct numeric GB strings, with TB converted via ×1000.

use std::sync::LazyLock;

use chrono::Datelike;
use phonespec_shared::{Camera, Screen, SpecMap, capitalize, slug_to_title};
use regex::Regex;

use crate::connectivity::{NetworkFlags, resolve_connectivity};

/// Values strictly below this (in GB) in a combined memory field are RAM;
/// values at or above are storage.
pub const RAM_STORAGE_THRESHOLD_GB: u32 = 24;

/// RAM option used when none can be recovered.
pub const DEFAULT_RAM_GB: &str = "4";

/// Storage option used when none can be recovered.
pub const DEFAULT_STORAGE_GB: &str = "128";

/// GB per TB. Decimal, to match how storage is catalogued downstream.
pub const GB_PER_TB: u32 = 1000;

// ---------------------------------------------------------------------------
// Canonical key table
// ---------------------------------------------------------------------------

/// Prioritized SpecMap labels per canonical attribute.
pub mod keys {
    pub const TITLE: &[&str] = &["Título"];
    pub const BRAND: &[&str] = &["Marca"];
    pub const IMAGE: &[&str] = &["Imagem"];
    pub const PROCESSOR: &[&str] = &["Processador", "Chipset", "CPU"];
    pub const SYSTEM: &[&str] = &["Sistema", "Sistema Operacional", "OS"];
    pub const BATTERY: &[&str] = &["Bateria", "Battery"];
    pub const RELEASE: &[&str] = &["Data lançamento", "Lançamento", "Data de lançamento"];
    pub const COMBINED_MEMORY: &[&str] = &["Memórias", "Memória"];
    pub const RAM: &[&str] = &["Memória RAM", "RAM"];
    pub const STORAGE: &[&str] = &["Armazenamento", "Storage", "Armazenamento interno"];
    pub const SCREEN_SIZE: &[&str] = &["Tela", "Display"];
    pub const SCREEN_RESOLUTION: &[&str] = &["Resolução"];
    pub const SCREEN_TYPE: &[&str] = &["Tipo de tela"];
    pub const SCREEN_REFRESH: &[&str] = &["Taxa de atualização"];
    pub const CAMERA_MAIN: &[&str] = &["Câmera", "Câmera traseira", "Câmera principal"];
    pub const CAMERA_FRONT: &[&str] = &["Câmera frontal", "Selfie"];
    pub const DIMENSIONS: &[&str] = &["Dimensões"];
    pub const WEIGHT: &[&str] = &["Peso"];
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current calendar year for the release-year default.
pub trait Clock: Send + Sync {
    fn current_year(&self) -> i32;
}

/// Wall-clock year in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        chrono::Local::now().year()
    }
}

/// Fixed year, for deterministic callers and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// NormalizedFields
// ---------------------------------------------------------------------------

/// Canonical attributes recovered from one SpecMap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFields {
    pub title: String,
    pub brand: String,
    pub image: Option<String>,
    pub processor: String,
    pub system: String,
    pub battery: String,
    /// Four-digit release year.
    pub year: String,
    pub connectivity: String,
    /// Distinct RAM sizes in GB, never empty.
    pub ram_options: Vec<String>,
    /// Distinct storage sizes in GB, never empty.
    pub storage_options: Vec<String>,
    pub screen: Screen,
    pub camera: Camera,
    pub dimensions: String,
    pub weight: String,
}

/// Normalize a SpecMap, deriving title and brand from `slug` when the map
/// carries none.
pub fn normalize(specs: &SpecMap, slug: &str, clock: &dyn Clock) -> NormalizedFields {
    let (mut ram_options, mut storage_options) = specs
        .first_of(keys::COMBINED_MEMORY)
        .map(split_combined_memory)
        .unwrap_or_default();

    if ram_options.is_empty() {
        ram_options = parse_ram_options(&specs.first_or_empty(keys::RAM));
    }
    if storage_options.is_empty() {
        storage_options = parse_storage_options(&specs.first_or_empty(keys::STORAGE));
    }

    let title = specs
        .first_of(keys::TITLE)
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| slug_to_title(slug));
    let brand = specs
        .first_of(keys::BRAND)
        .map(|b| b.trim().to_string())
        .unwrap_or_else(|| brand_from_slug(slug));

    NormalizedFields {
        title,
        brand,
        image: specs.first_of(keys::IMAGE).map(str::to_string),
        processor: specs.first_or_empty(keys::PROCESSOR),
        system: specs.first_or_empty(keys::SYSTEM),
        battery: specs.first_or_empty(keys::BATTERY),
        year: extract_year(&specs.first_or_empty(keys::RELEASE), clock),
        connectivity: resolve_connectivity(NetworkFlags::from_spec_map(specs)).to_string(),
        ram_options,
        storage_options,
        screen: Screen {
            size: specs.first_or_empty(keys::SCREEN_SIZE),
            resolution: specs.first_or_empty(keys::SCREEN_RESOLUTION),
            panel_type: specs.first_or_empty(keys::SCREEN_TYPE),
            refresh: specs.first_or_empty(keys::SCREEN_REFRESH),
        },
        camera: Camera {
            main: specs.first_or_empty(keys::CAMERA_MAIN),
            front: specs.first_or_empty(keys::CAMERA_FRONT),
        },
        dimensions: specs.first_or_empty(keys::DIMENSIONS),
        weight: specs.first_or_empty(keys::WEIGHT),
    }
}

fn brand_from_slug(slug: &str) -> String {
    slug.split('-').next().map(capitalize).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Memory parsing
// ---------------------------------------------------------------------------

/// Matches a magnitude with its unit: `12 GB`, `1TB`.
static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(GB|TB)\b").expect("valid regex"));

/// Matches the Portuguese list conjunction " e ".
static CONJUNCTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+e\s+").expect("valid regex"));

/// A parsed memory size in GB.
fn size_in_gb(value: &str, unit: &str) -> Option<u32> {
    let value: u32 = value.parse().ok()?;
    if unit.eq_ignore_ascii_case("TB") {
        value.checked_mul(GB_PER_TB)
    } else {
        Some(value)
    }
}

fn push_distinct(options: &mut Vec<String>, value: u32) {
    let value = value.to_string();
    if !options.contains(&value) {
        options.push(value);
    }
}

/// Split a field holding both RAM and storage figures by magnitude.
///
/// Every size below [`RAM_STORAGE_THRESHOLD_GB`] is RAM, everything at or
/// above (including any TB figure) is storage. Either side may come back
/// empty; callers fall back to the dedicated fields.
pub fn split_combined_memory(text: &str) -> (Vec<String>, Vec<String>) {
    let mut ram = Vec::new();
    let mut storage = Vec::new();

    for caps in SIZE_RE.captures_iter(text) {
        let Some(gb) = size_in_gb(&caps[1], &caps[2]) else {
            continue;
        };
        if gb < RAM_STORAGE_THRESHOLD_GB {
            push_distinct(&mut ram, gb);
        } else {
            push_distinct(&mut storage, gb);
        }
    }

    (ram, storage)
}

/// Tokenize a "4 GB, 6 GB e 8 GB" style list into distinct GB values.
fn parse_size_list(text: &str, accept_tb: bool) -> Vec<String> {
    let normalized = CONJUNCTION_RE.replace_all(text, ", ");
    let mut options = Vec::new();

    for token in normalized.split(',') {
        let Some(caps) = SIZE_RE.captures(token) else {
            continue;
        };
        if !accept_tb && caps[2].eq_ignore_ascii_case("TB") {
            continue;
        }
        if let Some(gb) = size_in_gb(&caps[1], &caps[2]) {
            push_distinct(&mut options, gb);
        }
    }

    options
}

/// RAM options from a dedicated RAM field; `["4"]` when nothing parses.
pub fn parse_ram_options(text: &str) -> Vec<String> {
    let options = parse_size_list(text, false);
    if options.is_empty() {
        vec![DEFAULT_RAM_GB.to_string()]
    } else {
        options
    }
}

/// Storage options from a dedicated storage field; `["128"]` when nothing parses.
pub fn parse_storage_options(text: &str) -> Vec<String> {
    let options = parse_size_list(text, true);
    if options.is_empty() {
        vec![DEFAULT_STORAGE_GB.to_string()]
    } else {
        options
    }
}

// ---------------------------------------------------------------------------
// Year
// ---------------------------------------------------------------------------

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").expect("valid regex"));

/// First plausible calendar year in `text`, else the clock's current year.
pub fn extract_year(text: &str, clock: &dyn Clock) -> String {
    YEAR_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| clock.current_year().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOCK: FixedClock = FixedClock(2031);

    #[test]
    fn combined_memory_threshold_boundary() {
        let (ram, storage) = split_combined_memory("8 GB, 12 GB, 23 GB, 24 GB, 256 GB e 1 TB");
        assert_eq!(ram, vec!["8", "12", "23"]);
        assert_eq!(storage, vec!["24", "256", "1000"]);
    }

    #[test]
    fn combined_memory_dedupes() {
        let (ram, storage) = split_combined_memory("12 GB + 256 GB / 12 GB + 512 GB / 16GB + 512GB");
        assert_eq!(ram, vec!["12", "16"]);
        assert_eq!(storage, vec!["256", "512"]);
    }

    #[test]
    fn tb_converts_exactly() {
        assert_eq!(parse_storage_options("1 TB"), vec!["1000"]);
        assert_eq!(parse_storage_options("2TB"), vec!["2000"]);
        assert_eq!(parse_storage_options("256 GB, 512 GB e 1 TB"), vec!["256", "512", "1000"]);
    }

    #[test]
    fn ram_list_with_conjunction() {
        assert_eq!(parse_ram_options("4 GB, 6 GB e 8 GB"), vec!["4", "6", "8"]);
        assert_eq!(parse_ram_options("8 GB E 8 GB"), vec!["8"]);
    }

    #[test]
    fn empty_fields_fall_back() {
        assert_eq!(parse_ram_options(""), vec![DEFAULT_RAM_GB]);
        assert_eq!(parse_storage_options("sem informação"), vec![DEFAULT_STORAGE_GB]);
    }

    #[test]
    fn year_from_launch_date() {
        assert_eq!(extract_year("lançado em 15/03/2024", &CLOCK), "2024");
        assert_eq!(extract_year("Dezembro 2025, 11 dias atrás", &CLOCK), "2025");
        assert_eq!(extract_year("", &CLOCK), "2031");
        assert_eq!(extract_year("modelo 12345", &CLOCK), "2031");
    }

    #[test]
    fn normalize_empty_map_uses_defaults() {
        let fields = normalize(&SpecMap::new(), "samsung-galaxy-a55", &CLOCK);
        assert_eq!(fields.title, "Samsung Galaxy A55");
        assert_eq!(fields.brand, "Samsung");
        assert_eq!(fields.processor, "");
        assert_eq!(fields.year, "2031");
        assert_eq!(fields.connectivity, "4G");
        assert_eq!(fields.ram_options, vec!["4"]);
        assert_eq!(fields.storage_options, vec!["128"]);
    }

    #[test]
    fn normalize_uses_fallback_keys() {
        let specs: SpecMap = [
            ("Chipset", "Dimensity 9300"),
            ("OS", "Android 14"),
            ("RAM", "12 GB e 16 GB"),
            ("Storage", "256 GB e 1 TB"),
            ("Lançamento", "2024"),
            ("5G", "Sim"),
            ("4G", "Sim"),
            ("Selfie", "32 MP"),
        ]
        .into_iter()
        .collect();

        let fields = normalize(&specs, "vivo-x100-pro", &CLOCK);
        assert_eq!(fields.processor, "Dimensity 9300");
        assert_eq!(fields.system, "Android 14");
        assert_eq!(fields.ram_options, vec!["12", "16"]);
        assert_eq!(fields.storage_options, vec!["256", "1000"]);
        assert_eq!(fields.year, "2024");
        assert_eq!(fields.connectivity, "4G/5G");
        assert_eq!(fields.camera.front, "32 MP");
    }

    #[test]
    fn combined_field_fills_only_missing_side() {
        let specs: SpecMap = [("Memórias", "8 GB, 12 GB"), ("Armazenamento", "512 GB")]
            .into_iter()
            .collect();
        let fields = normalize(&specs, "x", &CLOCK);
        assert_eq!(fields.ram_options, vec!["8", "12"]);
        assert_eq!(fields.storage_options, vec!["512"]);
    }

    #[test]
    fn explicit_title_and_brand_win() {
        let specs: SpecMap = [("Título", "Apple iPhone 16 Pro"), ("Marca", "Apple")]
            .into_iter()
            .collect();
        let fields = normalize(&specs, "iphone-16-pro", &CLOCK);
        assert_eq!(fields.title, "Apple iPhone 16 Pro");
        assert_eq!(fields.brand, "Apple");
    }
}
