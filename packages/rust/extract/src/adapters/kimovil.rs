//! Tabular source (Kimovil "where to buy" pages).
//!
//! Kimovil lays its data out as `table.k-dltable` blocks under section
//! headings, plus a version/price table listing every regional
//! RAM × storage combination. Rows come back pre-paired, so this adapter
//! reports [`VersionRow`]s instead of letting the normalizer cross lists.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{META_DESCRIPTION, SourceExtraction, SpecSource, element_text, meta_content};
use crate::connectivity::NetworkFlags;
use crate::normalize::GB_PER_TB;
use crate::variants::VersionRow;
use phonespec_shared::SpecMap;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("selector {css}: {e}"))
}

static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:title"]"#));
static DL_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table.k-dltable"));
static ANY_DL_ROW: LazyLock<Selector> = LazyLock::new(|| selector(".k-dltable tr"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static TH: LazyLock<Selector> = LazyLock::new(|| selector("th"));
static TD: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static SECTION_HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h2.k-h3, h3.k-h4"));
static VERSION_ROWS: LazyLock<Selector> =
    LazyLock::new(|| selector("#js_version-prices-table tr"));
static GALLERY_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector(".device-photos-list .item.image a.kigallery"));

static DESCRIPTION_PROCESSOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Processador:\s*([^,]+)").expect("valid regex"));
static MARKUP_PROCESSOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Processador[^:]*:\s*([^<,\n]+)").expect("valid regex"));
static RELEASE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Lançamento").expect("valid regex"));
static RELEASE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Lançamento$").expect("valid regex"));
static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").expect("valid regex"));
static CONNECTIVITY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Conectividade|Bandas").expect("valid regex"));
static MODEL_CODE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*·\s*[A-Z]{2}-[A-Z0-9]+\s*$").expect("valid regex"));
static GB_PART: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)GB$").expect("valid regex"));
static TB_PART: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)TB$").expect("valid regex"));

/// Kimovil spec-table extractor.
pub struct KimovilSource;

impl KimovilSource {
    pub const ID: &'static str = "kimovil";
}

impl SpecSource for KimovilSource {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn detect(&self, doc: &Html) -> bool {
        doc.select(&DL_TABLE).next().is_some() || doc.select(&VERSION_ROWS).next().is_some()
    }

    fn extract(&self, doc: &Html, raw: &str) -> SourceExtraction {
        let mut specs = SpecMap::new();

        let title = meta_content(doc, &OG_TITLE)
            .and_then(|t| t.split(':').next().map(|s| s.trim().to_string()))
            .unwrap_or_default();
        if !title.is_empty() {
            if let Some(brand) = title.split_whitespace().next() {
                specs.insert("Marca", brand);
            }
            specs.insert("Título", title.as_str());
        }

        if let Some(processor) = processor(doc, raw) {
            specs.insert("Processador", processor);
        }
        if let Some(year) = release_year(doc) {
            specs.insert("Lançamento", year);
        }
        band_flags(doc).write_into(&mut specs);
        if let Some(image) = image(doc) {
            specs.insert("Imagem", image);
        }

        let versions = version_rows(doc);
        debug!(
            %title,
            fields = specs.len(),
            versions = versions.len(),
            "kimovil source extracted"
        );

        SourceExtraction { specs, versions }
    }
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

/// `th` / `td` text pair of a table row.
fn row_cells(row: ElementRef<'_>) -> (String, String) {
    let th = row.select(&TH).next().map(element_text).unwrap_or_default();
    let td = row.select(&TD).next().map(element_text).unwrap_or_default();
    (th, td)
}

fn processor(doc: &Html, raw: &str) -> Option<String> {
    let from_table = doc
        .select(&ANY_DL_ROW)
        .map(row_cells)
        .find(|(th, td)| th.eq_ignore_ascii_case("modelo") && !td.is_empty())
        .map(|(_, td)| td);
    if from_table.is_some() {
        return from_table;
    }

    let description = meta_content(doc, &META_DESCRIPTION).unwrap_or_default();
    DESCRIPTION_PROCESSOR
        .captures(&description)
        .or_else(|| MARKUP_PROCESSOR.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|p| !p.is_empty())
}

/// First `table.k-dltable` following each heading whose text matches `heading`.
fn section_tables<'a>(doc: &'a Html, heading: &'a Regex) -> impl Iterator<Item = ElementRef<'a>> {
    doc.select(&SECTION_HEADING)
        .filter(move |h| heading.is_match(&element_text(*h)))
        .filter_map(|h| {
            h.next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|el| DL_TABLE.matches(el))
        })
}

fn release_year(doc: &Html) -> Option<String> {
    section_tables(doc, &RELEASE_HEADING)
        .flat_map(|table| table.select(&ROW).map(row_cells).collect::<Vec<_>>())
        .filter(|(th, _)| RELEASE_ROW.is_match(th))
        .find_map(|(_, td)| YEAR.captures(&td).map(|c| c[1].to_string()))
}

fn band_flags(doc: &Html) -> NetworkFlags {
    let mut flags = NetworkFlags::default();
    for table in section_tables(doc, &CONNECTIVITY_HEADING) {
        for (th, _) in table.select(&ROW).map(row_cells) {
            flags.observe_band_header(&th);
        }
    }
    flags
}

fn image(doc: &Html) -> Option<String> {
    let href = doc.select(&GALLERY_LINK).next()?.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    Some(match href.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => href.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Version table
// ---------------------------------------------------------------------------

/// Region bucket of a version label; lower sorts first.
fn region_rank(label: &str) -> u8 {
    if label.contains("Global") {
        0
    } else if label.contains("China") {
        1
    } else {
        2
    }
}

/// Version labels from the price table, restricted to the best region.
fn version_labels(doc: &Html) -> Vec<String> {
    let mut buckets: [Vec<String>; 3] = Default::default();
    for row in doc.select(&VERSION_ROWS) {
        let Some(th) = row.select(&TH).next() else {
            continue;
        };
        let text = element_text(th);
        let Some(label) = text.split('•').nth(1).map(str::trim) else {
            continue;
        };
        let clean = MODEL_CODE_SUFFIX.replace(label, "").trim().to_string();
        buckets[region_rank(label) as usize].push(clean);
    }
    buckets.into_iter().find(|b| !b.is_empty()).unwrap_or_default()
}

/// Parse "Global · 8GB · 256GB" into a RAM/storage pair.
///
/// The first `NGB` part is RAM, the next is storage; an `NTB` part is
/// storage in thousands of GB.
pub(crate) fn parse_version_label(label: &str) -> Option<VersionRow> {
    let mut ram: Option<String> = None;
    let mut storage: Option<String> = None;

    for part in label.split('·').map(str::trim) {
        if let Some(caps) = GB_PART.captures(part) {
            if ram.is_none() {
                ram = Some(caps[1].to_string());
            } else {
                storage = Some(caps[1].to_string());
            }
        } else if let Some(caps) = TB_PART.captures(part) {
            let tb: u32 = caps[1].parse().ok()?;
            storage = Some(tb.checked_mul(GB_PER_TB)?.to_string());
        }
    }

    Some(VersionRow {
        ram_gb: ram?,
        storage_gb: storage?,
    })
}

fn version_rows(doc: &Html) -> Vec<VersionRow> {
    version_labels(doc)
        .iter()
        .filter_map(|label| {
            let row = parse_version_label(label);
            if row.is_none() {
                debug!(%label, "skipping version without RAM and storage");
            }
            row
        })
        .collect()
}
