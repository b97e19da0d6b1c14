//! Combined cellular-generation label from independent network flags.

use phonespec_shared::SpecMap;

/// Label used when no generation was detected. Not proof of 4G support.
pub const FALLBACK_CONNECTIVITY: &str = "4G";

/// Independent per-generation support flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkFlags {
    pub has_3g: bool,
    pub has_4g: bool,
    pub has_5g: bool,
}

impl NetworkFlags {
    pub fn new(has_3g: bool, has_4g: bool, has_5g: bool) -> Self {
        Self {
            has_3g,
            has_4g,
            has_5g,
        }
    }

    /// Read the `3G` / `4G` / `5G` = "Sim" markers from a SpecMap.
    pub fn from_spec_map(specs: &SpecMap) -> Self {
        Self {
            has_3g: specs.is_yes("3G"),
            has_4g: specs.is_yes("4G"),
            has_5g: specs.is_yes("5G"),
        }
    }

    /// Merge flags from a band-table row header.
    ///
    /// 2G rows never set anything; `5G`/`NR` and `4G`/`LTE` match anywhere in
    /// the header, 3G only as the whole header.
    pub fn observe_band_header(&mut self, header: &str) {
        let header = header.trim().to_ascii_uppercase();
        if header == "2G" {
            return;
        }
        if header.contains("5G") || header.contains("NR") {
            self.has_5g = true;
        }
        if header.contains("4G") || header.contains("LTE") {
            self.has_4g = true;
        }
        if header == "3G" {
            self.has_3g = true;
        }
    }

    /// Write the detected flags back as `"Sim"` markers.
    pub fn write_into(&self, specs: &mut SpecMap) {
        for (key, set) in [("3G", self.has_3g), ("4G", self.has_4g), ("5G", self.has_5g)] {
            if set {
                specs.insert(key, "Sim");
            }
        }
    }
}

/// Resolve the combined label by fixed precedence.
///
/// Triple, then the 4G/5G and 3G/4G pairs, then singles from newest to
/// oldest. A lone 3G+5G pair (no 4G) resolves to "5G".
pub fn resolve_connectivity(flags: NetworkFlags) -> &'static str {
    let NetworkFlags {
        has_3g,
        has_4g,
        has_5g,
    } = flags;

    match (has_3g, has_4g, has_5g) {
        (true, true, true) => "3G/4G/5G",
        (_, true, true) => "4G/5G",
        (true, true, false) => "3G/4G",
        (_, _, true) => "5G",
        (_, true, _) => "4G",
        (true, _, _) => "3G",
        _ => FALLBACK_CONNECTIVITY,
    }
}
