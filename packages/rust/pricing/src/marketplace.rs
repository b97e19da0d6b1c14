//! Supported marketplaces and their search URLs.

use std::fmt;
use std::str::FromStr;

use phonespec_shared::{PhoneSpecError, Result, SourcesConfig};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::filter::strip_brand;

/// A second-hand / retail marketplace queried for prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    Olx,
    Amazon,
    MercadoLivre,
}

impl Marketplace {
    pub const ALL: [Marketplace; 3] = [Self::Olx, Self::Amazon, Self::MercadoLivre];

    /// Stable lower-case identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Olx => "olx",
            Self::Amazon => "amazon",
            Self::MercadoLivre => "mercadolivre",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Olx => "OLX",
            Self::Amazon => "Amazon",
            Self::MercadoLivre => "Mercado Livre",
        }
    }

    /// Search URL for `name` + `storage` under the configured base.
    ///
    /// OLX and Mercado Livre search without the leading brand; Amazon
    /// indexes it and keeps it.
    pub fn search_url(self, sources: &SourcesConfig, name: &str, storage: &str) -> Result<Url> {
        match self {
            Self::Olx => {
                let query = format!("{} {}", strip_brand(name), storage.trim());
                Url::parse_with_params(
                    &sources.olx_base,
                    &[("q", query.as_str()), ("elcd", "3"), ("elcd", "2")],
                )
                .map_err(|e| bad_base(self, &sources.olx_base, e))
            }
            Self::Amazon => {
                let query = format!("{} {}", name.trim(), storage.trim());
                Url::parse_with_params(&sources.amazon_base, &[("k", query.as_str())])
                    .map_err(|e| bad_base(self, &sources.amazon_base, e))
            }
            Self::MercadoLivre => {
                let segment = mercadolivre_segment(&strip_brand(name), storage);
                let mut url = Url::parse(&sources.mercadolivre_base)
                    .map_err(|e| bad_base(self, &sources.mercadolivre_base, e))?;
                url.path_segments_mut()
                    .map_err(|()| {
                        PhoneSpecError::config(format!(
                            "mercadolivre base URL cannot take a path: {}",
                            sources.mercadolivre_base
                        ))
                    })?
                    .pop_if_empty()
                    .push(&segment);
                Ok(url)
            }
        }
    }
}

fn bad_base(marketplace: Marketplace, base: &str, err: url::ParseError) -> PhoneSpecError {
    PhoneSpecError::config(format!("invalid {} base URL '{base}': {err}", marketplace.id()))
}

/// "iPhone 15 256GB" → "iphone-15-256".
fn mercadolivre_segment(name: &str, storage: &str) -> String {
    format!("{} {}", name.trim(), storage.trim())
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .replace("gb", "")
        .replace("tb", "")
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Marketplace {
    type Err = PhoneSpecError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        Self::ALL
            .into_iter()
            .find(|m| m.id() == wanted)
            .ok_or_else(|| {
                PhoneSpecError::validation(format!(
                    "unknown marketplace '{s}': expected olx, amazon or mercadolivre"
                ))
            })
    }
}
