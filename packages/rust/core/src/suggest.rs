//! Kimovil device-name autocomplete.
//!
//! The endpoint answers `{"results": [...]}` with a mix of phones, tablets,
//! brands and other result kinds. Only phone models (`type == 0` and
//! `result_type == "smartphones"`) are kept. Their `url` identifies the
//! device page that [`scrape_kimovil`](crate::scrape_kimovil) reads.

use phonespec_shared::{PhoneSpecError, Result, SourcesConfig};
use serde::{Deserialize, Serialize};
use url::Url;

/// Queries shorter than this return no suggestions without a request.
pub const MIN_SUGGEST_CHARS: usize = 3;

/// Upper bound on suggestions returned per query.
pub const MAX_SUGGESTIONS: usize = 8;

/// `type` value of device-model results.
const DEVICE_MODEL_TYPE: i64 = 0;

/// `result_type` value of phone results.
const SMARTPHONE_RESULT_TYPE: &str = "smartphones";

/// Top-level autocomplete response.
#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    results: Vec<DeviceSuggestion>,
}

/// One autocomplete entry. Fields beyond the ones read here are passed
/// through untouched so callers see the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSuggestion {
    /// Display name, e.g. `"Samsung Galaxy S24"`.
    #[serde(default)]
    pub name: String,

    /// Device page identifier, e.g. `"samsung-galaxy-s24"`.
    #[serde(default)]
    pub url: String,

    /// Result kind. Absent on some non-device entries.
    #[serde(rename = "type", default)]
    pub kind: Option<i64>,

    #[serde(default)]
    pub result_type: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeviceSuggestion {
    pub fn is_smartphone(&self) -> bool {
        self.kind == Some(DEVICE_MODEL_TYPE) && self.result_type == SMARTPHONE_RESULT_TYPE
    }
}

/// Whether `name` is long enough to be worth a lookup.
pub fn is_suggestible(name: &str) -> bool {
    name.trim().chars().count() >= MIN_SUGGEST_CHARS
}

/// Autocomplete request URL for a partial device name.
pub fn autocomplete_url(sources: &SourcesConfig, name: &str) -> Result<Url> {
    Url::parse_with_params(
        &sources.kimovil_autocomplete_url,
        &[("device_type", "0"), ("name", name.trim())],
    )
    .map_err(|e| {
        PhoneSpecError::config(format!(
            "invalid kimovil_autocomplete_url '{}': {e}",
            sources.kimovil_autocomplete_url
        ))
    })
}

/// Decode an autocomplete body into at most [`MAX_SUGGESTIONS`] phone models,
/// in response order.
pub fn parse_suggestions(body: &str) -> Result<Vec<DeviceSuggestion>> {
    let response: AutocompleteResponse = serde_json::from_str(body)
        .map_err(|e| PhoneSpecError::Fetch(format!("invalid autocomplete response: {e}")))?;

    Ok(response
        .results
        .into_iter()
        .filter(DeviceSuggestion::is_smartphone)
        .take(MAX_SUGGESTIONS)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_smartphone_models() {
        let body = r#"{"results": [
            {"name": "Samsung", "url": "samsung", "type": 1, "result_type": "brands"},
            {"name": "Galaxy Tab S9", "url": "samsung-galaxy-tab-s9", "type": 0, "result_type": "tablets"},
            {"name": "Galaxy S24", "url": "samsung-galaxy-s24", "type": 0, "result_type": "smartphones", "score": 12},
            {"name": "Galaxy S24 FE", "url": "samsung-galaxy-s24-fe", "result_type": "smartphones"}
        ]}"#;

        let suggestions = parse_suggestions(body).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].url, "samsung-galaxy-s24");
        assert_eq!(suggestions[0].extra.get("score"), Some(&serde_json::json!(12)));
    }

    #[test]
    fn caps_at_eight_in_order() {
        let items: Vec<String> = (1..=12)
            .map(|i| format!(r#"{{"name": "Phone {i}", "url": "phone-{i}", "type": 0, "result_type": "smartphones"}}"#))
            .collect();
        let body = format!(r#"{{"results": [{}]}}"#, items.join(","));

        let suggestions = parse_suggestions(&body).unwrap();
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions[0].name, "Phone 1");
        assert_eq!(suggestions[7].name, "Phone 8");
    }

    #[test]
    fn missing_results_is_empty() {
        assert!(parse_suggestions("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_fetch_error() {
        let err = parse_suggestions("<html>blocked</html>").unwrap_err();
        assert!(matches!(err, PhoneSpecError::Fetch(_)));
    }

    #[test]
    fn short_names_not_suggestible() {
        assert!(!is_suggestible(""));
        assert!(!is_suggestible(" s2 "));
        assert!(is_suggestible("s24"));
        assert!(is_suggestible("Moto"));
    }

    #[test]
    fn url_encodes_name_and_device_type() {
        let url = autocomplete_url(&SourcesConfig::default(), "galaxy s24+").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.kimovil.com/_json/autocomplete_devicemodels_joined.json?device_type=0&name=galaxy+s24%2B"
        );
    }
}
