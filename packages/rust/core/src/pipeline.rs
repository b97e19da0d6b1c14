//! Request pipelines: validate input → build URL → fetch → extract or price.

use std::time::Instant;

use phonespec_extract::{ExtractionOutcome, KimovilSource, OficinaDaNetSource, SystemClock, extract_with};
use phonespec_pricing::{Marketplace, price_page};
use phonespec_shared::{PhoneSpecError, PriceSummary, Result, SourcesConfig, format_slug};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::fetch::DocumentFetcher;
use crate::suggest::{DeviceSuggestion, autocomplete_url, is_suggestible, parse_suggestions};

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the pipeline has a result.
    fn done(&self, summary: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _summary: &str) {}
}

/// Reject a blank required parameter before any work is done.
fn require<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PhoneSpecError::empty_input(field));
    }
    Ok(value)
}

/// Append one path segment to a configured base URL.
fn join_segment(base: &str, segment: &str) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| PhoneSpecError::config(format!("invalid base URL '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|()| PhoneSpecError::config(format!("base URL cannot take a path: {base}")))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

/// Oficina da Net page URL for a free-text phone name.
pub fn oficinadanet_url(sources: &SourcesConfig, term: &str) -> Result<Url> {
    join_segment(&sources.oficinadanet_base, &format_slug(term))
}

/// Kimovil "where to buy" page URL for a device path like `samsung-galaxy-s24`.
pub fn kimovil_url(sources: &SourcesConfig, device_path: &str) -> Result<Url> {
    let device_path = device_path.trim().trim_matches('/');
    join_segment(&sources.kimovil_base, &format!("onde-comprar-{device_path}"))
}

fn log_outcome(outcome: &ExtractionOutcome, progress: &dyn ProgressReporter) {
    if outcome.is_no_signal() {
        warn!("page yielded no fields, draft holds defaults only");
    }
    progress.done(&format!(
        "{}: {} variant(s), {} field(s) found",
        outcome.draft.title,
        outcome.draft.variants.len(),
        outcome.fields_found
    ));
}

/// Look a phone up by name on the description source.
#[instrument(skip_all, fields(term = %term))]
pub async fn search_phone<F: DocumentFetcher>(
    fetcher: &F,
    sources: &SourcesConfig,
    term: &str,
    progress: &dyn ProgressReporter,
) -> Result<ExtractionOutcome> {
    let start = Instant::now();
    let term = require("term", term)?;
    let slug = format_slug(term);
    if slug.is_empty() {
        return Err(PhoneSpecError::validation(format!(
            "'{term}' has no letters or digits to search for"
        )));
    }
    let url = oficinadanet_url(sources, term)?;

    progress.phase("Fetching spec page");
    info!(%url, "searching phone");
    let document = fetcher.fetch(&url).await?;

    progress.phase("Extracting specs");
    let outcome = extract_with(&document, &OficinaDaNetSource, &slug, &SystemClock);
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "search complete");
    log_outcome(&outcome, progress);
    Ok(outcome)
}

/// Scrape a Kimovil device page by its path.
#[instrument(skip_all, fields(path = %device_path))]
pub async fn scrape_kimovil<F: DocumentFetcher>(
    fetcher: &F,
    sources: &SourcesConfig,
    device_path: &str,
    progress: &dyn ProgressReporter,
) -> Result<ExtractionOutcome> {
    let device_path = require("path", device_path)?;
    let url = kimovil_url(sources, device_path)?;

    progress.phase("Fetching Kimovil page");
    info!(%url, "scraping kimovil");
    let document = fetcher.fetch(&url).await?;

    progress.phase("Extracting specs");
    let slug = format_slug(device_path);
    let outcome = extract_with(&document, &KimovilSource, &slug, &SystemClock);
    log_outcome(&outcome, progress);
    Ok(outcome)
}

/// Phone-model suggestions for a partial name, for picking a Kimovil page.
///
/// Names shorter than three characters yield no suggestions and no request.
#[instrument(skip_all, fields(name = %name))]
pub async fn suggest_devices<F: DocumentFetcher>(
    fetcher: &F,
    sources: &SourcesConfig,
    name: &str,
    progress: &dyn ProgressReporter,
) -> Result<Vec<DeviceSuggestion>> {
    if !is_suggestible(name) {
        debug!("name too short, skipping autocomplete");
        progress.done("Type at least 3 characters for suggestions");
        return Ok(Vec::new());
    }
    let url = autocomplete_url(sources, name)?;

    progress.phase("Fetching suggestions");
    info!(%url, "querying kimovil autocomplete");
    let body = fetcher.fetch(&url).await?;

    let suggestions = parse_suggestions(&body)?;
    info!(count = suggestions.len(), "suggestions found");
    progress.done(&format!("{} suggestion(s)", suggestions.len()));
    Ok(suggestions)
}

/// Fetch one marketplace search and summarize relevant listing prices.
#[instrument(skip_all, fields(%marketplace, name = %name, storage = %storage))]
pub async fn marketplace_prices<F: DocumentFetcher>(
    fetcher: &F,
    sources: &SourcesConfig,
    marketplace: Marketplace,
    name: &str,
    storage: &str,
    progress: &dyn ProgressReporter,
) -> Result<PriceSummary> {
    let name = require("name", name)?;
    let storage = require("storage", storage)?;
    let url = marketplace.search_url(sources, name, storage)?;

    progress.phase(&format!("Searching {}", marketplace.label()));
    info!(%url, "fetching marketplace listings");
    let document = fetcher.fetch(&url).await?;

    progress.phase("Filtering listings");
    let summary = price_page(marketplace, &document, name, storage);
    progress.done(&if summary.has_data() {
        format!(
            "{} price(s) on {}: R$ {} - R$ {}",
            summary.count,
            marketplace.label(),
            summary.min_value,
            summary.max_value
        )
    } else {
        format!("No prices found on {}", marketplace.label())
    });
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::fetch::HttpFetcher;
    use phonespec_shared::FetchConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixture(name: &str) -> String {
        let path = format!("{}/../../../fixtures/html/{name}", env!("CARGO_MANIFEST_DIR"));
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {path}: {e}"))
    }

    fn sources_for(server: &MockServer) -> SourcesConfig {
        let uri = server.uri();
        SourcesConfig {
            oficinadanet_base: format!("{uri}/smartphones"),
            kimovil_base: format!("{uri}/pt"),
            kimovil_autocomplete_url: format!("{uri}/_json/autocomplete_devicemodels_joined.json"),
            olx_base: format!("{uri}/celulares"),
            amazon_base: format!("{uri}/s"),
            mercadolivre_base: format!("{uri}/celulares-smartphones/novo"),
        }
    }

    fn http() -> HttpFetcher {
        HttpFetcher::new(&FetchConfig::default()).unwrap()
    }

    /// In-memory fetcher keyed by full URL.
    struct MapFetcher {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl DocumentFetcher for MapFetcher {
        async fn fetch(&self, url: &Url) -> Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| PhoneSpecError::not_found(url.as_str()))
        }
    }

    #[tokio::test]
    async fn search_phone_extracts_from_slugged_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/smartphones/samsung-galaxy-s24-ultra"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("oficinadanet.html")))
            .mount(&server)
            .await;

        let outcome = search_phone(&http(), &sources_for(&server), "Samsung Galaxy S24 Ultra", &SilentProgress)
            .await
            .unwrap();

        assert_eq!(outcome.draft.title, "Samsung Galaxy S24 Ultra");
        assert_eq!(outcome.draft.connectivity, "4G/5G");
        assert_eq!(outcome.draft.variants.len(), 3);
        assert_eq!(outcome.draft.source, "oficinadanet");
    }

    #[tokio::test]
    async fn search_phone_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = search_phone(&http(), &sources_for(&server), "Nokia 9999", &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, PhoneSpecError::NotFound { .. }));
        assert_eq!(err.user_message(), "Phone not found. Check the name and try again.");
    }

    #[tokio::test]
    async fn blank_inputs_rejected_before_fetch() {
        let fetcher = MapFetcher {
            pages: HashMap::new(),
            requested: Mutex::new(Vec::new()),
        };
        let sources = SourcesConfig::default();

        let err = search_phone(&fetcher, &sources, "   ", &SilentProgress).await.unwrap_err();
        assert!(matches!(err, PhoneSpecError::EmptyInput { ref field } if field == "term"));

        let err = scrape_kimovil(&fetcher, &sources, "", &SilentProgress).await.unwrap_err();
        assert!(matches!(err, PhoneSpecError::EmptyInput { ref field } if field == "path"));

        let err = marketplace_prices(&fetcher, &sources, Marketplace::Olx, "iPhone 15", " ", &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, PhoneSpecError::EmptyInput { ref field } if field == "storage"));

        assert!(fetcher.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn kimovil_uses_where_to_buy_path() {
        let sources = SourcesConfig::default();
        let url = kimovil_url(&sources, "samsung-galaxy-s24").unwrap();
        assert_eq!(url.as_str(), "https://www.kimovil.com/pt/onde-comprar-samsung-galaxy-s24");

        let fetcher = MapFetcher {
            pages: HashMap::from([(url.to_string(), fixture("kimovil.html"))]),
            requested: Mutex::new(Vec::new()),
        };
        let outcome = scrape_kimovil(&fetcher, &sources, "samsung-galaxy-s24", &SilentProgress)
            .await
            .unwrap();
        assert_eq!(outcome.draft.source, "kimovil");
        assert_eq!(outcome.draft.variants.len(), 2);
    }

    #[tokio::test]
    async fn suggestions_filtered_to_phones_and_capped() {
        let server = MockServer::start().await;
        let mut results = vec![
            serde_json::json!({"name": "Samsung", "url": "samsung", "type": 2, "result_type": "brands"}),
            serde_json::json!({"name": "Galaxy Tab S9", "url": "samsung-galaxy-tab-s9", "type": 0, "result_type": "tablets"}),
        ];
        for i in 1..=10 {
            results.push(serde_json::json!({
                "name": format!("Galaxy S{i}"),
                "url": format!("samsung-galaxy-s{i}"),
                "type": 0,
                "result_type": "smartphones",
            }));
        }
        Mock::given(method("GET"))
            .and(path("/_json/autocomplete_devicemodels_joined.json"))
            .and(query_param("device_type", "0"))
            .and(query_param("name", "galaxy s"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": results })))
            .mount(&server)
            .await;

        let suggestions = suggest_devices(&http(), &sources_for(&server), "galaxy s", &SilentProgress)
            .await
            .unwrap();

        assert_eq!(suggestions.len(), 8);
        assert!(suggestions.iter().all(DeviceSuggestion::is_smartphone));
        assert_eq!(suggestions[0].url, "samsung-galaxy-s1");
        assert_eq!(suggestions[7].url, "samsung-galaxy-s8");
    }

    #[tokio::test]
    async fn short_suggestion_query_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        for name in ["", "ga", " s2 "] {
            let suggestions = suggest_devices(&http(), &sources_for(&server), name, &SilentProgress)
                .await
                .unwrap();
            assert!(suggestions.is_empty());
        }
    }

    #[tokio::test]
    async fn olx_prices_filtered_and_summarized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/celulares"))
            .and(query_param("q", "iPhone 15 Pro 256GB"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("olx.html")))
            .mount(&server)
            .await;

        let summary = marketplace_prices(
            &http(),
            &sources_for(&server),
            Marketplace::Olx,
            "Apple iPhone 15 Pro",
            "256GB",
            &SilentProgress,
        )
        .await
        .unwrap();

        assert_eq!(summary.count, 2);
        assert_eq!(summary.min_value, 5500);
        assert_eq!(summary.med_value, 5700);
        assert_eq!(summary.max_value, 5899);
    }

    #[tokio::test]
    async fn marketplace_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = marketplace_prices(
            &http(),
            &sources_for(&server),
            Marketplace::MercadoLivre,
            "Galaxy S24",
            "256GB",
            &SilentProgress,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PhoneSpecError::Fetch(_)));
    }
}
