//! Document fetching.
//!
//! One GET per logical request, bounded by the configured timeout. There is
//! no retry policy: a failure is terminal for that request.

use std::future::Future;
use std::time::Duration;

use phonespec_shared::{FetchConfig, PhoneSpecError, Result};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;

/// Accept header sent with every page request.
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Retrieves a document by URL.
///
/// Implementations map an upstream 404 to [`PhoneSpecError::NotFound`] and
/// every other transport or status failure to [`PhoneSpecError::Fetch`].
pub trait DocumentFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

/// reqwest-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client from runtime fetch settings.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        let language = HeaderValue::from_str(&config.accept_language).map_err(|e| {
            PhoneSpecError::config(format!(
                "invalid accept_language '{}': {e}",
                config.accept_language
            ))
        })?;
        headers.insert(ACCEPT_LANGUAGE, language);

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PhoneSpecError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl DocumentFetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PhoneSpecError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PhoneSpecError::not_found(url.as_str()));
        }
        if !status.is_success() {
            return Err(PhoneSpecError::Fetch(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PhoneSpecError::Fetch(format!("{url}: failed to read body: {e}")))?;

        debug!(bytes = body.len(), "document fetched");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn returns_body_and_sends_locale() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/smartphones/galaxy-s24"))
            .and(header("accept-language", FetchConfig::default().accept_language.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/smartphones/galaxy-s24", server.uri())).unwrap();
        assert_eq!(fetcher().fetch(&url).await.unwrap(), "<html>ok</html>");
    }

    #[tokio::test]
    async fn not_found_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, PhoneSpecError::NotFound { .. }));
    }

    #[tokio::test]
    async fn server_error_maps_to_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/busy", server.uri())).unwrap();
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, PhoneSpecError::Fetch(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn timeout_maps_to_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let config = FetchConfig {
            timeout_secs: 1,
            ..FetchConfig::default()
        };
        let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();
        let err = HttpFetcher::new(&config).unwrap().fetch(&url).await.unwrap_err();
        assert!(matches!(err, PhoneSpecError::Fetch(_)));
    }
}
