//! Translation-aware network content source.
//!
//! Two file shapes are served under the content root:
//!
//! - `<root>/<translation-dir>/index.json` — book key to index entry
//! - `<root>/<translation-dir>/<book>.json` — one whole book
//!
//! The translation directory comes from [`Translation::path_root`]; the KJV
//! deviates from the `<id>/` convention, so paths are never hardcoded here.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use lectern_core::types::WireBook;
use lectern_core::{AppConfig, BookIndex, Error, Translation};

/// Where book indexes and book content files come from.
///
/// The loader is written against this trait so tests can count and fail
/// fetches without a network.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the book index for a translation.
    async fn fetch_index(&self, translation: Translation) -> Result<BookIndex, Error>;

    /// Fetch one book's content file.
    async fn fetch_book(&self, translation: Translation, book_key: &str) -> Result<WireBook, Error>;
}

/// HTTP content source over the configured content root.
pub struct HttpContentSource {
    http: Client,
    base: Url,
}

impl HttpContentSource {
    /// Build a client from the application configuration.
    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .use_rustls_tls()
            .gzip(true)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;

        // Url::join treats a path without a trailing slash as a file.
        let mut base = config.content_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| Error::InvalidInput(format!("content_base_url: {e}")))?;

        Ok(Self { http, base })
    }

    fn file_url(&self, translation: Translation, file: &str) -> Result<Url, Error> {
        self.base
            .join(&format!("{}/{}", translation.path_root(), file))
            .map_err(|e| Error::InvalidInput(format!("content path: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(url.to_string())
            } else {
                Error::Http(format!("network error for {url}: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(format!("status {} for {url}", status.as_u16())));
        }

        response
            .json()
            .await
            .map_err(|e| Error::MalformedPayload(format!("{url}: {e}")))
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_index(&self, translation: Translation) -> Result<BookIndex, Error> {
        let url = self.file_url(translation, "index.json")?;
        tracing::debug!(%url, %translation, "fetching book index");
        self.get_json(url).await
    }

    async fn fetch_book(&self, translation: Translation, book_key: &str) -> Result<WireBook, Error> {
        let url = self.file_url(translation, &format!("{book_key}.json"))?;
        tracing::debug!(%url, %translation, book = %book_key, "fetching book file");
        self.get_json(url).await
    }
}
