//! The Big Waffle reader.
//!
//! [`BigWaffleReader`] addresses one dataset on one service. It builds request
//! URLs, delegates the fetch to its [`Transport`], classifies the response and
//! reshapes tabular bodies into [`Record`]s.
//!
//! ## Version pinning
//!
//! The only mutable state is the pinned dataset version. It starts as the
//! configured version (often none) and is replaced whenever a record response
//! reports one. Concurrent reads that observe different versions race on the
//! update and the last writer wins.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    reshape::decode_rows, Asset, AssetPath, DatasetId, ParserRegistry, ReaderConfig, ReaderError,
    Record, TabularResult, Transport, TransportResponse, Version,
};

// ---------------------------------------------------------------------------
// Caller-facing port
// ---------------------------------------------------------------------------

/// The two operations a host framework consumes.
///
/// Object safe, so hosts can hold an `Arc<dyn DdfReader>` and copy it into
/// whatever structure they assemble readers from.
#[async_trait]
pub trait DdfReader: Send + Sync {
    /// Fetches a named asset of the dataset.
    async fn get_asset(&self, path: &str) -> Result<Asset, ReaderError>;

    /// Runs `query` and returns one record per result row.
    async fn read(&self, query: &Value, parsers: &ParserRegistry)
        -> Result<Vec<Record>, ReaderError>;
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Client for one dataset on a Big Waffle service.
///
/// Cloning is cheap; clones share the transport and the pinned version.
#[derive(Clone)]
pub struct BigWaffleReader {
    inner: Arc<Inner>,
}

struct Inner {
    dataset: DatasetId,
    service: Url,
    version: RwLock<Option<Version>>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for BigWaffleReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigWaffleReader")
            .field("dataset", &self.inner.dataset)
            .field("service", &self.inner.service.as_str())
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

impl BigWaffleReader {
    /// Creates a reader for `config` that fetches through `transport`.
    pub fn new(config: ReaderConfig, transport: Arc<dyn Transport>) -> Self {
        let (dataset, service, version) = config.into_parts();
        Self {
            inner: Arc::new(Inner {
                dataset,
                service,
                version: RwLock::new(version),
                transport,
            }),
        }
    }

    /// Dataset addressed by this reader.
    pub fn dataset(&self) -> &DatasetId {
        &self.inner.dataset
    }

    /// Base URL of the service.
    pub fn service(&self) -> &Url {
        &self.inner.service
    }

    /// Currently pinned dataset version.
    pub fn version(&self) -> Option<Version> {
        self.inner
            .version
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn pin_version(&self, version: Version) {
        let mut slot = self
            .inner
            .version
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.as_ref() != Some(&version) {
            info!(dataset = %self.inner.dataset, %version, "Pinning dataset version");
            *slot = Some(version);
        }
    }

    // -----------------------------------------------------------------------
    // URL construction
    // -----------------------------------------------------------------------

    /// `{service}/{dataset}[/{version}]` followed by `extra` path segments.
    fn dataset_url<'a>(&self, extra: impl IntoIterator<Item = &'a str>) -> Result<Url, ReaderError> {
        let mut url = self.inner.service.clone();
        url.set_query(None);
        url.set_fragment(None);
        let version = self.version();
        {
            let mut segments = url.path_segments_mut().map_err(|()| ReaderError::Configuration {
                message: format!("service URL '{}' cannot carry a dataset path", self.inner.service),
            })?;
            segments.pop_if_empty().push(self.inner.dataset.as_str());
            if let Some(version) = &version {
                segments.push(version.as_str());
            }
            segments.extend(extra);
        }
        Ok(url)
    }

    /// URL of the asset at `path`, with any leading `assets/` segment removed.
    ///
    /// The normalized path is appended verbatim and resolved the way a
    /// browser resolves a URL string: existing escapes are kept, characters
    /// that need it are percent-encoded, `?` starts a query and dot segments
    /// are collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Configuration`] if the service URL cannot carry
    /// path segments or the joined string is not a valid URL.
    pub fn asset_url(&self, path: &str) -> Result<Url, ReaderError> {
        let asset = AssetPath::normalize(path);
        let base = self.dataset_url(std::iter::once("assets"))?;
        Url::parse(&format!("{base}/{asset}")).map_err(|e| ReaderError::Configuration {
            message: format!("asset path '{path}' does not form a valid URL: {e}"),
        })
    }

    /// URL of the record query `query`, URLON-encoded into the query string.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Configuration`] if the service URL cannot carry
    /// path segments.
    pub fn records_url(&self, query: &Value) -> Result<Url, ReaderError> {
        let mut url = self.dataset_url(std::iter::empty())?;
        url.set_query(Some(&urlon::stringify(query)));
        Ok(url)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Fetches the asset at `path`.
    ///
    /// JSON assets are parsed; everything else is returned as raw bytes.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::Service`] for a non-success status.
    /// - [`ReaderError::Transport`] if no response was received.
    /// - [`ReaderError::Decode`] if a JSON asset does not parse.
    #[tracing::instrument(skip(self), fields(dataset = %self.inner.dataset))]
    pub async fn get_asset(&self, path: &str) -> Result<Asset, ReaderError> {
        let url = self.asset_url(path)?;
        let response = self.fetch(&url).await?;
        if response.is_json() {
            let value = serde_json::from_slice(&response.body).map_err(|e| ReaderError::Decode {
                message: format!("asset '{path}' is not valid JSON: {e}"),
            })?;
            Ok(Asset::Json(value))
        } else {
            debug!(bytes = response.body.len(), content_type = ?response.content_type, "Binary asset");
            Ok(Asset::Binary {
                content_type: response.content_type,
                bytes: response.body,
            })
        }
    }

    /// Runs `query` against the dataset and reshapes the rows into records,
    /// decoding each field with its parser from `parsers`.
    ///
    /// A version reported by the service is pinned for all later requests.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::Service`] for a non-success status.
    /// - [`ReaderError::Transport`] if no response was received.
    /// - [`ReaderError::Decode`] if the body is not a tabular result or a row
    ///   does not match the header.
    #[tracing::instrument(skip(self, query, parsers), fields(dataset = %self.inner.dataset))]
    pub async fn read(
        &self,
        query: &Value,
        parsers: &ParserRegistry,
    ) -> Result<Vec<Record>, ReaderError> {
        let url = self.records_url(query)?;
        let response = self.fetch(&url).await?;
        let result: TabularResult =
            serde_json::from_slice(&response.body).map_err(|e| ReaderError::Decode {
                message: format!("record response is not a tabular result: {e}"),
            })?;

        if let Some(version) = result.version.clone().and_then(Version::new) {
            self.pin_version(version);
        }

        let records = decode_rows(result, parsers)?;
        debug!(rows = records.len(), "Decoded records");
        Ok(records)
    }

    /// Issues the request and turns non-success statuses into errors.
    async fn fetch(&self, url: &Url) -> Result<TransportResponse, ReaderError> {
        debug!(%url, "GET");
        let response = self.inner.transport.get(url).await.inspect_err(|e| {
            warn!(%url, error = %e, "DDF request failed");
        })?;
        if response.is_success() {
            return Ok(response);
        }
        let err = ReaderError::service(response.status, &response.text());
        warn!(%url, status = response.status, error = %err, "DDF service returned an error");
        Err(err)
    }
}

#[async_trait]
impl DdfReader for BigWaffleReader {
    async fn get_asset(&self, path: &str) -> Result<Asset, ReaderError> {
        BigWaffleReader::get_asset(self, path).await
    }

    async fn read(
        &self,
        query: &Value,
        parsers: &ParserRegistry,
    ) -> Result<Vec<Record>, ReaderError> {
        BigWaffleReader::read(self, query, parsers).await
    }
}
