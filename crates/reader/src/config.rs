//! Reader configuration.
//!
//! [`ReaderOptions`] is the loose, serialisable form a host embeds in its own
//! configuration: every field is optional and blank values fall back to the
//! public Big Waffle defaults. [`ReaderConfig`] is the validated form the
//! reader is built from.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{DatasetId, ReaderError, Version};

/// Dataset read when none is configured.
pub const DEFAULT_DATASET: &str = "systema_globalis";

/// Service endpoint used when none is configured.
pub const DEFAULT_SERVICE: &str = "http://bigwaffle.gapminder.org";

/// Construction options as a host would write them.
///
/// ```
/// let options: reader::ReaderOptions =
///     serde_json::from_str(r#"{ "dataset": "fasttrack", "version": "" }"#).unwrap();
/// let config = reader::ReaderConfig::try_from(options).unwrap();
/// assert_eq!(config.dataset().as_str(), "fasttrack");
/// assert_eq!(config.service().as_str(), "http://bigwaffle.gapminder.org/");
/// assert!(config.version().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Dataset name; defaults to [`DEFAULT_DATASET`].
    pub dataset: Option<String>,
    /// Base URL of the service; defaults to [`DEFAULT_SERVICE`].
    pub service: Option<String>,
    /// Dataset version to pin from the start; unpinned when absent.
    pub version: Option<String>,
}

/// Validated reader configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    dataset: DatasetId,
    service: Url,
    version: Option<Version>,
}

impl ReaderConfig {
    /// Creates a configuration for `dataset` on the service at `service`.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Configuration`] if `dataset` is empty or
    /// `service` is not an absolute URL that can carry path segments.
    pub fn new(dataset: &str, service: &str) -> Result<Self, ReaderError> {
        let dataset = DatasetId::new(dataset).ok_or_else(|| ReaderError::Configuration {
            message: "dataset must not be empty".into(),
        })?;
        Ok(Self {
            dataset,
            service: parse_service(service)?,
            version: None,
        })
    }

    /// Replaces the dataset.
    #[must_use]
    pub fn with_dataset(mut self, dataset: DatasetId) -> Self {
        self.dataset = dataset;
        self
    }

    /// Replaces the service base URL.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ReaderConfig::new`].
    pub fn with_service(mut self, service: &str) -> Result<Self, ReaderError> {
        self.service = parse_service(service)?;
        Ok(self)
    }

    /// Pins a dataset version from the start.
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Dataset addressed by every request.
    pub fn dataset(&self) -> &DatasetId {
        &self.dataset
    }

    /// Base URL of the service.
    pub fn service(&self) -> &Url {
        &self.service
    }

    /// Initially pinned version, if any.
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    pub(crate) fn into_parts(self) -> (DatasetId, Url, Option<Version>) {
        (self.dataset, self.service, self.version)
    }
}

impl TryFrom<ReaderOptions> for ReaderConfig {
    type Error = ReaderError;

    fn try_from(options: ReaderOptions) -> Result<Self, Self::Error> {
        let dataset = non_blank(options.dataset).unwrap_or_else(|| DEFAULT_DATASET.to_owned());
        let service = non_blank(options.service).unwrap_or_else(|| DEFAULT_SERVICE.to_owned());
        let config = Self::new(&dataset, &service)?;
        Ok(match options.version.and_then(Version::new) {
            Some(version) => config.with_version(version),
            None => config,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_service(service: &str) -> Result<Url, ReaderError> {
    let url = Url::parse(service).map_err(|e| ReaderError::Configuration {
        message: format!("invalid service URL '{service}': {e}"),
    })?;
    if url.cannot_be_a_base() {
        return Err(ReaderError::Configuration {
            message: format!("service URL '{service}' cannot carry a dataset path"),
        });
    }
    Ok(url)
}
