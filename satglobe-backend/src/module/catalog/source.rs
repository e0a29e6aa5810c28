///! Catalog transport
///!
///! Fetches raw catalog text from a local file or an HTTP(S) URL. A failed
///! fetch is fatal for that load: there is no partial catalog.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::snapshot::Catalog;
use super::types::ColumnMap;
use crate::config::CatalogSettings;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error from {url}: {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Anything that can produce raw catalog text
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch(&self) -> Result<String, TransportError>;
}

/// Where catalog text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Http(String),
}

impl CatalogSource {
    /// `http://` and `https://` prefixes select HTTP, anything else is a path
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            CatalogSource::Http(location.to_string())
        } else {
            CatalogSource::File(PathBuf::from(location))
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Http(url) => write!(f, "{}", url),
        }
    }
}

/// A source plus the HTTP timeout used when fetching it
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    source: CatalogSource,
    timeout: Duration,
}

impl SourceFetcher {
    pub fn new(source: CatalogSource, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }
}

#[async_trait]
impl CatalogFetcher for SourceFetcher {
    async fn fetch(&self) -> Result<String, TransportError> {
        match &self.source {
            CatalogSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| TransportError::Io {
                        path: path.clone(),
                        source,
                    })
            }
            CatalogSource::Http(url) => {
                let request_error = |source| TransportError::Request {
                    url: url.clone(),
                    source,
                };

                let client = reqwest::Client::builder()
                    .timeout(self.timeout)
                    .build()
                    .map_err(request_error)?;

                let response = client.get(url).send().await.map_err(request_error)?;

                if !response.status().is_success() {
                    return Err(TransportError::Status {
                        url: url.clone(),
                        status: response.status(),
                    });
                }

                response.text().await.map_err(request_error)
            }
        }
    }
}

/// Fetch the catalog (and the optional element source) and build a snapshot
pub async fn load_catalog(
    catalog: &dyn CatalogFetcher,
    elements: Option<&dyn CatalogFetcher>,
    columns: &ColumnMap,
) -> Result<Catalog> {
    let text = catalog.fetch().await.context("Failed to fetch catalog")?;

    let snapshot = match elements {
        Some(elements) => {
            let element_text = elements
                .fetch()
                .await
                .context("Failed to fetch element sets")?;
            Catalog::from_text_with_elements(&text, &element_text, columns)
        }
        None => Catalog::from_text(&text, columns),
    };

    info!("Catalog loaded: {}", snapshot.report());

    Ok(snapshot)
}

/// `load_catalog` with sources and columns taken from configuration
pub async fn load_from_settings(settings: &CatalogSettings) -> Result<Catalog> {
    let timeout = Duration::from_secs(settings.fetch_timeout_secs);
    let catalog = SourceFetcher::new(CatalogSource::parse(&settings.source), timeout);
    let elements = settings
        .element_source
        .as_deref()
        .map(|location| SourceFetcher::new(CatalogSource::parse(location), timeout));

    info!("Loading catalog from {}", catalog.source());

    load_catalog(
        &catalog,
        elements.as_ref().map(|e| e as &dyn CatalogFetcher),
        &settings.columns,
    )
    .await
}
