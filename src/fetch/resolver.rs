// src/fetch/resolver.rs

use std::collections::BTreeSet;
use std::io::Cursor;
use std::time::Instant;
use tracing::{debug, info, instrument};
use url::Url;

use super::archive::extract_single_csv;
use super::catalog::UrlCatalog;
use super::transport::{HttpTransport, Transport};
use crate::config::Config;
use crate::error::{BicimadError, Result};
use crate::period::Period;

/// Maps a (month, year) request to an EMT archive URL and downloads it.
///
/// The catalog is discovered on first use and kept for the life of the
/// resolver; `refresh` re-scans the index page.
pub struct Resolver<T = HttpTransport> {
    transport: T,
    config: Config,
    catalog: Option<UrlCatalog>,
}

impl Resolver<HttpTransport> {
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new(), Config::default())
    }
}

impl Default for Resolver<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Resolver<T> {
    pub fn with_transport(transport: T, config: Config) -> Self {
        Self {
            transport,
            config,
            catalog: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The catalog, if it has been discovered already.
    pub fn catalog(&self) -> Option<&UrlCatalog> {
        self.catalog.as_ref()
    }

    /// Fetches the index page and parses every trip archive link on it.
    #[instrument(level = "info", skip(self))]
    pub fn discover_urls(&self) -> Result<UrlCatalog> {
        let index = self.config.index_url()?;
        let html = self
            .transport
            .get_text(&index)
            .map_err(|reason| BicimadError::Discovery {
                url: index.to_string(),
                reason,
            })?;

        let catalog = UrlCatalog::from_html(&html, &self.config.base()?);
        if catalog.is_empty() {
            return Err(BicimadError::Discovery {
                url: index.to_string(),
                reason: "page lists no trips_YY_MM_Month archives".into(),
            });
        }
        info!(archives = catalog.len(), "discovered trip archives");
        Ok(catalog)
    }

    /// Replaces the held catalog with a fresh scan of the index page.
    pub fn refresh(&mut self) -> Result<&UrlCatalog> {
        let catalog = self.discover_urls()?;
        let catalog: &UrlCatalog = self.catalog.insert(catalog);
        Ok(catalog)
    }

    fn ensure_catalog(&mut self) -> Result<&UrlCatalog> {
        if self.catalog.is_none() {
            return self.refresh();
        }
        self.catalog
            .as_ref()
            .ok_or_else(|| BicimadError::Discovery {
                url: self.config.index_path.clone(),
                reason: "catalog missing after discovery".into(),
            })
    }

    /// Every archive URL on the index page.
    pub fn select_valid_urls(&mut self) -> Result<BTreeSet<Url>> {
        Ok(self.ensure_catalog()?.urls())
    }

    /// Resolves a month to its archive URL.
    ///
    /// Bounds are checked before anything is fetched, so an impossible month
    /// or year is always a range error. Months outside the standardized window
    /// or absent from the index page are not-found errors.
    pub fn get_url(&mut self, month: i64, year: i64) -> Result<Url> {
        let period = self.config.period(month, year)?;
        self.url_for(period)
    }

    pub fn url_for(&mut self, period: Period) -> Result<Url> {
        let window = self.config.window;
        let not_found = || BicimadError::NotFound {
            year: period.year,
            month: period.month,
            first: window.first.to_string(),
            last: window.last.to_string(),
        };

        if !window.contains(period) {
            debug!(%period, "outside standardized window");
            return Err(not_found());
        }
        self.ensure_catalog()?
            .get(period)
            .cloned()
            .ok_or_else(not_found)
    }

    /// Downloads the month's archive and returns its CSV member as a text
    /// handle positioned at the start.
    pub fn get_csv(&mut self, month: i64, year: i64) -> Result<Cursor<String>> {
        let period = self.config.period(month, year)?;
        self.csv_for(period)
    }

    #[instrument(level = "info", skip(self, period), fields(period = %period))]
    pub fn csv_for(&mut self, period: Period) -> Result<Cursor<String>> {
        let url = self.url_for(period)?;

        let start = Instant::now();
        let bytes = self
            .transport
            .get_bytes(&url)
            .map_err(|reason| BicimadError::Download {
                url: url.to_string(),
                reason,
            })?;
        info!(%url, bytes = bytes.len(), elapsed = ?start.elapsed(), "downloaded");

        let expected = format!("{}.csv", period.file_stem());
        let text = extract_single_csv(&bytes, Some(&expected))?;
        Ok(Cursor::new(text))
    }
}
