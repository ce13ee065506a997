// src/ingest.rs

use std::fmt;
use std::time::Instant;
use tracing::{info, instrument};

use crate::error::Result;
use crate::fetch::{HttpTransport, Resolver, Transport};
use crate::process::{self, parse_trips, CleanedDataset, Summary};

/// Downloads, parses and cleans one month of trips at a time.
///
/// Holds at most one dataset: the result of the last successful `get_data`.
pub struct Ingestor<T = HttpTransport> {
    resolver: Resolver<T>,
    dataset: Option<CleanedDataset>,
}

impl Ingestor<HttpTransport> {
    pub fn new() -> Self {
        Self::with_resolver(Resolver::new())
    }
}

impl Default for Ingestor<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Ingestor<T> {
    pub fn with_resolver(resolver: Resolver<T>) -> Self {
        Self {
            resolver,
            dataset: None,
        }
    }

    pub fn resolver(&self) -> &Resolver<T> {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut Resolver<T> {
        &mut self.resolver
    }

    /// Fetches, parses and cleans the trips for `month`/`year`.
    ///
    /// Always downloads again. Whatever was held before is dropped first, so
    /// on error the ingestor holds nothing.
    #[instrument(level = "info", skip(self))]
    pub fn get_data(&mut self, month: i64, year: i64) -> Result<CleanedDataset> {
        self.dataset = None;
        let start = Instant::now();

        let period = self.resolver.config().period(month, year)?;
        let csv = self.resolver.csv_for(period)?;
        let raw = parse_trips(csv, &self.resolver.config().csv)?;
        let cleaned = process::clean(&raw)?.with_period(period);

        info!(
            %period,
            parsed = raw.num_rows(),
            kept = cleaned.num_rows(),
            elapsed = ?start.elapsed(),
            "loaded trips"
        );
        self.dataset = Some(cleaned.clone());
        Ok(cleaned)
    }

    pub fn dataset(&self) -> Option<&CleanedDataset> {
        self.dataset.as_ref()
    }

    pub fn take_dataset(&mut self) -> Option<CleanedDataset> {
        self.dataset.take()
    }

    /// Cleans the held dataset again. Returns `None` when nothing is loaded.
    pub fn clean(&mut self) -> Result<Option<&CleanedDataset>> {
        if let Some(held) = self.dataset.take() {
            self.dataset = Some(process::clean::reclean(&held)?);
        }
        Ok(self.dataset.as_ref())
    }

    /// Summary of the held dataset; the empty summary when nothing is loaded.
    pub fn resume(&self) -> Summary {
        match &self.dataset {
            Some(d) => process::resume(d),
            None => Summary::default(),
        }
    }
}

impl<T> fmt::Display for Ingestor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dataset {
            Some(d) => write!(f, "{}", d),
            None => write!(f, "<no data loaded>"),
        }
    }
}
