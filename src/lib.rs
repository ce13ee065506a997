//! Monthly BiciMAD trip data from the EMT Madrid open-data portal.
//!
//! [`Resolver`] maps a month to the published archive and downloads it;
//! [`Ingestor`] turns the archive's CSV into a cleaned Arrow table and
//! summarizes it.

pub mod config;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod period;
pub mod process;
pub mod schema;

pub use config::{Config, CsvDialect};
pub use error::{BicimadError, Result};
pub use fetch::{HttpTransport, Resolver, Transport, UrlCatalog};
pub use ingest::Ingestor;
pub use period::Period;
pub use process::{clean, parse_trips, resume, CleanedDataset, Summary};
