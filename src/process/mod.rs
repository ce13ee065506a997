// src/process/mod.rs

pub mod clean;
pub mod convert;
pub mod date_parser;
pub mod parse;
pub mod summary;
pub mod utils;

pub use clean::{clean, CleanedDataset};
pub use parse::parse_trips;
pub use summary::{resume, Summary};
