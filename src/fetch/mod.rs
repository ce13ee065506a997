// src/fetch/mod.rs

pub mod archive;
pub mod catalog;
pub mod resolver;
pub mod transport;

pub use catalog::UrlCatalog;
pub use resolver::Resolver;
pub use transport::{HttpTransport, Transport};
