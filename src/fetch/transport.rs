// src/fetch/transport.rs

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

/// Blocking fetcher the resolver talks to. Errors are plain messages; the
/// resolver decides which `BicimadError` they become.
pub trait Transport {
    fn get_text(&self, url: &Url) -> Result<String, String>;
    fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, String>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get_text(&self, url: &Url) -> Result<String, String> {
        (**self).get_text(url)
    }

    fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, String> {
        (**self).get_bytes(url)
    }
}

/// `reqwest` blocking client; non-success statuses are failures.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport(Client);

impl HttpTransport {
    pub fn new() -> Self {
        Self(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self(client)
    }

    fn get(&self, url: &Url) -> Result<reqwest::blocking::Response, String> {
        debug!(%url, "GET");
        self.0
            .get(url.clone())
            .send()
            .map_err(|e| format!("GET {} failed: {}", url, e))?
            .error_for_status()
            .map_err(|e| format!("non-success status from {}: {}", url, e))
    }
}

impl Transport for HttpTransport {
    fn get_text(&self, url: &Url) -> Result<String, String> {
        self.get(url)?
            .text()
            .map_err(|e| format!("reading text from {}: {}", url, e))
    }

    fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, String> {
        self.get(url)?
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| format!("reading body from {}: {}", url, e))
    }
}
