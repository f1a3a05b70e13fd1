//! Upstream stock page client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use stockwatch_core::{extract_json_object, WatchError};
use tracing::debug;

/// Anything that can produce the current raw stock payload.
#[async_trait]
pub trait StockSource: Send + Sync {
    async fn fetch(&self) -> Result<Value, WatchError>;
}

/// Request headers the stock page expects from a browser-driven RSC refetch.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    ("accept-language", "en-US,en;q=0.9"),
    (
        "next-router-state-tree",
        "%5B%22%22%2C%7B%22children%22%3A%5B%22stocks%22%2C%7B%22children%22%3A%5B%22__PAGE__%22%2C%7B%7D%2C%22%2Fstocks%22%2C%22refresh%22%5D%7D%5D%7D%2Cnull%2C%22refetch%22%5D",
    ),
    ("priority", "u=1, i"),
    ("referer", "https://growagarden.gg/stocks"),
    ("rsc", "1"),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-origin"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36 OPR/119.0.0.0",
    ),
];

fn browser_headers() -> HeaderMap {
    BROWSER_HEADERS
        .iter()
        .map(|&(k, v)| (HeaderName::from_static(k), HeaderValue::from_static(v)))
        .collect()
}

/// Fetches the page with a single GET and pulls the keyed payload out of it.
pub struct HttpStockSource {
    client: Client,
    url: String,
    key: String,
}

impl HttpStockSource {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl StockSource for HttpStockSource {
    async fn fetch(&self) -> Result<Value, WatchError> {
        let resp = self
            .client
            .get(&self.url)
            .headers(browser_headers())
            .send()
            .await
            .map_err(|e| WatchError::Fetch(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| WatchError::Fetch(e.to_string()))?;
        debug!(%status, bytes = body.len(), "upstream responded");

        parse_payload(&body, &self.key)
    }
}

/// Extracts and parses the keyed payload out of a response body.
pub fn parse_payload(body: &str, key: &str) -> Result<Value, WatchError> {
    let raw = extract_json_object(body, key)?;
    Ok(serde_json::from_str(raw)?)
}
