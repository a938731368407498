//! HTTP source for share counts (ShareThis `urlinfo` endpoint).

use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Failure while fetching a share count. Always absorbed by `ShareCounter`.
#[derive(Debug, Error)]
pub enum ShareCountError {
    #[error("share count request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("share count endpoint returned status {0}")]
    Status(u16),
    #[error("share count response is not valid JSON: {0}")]
    Body(#[from] serde_json::Error),
}

/// Outbound share-count lookup capability.
pub trait ShareCountSource: Send + Sync {
    /// Total outbound shares of `url`.
    fn fetch(&self, url: &str) -> Result<u64, ShareCountError>;
}

/// Blocking client for `GET <endpoint>/v1/count/urlinfo?url=<url>`.
#[derive(Debug, Clone)]
pub struct ShareThisClient {
    endpoint: String,
    client: Client,
}

impl ShareThisClient {
    pub const DEFAULT_ENDPOINT: &'static str = "http://rest.sharethis.com";

    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ShareCountError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    fn urlinfo_url(&self) -> String {
        format!("{}/v1/count/urlinfo", self.endpoint.trim_end_matches('/'))
    }
}

impl ShareCountSource for ShareThisClient {
    fn fetch(&self, url: &str) -> Result<u64, ShareCountError> {
        let response = self
            .client
            .get(self.urlinfo_url())
            .query(&[("url", url)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShareCountError::Status(status.as_u16()));
        }

        let body = response.text()?;
        Ok(parse_share_count(&body)?)
    }
}

/// Reads `total.outbound` from a response body; absent or falsy values are 0.
pub fn parse_share_count(body: &str) -> Result<u64, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    Ok(value
        .pointer("/total/outbound")
        .map_or(0, count_from_json))
}

fn count_from_json(value: &Value) -> u64 {
    match value {
        Value::Number(number) => number.as_u64().unwrap_or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite() && *float > 0.0)
                .map_or(0, |float| float as u64)
        }),
        Value::String(text) => text.trim().parse().unwrap_or(0),
        Value::Bool(true) => 1,
        _ => 0,
    }
}
