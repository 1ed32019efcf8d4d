//! Shared HTTP client and fetch helpers.
//!
//! All remote calls go through one [`reqwest::Client`] so that the user
//! agent and per-request timeout are applied uniformly.

use crate::error::FetchError;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;
use tracing::{debug, instrument};

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/124.0 Safari/537.36 finance_frontpage/",
    env!("CARGO_PKG_VERSION")
);

/// Build the shared client with the given per-request timeout.
pub fn build_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Only absolute http(s) URLs are fetched.
fn parse_url(url: &str) -> Result<Url, FetchError> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(parsed),
        _ => Err(FetchError::InvalidUrl(url.to_string())),
    }
}

/// GET `url` and return the body as text. Non-2xx statuses are errors.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(parse_url(url)?).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = resp.text().await?;
    debug!(bytes = body.len(), "Fetched page");
    Ok(body)
}

/// A downloaded binary body with its declared content type.
#[derive(Debug)]
pub struct Download {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// GET `url` and return the raw body plus content type.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Download, FetchError> {
    let resp = client.get(parse_url(url)?).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let bytes = resp.bytes().await?.to_vec();
    Ok(Download {
        content_type,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client() {
        assert!(build_client(5).is_ok());
    }

    #[test]
    fn test_user_agent_mentions_crate() {
        assert!(USER_AGENT.contains("finance_frontpage/"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_sending() {
        let client = build_client(5).unwrap();
        let err = fetch_text(&client, "not a url").await.unwrap_err();
        assert_eq!(err.kind(), "InvalidURL");
        let err = fetch_bytes(&client, "ftp://files.example/a.jpg").await.unwrap_err();
        assert_eq!(err.kind(), "InvalidURL");
    }
}
