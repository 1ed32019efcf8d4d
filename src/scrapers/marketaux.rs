//! [Marketaux](https://www.marketaux.com) financial news.

use crate::http::fetch_text;
use crate::models::Headline;
use serde::Deserialize;
use std::error::Error;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    data: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    source: Option<String>,
}

pub fn parse(body: &str) -> Result<Vec<Headline>, serde_json::Error> {
    let resp: Response = serde_json::from_str(body)?;
    Ok(resp
        .data
        .into_iter()
        .filter_map(|a| {
            let title = a.title.filter(|t| !t.trim().is_empty())?;
            let url = a.url.filter(|u| u.starts_with("http"))?;
            Some(
                Headline::new(title.trim(), url)
                    .with_source(a.source.unwrap_or_else(|| "Marketaux".to_string()))
                    .with_published_at(a.published_at),
            )
        })
        .collect())
}

/// Fetch recent English-language market news from Marketaux.
#[instrument(level = "info", skip_all)]
pub async fn index_headlines(client: &reqwest::Client, api_key: &str) -> Result<Vec<Headline>, Box<dyn Error>> {
    let url = format!(
        "https://api.marketaux.com/v1/news/all?language=en&filter_entities=true&limit=10&api_token={}",
        urlencoding::encode(api_key)
    );
    let body = fetch_text(client, &url).await?;
    let headlines = parse(&body)?;
    info!(count = headlines.len(), source = "marketaux", "Indexed headlines");
    Ok(headlines)
}
