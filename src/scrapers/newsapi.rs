//! [NewsAPI](https://newsapi.org) top business headlines.

use crate::http::fetch_text;
use crate::models::Headline;
use serde::Deserialize;
use std::error::Error;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    source: Option<Source>,
}

#[derive(Debug, Deserialize)]
struct Source {
    name: Option<String>,
}

/// Parse a NewsAPI `top-headlines` response body.
///
/// Articles without a title or URL, and the `[Removed]` placeholders NewsAPI
/// returns for retracted stories, are skipped.
pub fn parse(body: &str) -> Result<Vec<Headline>, serde_json::Error> {
    let resp: Response = serde_json::from_str(body)?;
    Ok(resp
        .articles
        .into_iter()
        .filter_map(|a| {
            let title = a.title.filter(|t| !t.trim().is_empty() && t != "[Removed]")?;
            let url = a.url.filter(|u| u.starts_with("http"))?;
            let source = a.source.and_then(|s| s.name).unwrap_or_else(|| "NewsAPI".to_string());
            Some(
                Headline::new(title.trim(), url)
                    .with_source(source)
                    .with_published_at(a.published_at),
            )
        })
        .collect())
}

/// Fetch business headlines from NewsAPI.
#[instrument(level = "info", skip_all)]
pub async fn index_headlines(client: &reqwest::Client, api_key: &str) -> Result<Vec<Headline>, Box<dyn Error>> {
    let url = format!(
        "https://newsapi.org/v2/top-headlines?category=business&language=en&pageSize=20&apiKey={}",
        urlencoding::encode(api_key)
    );
    let body = fetch_text(client, &url).await?;
    let headlines = parse(&body)?;
    info!(count = headlines.len(), source = "newsapi", "Indexed headlines");
    Ok(headlines)
}
