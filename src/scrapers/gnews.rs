//! [GNews](https://gnews.io) business top headlines.

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

pub fn parse(body: &str) -> Result<Vec<Headline>, serde_json::Error> {
    let resp: Response = serde_json::from_str(body)?;
    Ok(resp
        .articles
        .into_iter()
        .filter_map(|a| {
            let title = a.title.filter(|t| !t.trim().is_empty())?;
            let url = a.url.filter(|u| u.starts_with("http"))?;
            let source = a.source.and_then(|s| s.name).unwrap_or_else(|| "GNews".to_string());
            Some(
                Headline::new(title.trim(), url)
                    .with_source(source)
                    .with_published_at(a.published_at),
            )
        })
        .collect())
}

/// Fetch business headlines from GNews.
#[instrument(level = "info", skip_all)]
pub async fn index_headlines(client: &reqwest::Client, api_key: &str) -> Result<Vec<Headline>, Box<dyn Error>> {
    let url = format!(
        "https://gnews.io/api/v4/top-headlines?category=business&lang=en&max=10&apikey={}",
        urlencoding::encode(api_key)
    );
    let body = fetch_text(client, &url).await?;
    let headlines = parse(&body)?;
    info!(count = headlines.len(), source = "gnews", "Indexed headlines");
    Ok(headlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gnews() {
        let body = r#"{"totalArticles": 1, "articles": [
            {"title": " Dollar slips as traders eye Fed ", "url": "https://example.com/fx",
             "publishedAt": "2025-05-20T09:00:00Z", "image": "https://example.com/fx.jpg",
             "source": {"name": "Example FX", "url": "https://example.com"}}
        ]}"#;
        let headlines = parse(body).unwrap();
        assert_eq!(headlines.len(), 1);
        assert_eq!(headlines[0].text, "Dollar slips as traders eye Fed");
        assert_eq!(headlines[0].source.as_deref(), Some("Example FX"));
    }
}
