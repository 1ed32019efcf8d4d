//! [Financial Modeling Prep](https://financialmodelingprep.com) stock news.

use crate::http::fetch_text;
use crate::models::Headline;
use serde::Deserialize;
use std::error::Error;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    url: Option<String>,
    published_date: Option<String>,
    site: Option<String>,
}

/// Parse the FMP `stock_news` array. FMP reports errors as an object, which
/// is treated as an empty result.
pub fn parse(body: &str) -> Result<Vec<Headline>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_array() {
        return Ok(Vec::new());
    }
    let articles: Vec<Article> = serde_json::from_value(value)?;
    Ok(articles
        .into_iter()
        .filter_map(|a| {
            let title = a.title.filter(|t| !t.trim().is_empty())?;
            let url = a.url.filter(|u| u.starts_with("http"))?;
            Some(
                Headline::new(title.trim(), url)
                    .with_source(a.site.unwrap_or_else(|| "FMP".to_string()))
                    .with_published_at(a.published_date),
            )
        })
        .collect())
}

/// Fetch the latest stock news from FMP.
#[instrument(level = "info", skip_all)]
pub async fn index_headlines(client: &reqwest::Client, api_key: &str) -> Result<Vec<Headline>, Box<dyn Error>> {
    let url = format!(
        "https://financialmodelingprep.com/api/v3/stock_news?limit=20&apikey={}",
        urlencoding::encode(api_key)
    );
    let body = fetch_text(client, &url).await?;
    let headlines = parse(&body)?;
    info!(count = headlines.len(), source = "fmp", "Indexed headlines");
    Ok(headlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fmp() {
        let body = r#"[
            {"symbol": "AAPL", "publishedDate": "2025-05-20 10:00:00", "title": "Apple beats estimates",
             "image": "https://img.example/a.jpg", "site": "Zacks", "text": "...", "url": "https://zacks.example/aapl"}
        ]"#;
        let headlines = parse(body).unwrap();
        assert_eq!(headlines.len(), 1);
        assert_eq!(headlines[0].source.as_deref(), Some("Zacks"));
        assert_eq!(headlines[0].published_at.as_deref(), Some("2025-05-20 10:00:00"));
    }

    #[test]
    fn test_parse_fmp_error_object() {
        let body = r#"{"Error Message": "Invalid API KEY."}"#;
        assert!(parse(body).unwrap().is_empty());
    }
}
