//! Headline sources for the front page.
//!
//! Each submodule turns one upstream into a list of [`Headline`]s. The
//! collector in this module queries them in a fixed order, logs and skips
//! any source that fails, then deduplicates and caps the combined list.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Key |
//! |--------|--------|--------|-----|
//! | NewsAPI | [`newsapi`] | JSON API | `NEWSAPI_API_KEY` |
//! | GNews | [`gnews`] | JSON API | `GNEWS_API_KEY` |
//! | Marketaux | [`marketaux`] | JSON API | `MARKETAUX_API_KEY` |
//! | Financial Modeling Prep | [`fmp`] | JSON API | `FMP_API_KEY` |
//! | CNBC, MarketWatch, Yahoo Finance | [`rss`] | RSS 2.0 | none |
//! | Financial homepages | [`homepage`] | LLM extraction | `OPENAI_API_KEY` |
//!
//! A missing key disables the source with an `info` line. When nothing at
//! all comes back, [`fallback_headlines`] links to the homepages themselves
//! so the page is never empty.

pub mod fmp;
pub mod gnews;
pub mod homepage;
pub mod marketaux;
pub mod newsapi;
pub mod rss;

use crate::api::ChatClient;
use crate::config::SiteConfig;
use crate::models::Headline;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::collections::HashSet;
use std::error::Error;
use std::future::Future;
use tracing::{info, instrument, warn};

/// API keys for the keyed headline sources.
#[derive(Debug, Default, Clone)]
pub struct SourceKeys {
    pub newsapi: Option<String>,
    pub gnews: Option<String>,
    pub marketaux: Option<String>,
    pub fmp: Option<String>,
}

async fn keyed<'a, F, Fut>(name: &str, key: Option<&'a str>, fetch: F) -> Vec<Headline>
where
    F: FnOnce(&'a str) -> Fut,
    Fut: Future<Output = Result<Vec<Headline>, Box<dyn Error>>>,
{
    let Some(key) = key.filter(|k| !k.trim().is_empty()) else {
        info!(source = name, "No API key configured; skipping source");
        return Vec::new();
    };
    match fetch(key).await {
        Ok(headlines) => headlines,
        Err(e) => {
            warn!(source = name, error = %e, "Headline source failed; skipping");
            Vec::new()
        }
    }
}

/// Query every configured source in order and return the combined,
/// deduplicated list, capped at `cfg.max_headlines`.
#[instrument(level = "info", skip_all)]
pub async fn collect_headlines(
    client: &reqwest::Client,
    cfg: &SiteConfig,
    keys: &SourceKeys,
    llm: Option<&ChatClient>,
) -> Vec<Headline> {
    let mut all = Vec::new();

    all.extend(keyed("newsapi", keys.newsapi.as_deref(), |k| newsapi::index_headlines(client, k)).await);
    all.extend(keyed("gnews", keys.gnews.as_deref(), |k| gnews::index_headlines(client, k)).await);
    all.extend(keyed("marketaux", keys.marketaux.as_deref(), |k| marketaux::index_headlines(client, k)).await);
    all.extend(keyed("fmp", keys.fmp.as_deref(), |k| fmp::index_headlines(client, k)).await);

    let feeds: Vec<Vec<Headline>> = stream::iter(cfg.rss_feeds.iter())
        .then(|feed| async move {
            match rss::index_headlines(client, feed).await {
                Ok(headlines) => headlines,
                Err(e) => {
                    warn!(feed = %feed.name, error = %e, "RSS feed failed; skipping");
                    Vec::new()
                }
            }
        })
        .collect()
        .await;
    all.extend(feeds.into_iter().flatten());

    match llm {
        Some(llm) if !cfg.homepages.is_empty() => {
            all.extend(homepage::index_headlines(client, llm, &cfg.homepages).await);
        }
        Some(_) => {}
        None => info!(source = "homepage", "No OpenAI key configured; skipping homepage extraction"),
    }

    let total = all.len();
    let headlines = dedupe_headlines(all).into_iter().take(cfg.max_headlines).collect::<Vec<_>>();
    info!(total, kept = headlines.len(), "Collected headlines");
    headlines
}

/// Drop later headlines whose URL or case-insensitive text was already seen.
pub fn dedupe_headlines(headlines: Vec<Headline>) -> Vec<Headline> {
    let mut seen_text = HashSet::new();
    headlines
        .into_iter()
        .unique_by(|h| h.url.clone())
        .filter(|h| seen_text.insert(h.text.trim().to_lowercase()))
        .collect()
}

/// One headline per homepage, used when every source came back empty.
pub fn fallback_headlines(homepages: &[String]) -> Vec<Headline> {
    homepages
        .iter()
        .map(|site| {
            let label = url::Url::parse(site)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
                .unwrap_or_else(|| site.clone());
            Headline::new(format!("Latest markets coverage from {label}"), site.clone()).with_source(label)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_by_url_and_text() {
        let headlines = vec![
            Headline::new("Stocks rise", "https://a.example/1"),
            Headline::new("Different text", "https://a.example/1"),
            Headline::new("STOCKS RISE ", "https://b.example/2"),
            Headline::new("Bonds fall", "https://b.example/3"),
        ];
        let deduped = dedupe_headlines(headlines);
        let texts: Vec<&str> = deduped.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["Stocks rise", "Bonds fall"]);
    }

    #[test]
    fn test_fallback_headlines() {
        let sites = vec!["https://www.cnbc.com/finance/".to_string(), "not a url".to_string()];
        let headlines = fallback_headlines(&sites);
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].url, "https://www.cnbc.com/finance/");
        assert_eq!(headlines[0].source.as_deref(), Some("cnbc.com"));
        assert!(headlines[0].text.contains("cnbc.com"));
        assert_eq!(headlines[1].source.as_deref(), Some("not a url"));
    }

    #[tokio::test]
    async fn test_collect_without_sources_is_empty() {
        let cfg = SiteConfig {
            rss_feeds: Vec::new(),
            homepages: Vec::new(),
            ..SiteConfig::default()
        };
        let client = reqwest::Client::new();
        let headlines = collect_headlines(&client, &cfg, &SourceKeys::default(), None).await;
        assert!(headlines.is_empty());
    }
}
