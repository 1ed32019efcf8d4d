//! RSS 2.0 feeds from financial news outlets.
//!
//! No API key is needed, which makes these feeds the baseline source when
//! no other integration is configured.

use crate::config::FeedConfig;
use crate::http::fetch_text;
use crate::models::Headline;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::error::Error;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Replace HTML-only entities that are not valid XML.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

/// Parse an RSS document into headlines attributed to `source`.
pub fn parse(xml: &str, source: &str) -> Result<Vec<Headline>, quick_xml::DeError> {
    let rss: Rss = from_str(&scrub_html_entities_for_xml(xml))?;
    Ok(rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let title = item.title.map(|t| html_escape::decode_html_entities(t.trim()).into_owned())?;
            let link = item.link.map(|l| l.trim().to_string()).filter(|l| l.starts_with("http"))?;
            if title.is_empty() {
                return None;
            }
            Some(Headline::new(title, link).with_source(source).with_published_at(item.pub_date))
        })
        .collect())
}

/// Fetch and parse one feed.
#[instrument(level = "info", skip_all, fields(feed = %feed.name))]
pub async fn index_headlines(client: &reqwest::Client, feed: &FeedConfig) -> Result<Vec<Headline>, Box<dyn Error>> {
    let body = fetch_text(client, &feed.url).await?;
    let headlines = parse(&body, &feed.name)?;
    info!(count = headlines.len(), source = %feed.name, "Indexed RSS headlines");
    Ok(headlines)
}
