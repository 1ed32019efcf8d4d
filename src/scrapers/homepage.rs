//! LLM-assisted headline extraction from news homepages.
//!
//! The homepage is reduced to a list of link texts and targets, the first
//! 5,000 characters of which are sent to the chat model with a request for
//! the two most important financial headlines as JSON. If anything fails
//! the homepage itself is returned as a headline, so each site still
//! contributes a link.

use crate::api::{ChatClient, ask_with_backoff, recover_json, truncated_json};
use crate::http::fetch_text;
use crate::models::Headline;
use crate::utils::{prefix_chars, truncate_for_log};
use scraper::{Html, Selector};
use serde::Deserialize;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

const SNIPPET_CHARS: usize = 5_000;
const MIN_LINK_TEXT_CHARS: usize = 25;

#[derive(Debug, Deserialize)]
struct Extracted {
    headline: String,
    #[serde(default)]
    url: String,
}

/// Reduce a homepage to `text | href` lines for story-sized links.
///
/// Falls back to the raw HTML when the page has no such links (for example
/// when it is rendered client-side).
pub fn link_digest(html: &str, base: &Url) -> String {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();
    let mut digest = String::new();

    for element in document.select(&selector) {
        let text = element.text().collect::<Vec<_>>().join(" ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.chars().count() < MIN_LINK_TEXT_CHARS {
            continue;
        }
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        digest.push_str(&text);
        digest.push_str(" | ");
        digest.push_str(resolved.as_str());
        digest.push('\n');
        if digest.len() > SNIPPET_CHARS {
            break;
        }
    }

    if digest.is_empty() {
        prefix_chars(html, SNIPPET_CHARS).to_string()
    } else {
        prefix_chars(&digest, SNIPPET_CHARS).to_string()
    }
}

fn build_prompt(site: &str, digest: &str) -> String {
    format!(
        "You are a financial news assistant. Given the following content from a financial news website, \
         extract the top 2 most important financial or economics-related headlines. \
         For each, return a JSON list of objects with 'headline' and 'url' fields. \
         If a headline is not directly linked, do your best to infer the correct URL from the content. \
         Content from {site}:\n{digest}"
    )
}

/// Turn a model reply into headlines, resolving relative URLs against `base`.
pub fn parse_reply(reply: &str, base: &Url) -> Option<Vec<Headline>> {
    let value = recover_json(reply)?;
    let items: Vec<Extracted> = serde_json::from_value(value).ok()?;
    let headlines: Vec<Headline> = items
        .into_iter()
        .filter(|item| !item.headline.trim().is_empty())
        .map(|item| {
            let url = base
                .join(item.url.trim())
                .map(|u| u.to_string())
                .unwrap_or_else(|_| base.to_string());
            Headline::new(item.headline.trim(), url).with_source(base.host_str().unwrap_or("homepage"))
        })
        .collect();
    (!headlines.is_empty()).then_some(headlines)
}

async fn extract(http: &reqwest::Client, llm: &ChatClient, site: &str) -> Result<Vec<Headline>, Box<dyn Error>> {
    let base = Url::parse(site)?;
    let html = fetch_text(http, site).await?;
    let digest = link_digest(&html, &base);
    debug!(site, digest_chars = digest.chars().count(), "Prepared homepage digest");
    let prompt = build_prompt(site, &digest);

    let reply = ask_with_backoff(llm, &prompt).await?;
    if let Some(headlines) = parse_reply(&reply, &base) {
        return Ok(headlines);
    }

    // A reply cut off by the token limit is worth one more try.
    if let Some(e) = truncated_json(&reply) {
        warn!(site, error = %e, "EOF while parsing; re-asking once");
        let second = ask_with_backoff(llm, &prompt).await?;
        if let Some(headlines) = parse_reply(&second, &base) {
            return Ok(headlines);
        }
    }
    Err(format!("model returned no usable headlines: {}", truncate_for_log(&reply, 200)).into())
}

/// Extract headlines from every homepage, one site at a time.
#[instrument(level = "info", skip_all, fields(sites = sites.len()))]
pub async fn index_headlines(http: &reqwest::Client, llm: &ChatClient, sites: &[String]) -> Vec<Headline> {
    let mut all = Vec::new();
    for site in sites {
        match extract(http, llm, site).await {
            Ok(headlines) => {
                info!(site = %site, count = headlines.len(), "Extracted homepage headlines");
                all.extend(headlines);
            }
            Err(e) => {
                warn!(site = %site, error = %e, "Homepage extraction failed; using the site as a headline");
                all.push(Headline::new(site.clone(), site.clone()).with_source("homepage"));
            }
        }
    }
    all
}
