//! Image candidates from JSON-LD structured data.
//!
//! Publishers embed `NewsArticle` objects in one or more
//! `<script type="application/ld+json">` blocks. The image may be a plain
//! string, an `ImageObject` with a `url`, or an array of either, and the
//! article itself may sit inside an `@graph` or a top-level array.

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

const IMAGE_FIELDS: &[&str] = &["image", "thumbnailUrl"];

fn image_urls(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.trim().is_empty() => out.push(s.trim().to_string()),
        Value::Array(items) => items.iter().for_each(|item| image_urls(item, out)),
        Value::Object(map) => {
            if let Some(url) = map.get("url").or_else(|| map.get("contentUrl")) {
                image_urls(url, out);
            }
        }
        _ => {}
    }
}

fn walk(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| walk(item, out)),
        Value::Object(map) => {
            for field in IMAGE_FIELDS {
                if let Some(image) = map.get(*field) {
                    image_urls(image, out);
                }
            }
            if let Some(graph) = map.get("@graph") {
                walk(graph, out);
            }
        }
        _ => {}
    }
}

/// Image URLs found in every JSON-LD block, in document order.
pub fn candidates(document: &Html) -> Vec<String> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
    let mut found = Vec::new();
    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => walk(&value, &mut found),
            Err(e) => debug!(error = %e, "Skipping malformed JSON-LD block"),
        }
    }
    let mut unique = Vec::with_capacity(found.len());
    for url in found {
        if !unique.contains(&url) {
            unique.push(url);
        }
    }
    unique
}
