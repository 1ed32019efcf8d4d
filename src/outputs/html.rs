//! Static page rendering with Tera.
//!
//! The `base.html` layout and `index.html` page are compiled into the
//! binary; either can be replaced at runtime by a file of the same name in
//! `--templates-dir`. Autoescaping is on for both.
//!
//! Headlines are flattened into [`HeadlineView`]s before rendering so that
//! templates do not need to know about [`ImageKind`] or the eager/lazy
//! loading threshold.

use crate::config::SiteConfig;
use crate::error::RenderError;
use crate::models::{EconomicIndicator, ForexQuote, FrontPage, Headline, ImageKind};
use crate::outputs::seo::MetaTag;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tera::{Context, Tera};
use tracing::{debug, info, instrument};

const BASE_TEMPLATE: &str = include_str!("../../templates/base.html");
const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Headlines before this index load eagerly with high fetch priority.
pub const EAGER_IMAGES: usize = 2;

/// Template-ready view of a [`Headline`].
#[derive(Debug, Serialize)]
pub struct HeadlineView<'a> {
    pub text: &'a str,
    pub url: &'a str,
    pub source: Option<&'a str>,
    pub published_at: Option<&'a str>,
    pub image_path: Option<&'a str>,
    pub image_class: &'static str,
    pub badge: Option<&'static str>,
    pub loading: &'static str,
    pub fetch_priority: &'static str,
}

#[derive(Debug, Serialize)]
struct EconView<'a> {
    #[serde(flatten)]
    indicator: &'a EconomicIndicator,
    progress: f64,
}

#[derive(Debug, Serialize)]
struct ForexView<'a> {
    #[serde(flatten)]
    quote: &'a ForexQuote,
    spread: f64,
    direction: &'static str,
}

/// `(loading, fetchpriority)` for the headline at `index`.
pub fn loading_attrs(index: usize) -> (&'static str, &'static str) {
    if index < EAGER_IMAGES {
        ("eager", "high")
    } else {
        ("lazy", "auto")
    }
}

pub fn headline_views(news: &[Headline]) -> Vec<HeadlineView<'_>> {
    news.iter()
        .enumerate()
        .map(|(i, h)| {
            let (loading, fetch_priority) = loading_attrs(i);
            let kind = h.image.as_ref().map(|img| img.kind);
            let (image_class, badge) = match kind {
                Some(ImageKind::Dynamic) => ("dynamic-image", Some("Dynamic")),
                Some(ImageKind::AiGenerated) => ("ai-generated-image", Some("AI")),
                Some(ImageKind::Scraped) | None => ("", None),
            };
            HeadlineView {
                text: &h.text,
                url: &h.url,
                source: h.source.as_deref(),
                published_at: h.published_at.as_deref(),
                image_path: h.image.as_ref().map(|img| img.path.as_str()),
                image_class,
                badge,
                loading,
                fetch_priority,
            }
        })
        .collect()
}

/// Build the template engine, preferring files in `templates_dir` over the
/// built-in templates.
pub fn build_tera(templates_dir: Option<&str>) -> Result<Tera, RenderError> {
    let mut templates = vec![
        ("base.html", BASE_TEMPLATE.to_string()),
        ("index.html", INDEX_TEMPLATE.to_string()),
    ];
    if let Some(dir) = templates_dir {
        for (name, body) in templates.iter_mut() {
            let path = Path::new(dir).join(*name);
            if path.is_file() {
                *body = std::fs::read_to_string(&path)?;
                info!(template = %name, path = %path.display(), "Using template override");
            }
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates.iter().map(|(name, body)| (*name, body.as_str())))?;
    Ok(tera)
}

/// Embed JSON in a `<script>` element without letting it close the tag.
fn script_safe_json(data: &Value) -> Result<String, RenderError> {
    Ok(serde_json::to_string(data)?.replace("</", "<\\/"))
}

/// Render the front page to (unminified) HTML.
#[instrument(level = "info", skip_all, fields(news = page.news.len()))]
pub fn render_page(
    tera: &Tera,
    cfg: &SiteConfig,
    page: &FrontPage,
    meta_tags: &[MetaTag],
    structured_data: &Value,
    cache_buster: i64,
) -> Result<String, RenderError> {
    let econ: Vec<EconView> = page
        .econ
        .iter()
        .map(|indicator| EconView {
            indicator,
            progress: indicator.progress_percent(),
        })
        .collect();
    let forex: Vec<ForexView> = page
        .forex
        .iter()
        .map(|quote| ForexView {
            quote,
            spread: quote.spread(),
            direction: quote.direction(),
        })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("title", &cfg.title);
    ctx.insert("page_title", &cfg.page_title);
    ctx.insert("site_name", &cfg.site_name);
    ctx.insert("base_url", &cfg.base_url);
    ctx.insert("last_updated", &page.last_updated);
    ctx.insert("cache_buster", &cache_buster);
    ctx.insert("news", &headline_views(&page.news));
    ctx.insert("rates", &page.rates);
    ctx.insert("policies", &page.policies);
    ctx.insert("econ", &econ);
    ctx.insert("forex", &forex);
    ctx.insert("analysis", &page.analysis);
    ctx.insert("sentiment", &page.sentiment);
    ctx.insert("meta_tags", meta_tags);
    ctx.insert("structured_data_json", &script_safe_json(structured_data)?);

    let html = tera.render("index.html", &ctx)?;
    debug!(bytes = html.len(), "Rendered page");
    Ok(html)
}

static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static RE_BETWEEN_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+<").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Drop comments and inter-tag whitespace, and collapse whitespace runs.
pub fn minify_html(html: &str) -> String {
    let html = RE_COMMENT.replace_all(html, "");
    let html = RE_BETWEEN_TAGS.replace_all(&html, "><");
    let html = RE_WHITESPACE.replace_all(&html, " ");
    html.trim().to_string()
}

/// Write the minified page to `{output_dir}/index.html`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir))]
pub async fn write_index(html: &str, output_dir: &str) -> Result<(), RenderError> {
    let path = Path::new(output_dir).join("index.html");
    tokio::fs::write(&path, html).await?;
    info!(path = %path.display(), bytes = html.len(), "Wrote index.html");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BankRate, HeadlineImage, MarketAnalysis, SentimentSnapshot};
    use serde_json::json;

    fn image(path: &str, kind: ImageKind) -> Option<HeadlineImage> {
        Some(HeadlineImage {
            path: path.to_string(),
            kind,
        })
    }

    fn page() -> FrontPage {
        let mut news = vec![
            Headline::new("Stocks rally into the close", "https://a.example/1").with_source("Example"),
            Headline::new("S&P 500 sets a record", "https://a.example/2"),
            Headline::new("Yen weakens past 155", "https://a.example/3"),
            Headline::new("Copper slides on demand worries", "https://a.example/4"),
        ];
        news[0].image = image("static/images/headlines/aaa.jpg", ImageKind::Scraped);
        news[1].image = image("static/images/dynamic/dynamic_1_ab.jpg", ImageKind::Dynamic);
        news[2].image = image("static/images/ai-generated/bbb.png", ImageKind::AiGenerated);

        FrontPage {
            last_updated: "2025-05-20 10:00 UTC".to_string(),
            news,
            rates: vec![BankRate {
                bank: "Federal Reserve".to_string(),
                code: "fed".to_string(),
                rate: "4.25%–4.50%".to_string(),
                url: "https://www.federalreserve.gov".to_string(),
            }],
            policies: Vec::new(),
            econ: crate::market::economic_indicators(),
            forex: crate::market::forex_quotes(),
            analysis: Some(MarketAnalysis::Structured(json!({
                "executive_summary": {"overall_sentiment": "neutral", "key_highlights": ["Yields ease"]}
            }))),
            sentiment: Some(SentimentSnapshot::default()),
        }
    }

    fn render(page: &FrontPage) -> String {
        let tera = build_tera(None).unwrap();
        let cfg = SiteConfig::default();
        let data = json!({"website": {"name": "</script><b>x</b>"}});
        minify_html(&render_page(&tera, &cfg, page, &[], &data, 1_700_000_000).unwrap())
    }

    #[test]
    fn test_loading_attrs_threshold() {
        assert_eq!(loading_attrs(0), ("eager", "high"));
        assert_eq!(loading_attrs(1), ("eager", "high"));
        assert_eq!(loading_attrs(2), ("lazy", "auto"));
        assert_eq!(loading_attrs(10), ("lazy", "auto"));
    }

    #[test]
    fn test_page_contains_headlines() {
        let html = render(&page());
        assert!(html.contains("Stocks rally into the close"));
        assert!(html.contains("S&amp;P 500 sets a record"));
        assert!(html.contains("4.25%–4.50%"));
        assert!(html.contains("Yields ease"));
        assert!(html.contains("<title>Waneye - Real-Time Financial News &amp; Market Analysis</title>"));
    }

    #[test]
    fn test_image_loading_attributes() {
        let html = render(&page());
        assert_eq!(html.matches(r#"loading="eager" fetchpriority="high""#).count(), 2);
        assert_eq!(html.matches(r#"loading="lazy" fetchpriority="auto""#).count(), 1);
        assert_eq!(html.matches("No image available").count(), 1);
    }

    #[test]
    fn test_image_badges() {
        let html = render(&page());
        assert!(html.contains("news-image dynamic-image"));
        assert!(html.contains("news-image ai-generated-image"));
        assert!(html.contains(r#"<span class="image-badge">Dynamic</span>"#));
        assert!(html.contains(r#"<span class="image-badge">AI</span>"#));
    }

    #[test]
    fn test_structured_data_cannot_close_script() {
        let html = render(&page());
        assert!(html.contains(r#"<\/script><b>x<\/b>"#));
        assert!(!html.contains("<!--"));
    }

    #[test]
    fn test_empty_page_renders() {
        let empty = FrontPage {
            last_updated: "2025-05-20 10:00 UTC".to_string(),
            news: Vec::new(),
            rates: Vec::new(),
            policies: Vec::new(),
            econ: Vec::new(),
            forex: Vec::new(),
            analysis: Some(MarketAnalysis::Raw("Markets were mixed.".to_string())),
            sentiment: None,
        };
        let html = render(&empty);
        assert!(html.contains("No headlines available right now."));
        assert!(html.contains("Markets were mixed."));
        assert!(!html.contains("Market Sentiment"));
    }

    #[test]
    fn test_minify_html() {
        let html = "<div>\n  <!-- note -->\n  <p>Hello    world</p>\n</div>\n";
        assert_eq!(minify_html(html), "<div><p>Hello world</p></div>");
    }

    #[test]
    fn test_template_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            r#"{% extends "base.html" %}{% block content %}<p id="custom">{{ news | length }}</p>{% endblock content %}"#,
        )
        .unwrap();
        let tera = build_tera(dir.path().to_str()).unwrap();
        let html = render_page(&tera, &SiteConfig::default(), &page(), &[], &json!({}), 0).unwrap();
        assert!(html.contains(r#"<p id="custom">4</p>"#));
    }
}
