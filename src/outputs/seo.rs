//! Search-engine metadata for the front page.
//!
//! Produces the `<meta>` tags embedded in the page head, the JSON-LD
//! structured data, and the `sitemap.xml` / `robots.txt` sidecar files.
//!
//! # Description
//!
//! The meta description is built from the leading headlines: each of the
//! first five is bucketed into a market focus (stocks, currencies, monetary
//! policy, crypto), and up to three distinct foci are mentioned. The result
//! is capped at 160 characters.

use crate::config::SiteConfig;
use crate::models::Headline;
use crate::utils::truncate_with_ellipsis;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;
use serde_json::{Value, json};
use std::error::Error;
use std::io::Cursor;

pub const DESCRIPTION_MAX_CHARS: usize = 160;
pub const KEYWORDS_MAX: usize = 30;

const BASE_KEYWORDS: &[&str] = &[
    "financial news",
    "stock market",
    "economy",
    "investment",
    "trading",
    "forex",
    "currency",
    "bonds",
    "commodities",
    "economic indicators",
    "central bank",
    "interest rates",
    "inflation",
    "GDP",
    "market analysis",
    "real-time data",
    "financial dashboard",
    "market trends",
    "economic data",
];

const HEADLINE_TERMS: &[&str] = &[
    "stock", "market", "economy", "dollar", "euro", "pound", "yen", "gold", "oil", "bitcoin", "crypto", "fed",
    "bank", "rate", "trade", "investment", "growth", "inflation", "recession", "bull", "bear",
];

const FOCI: &[(&str, &[&str])] = &[
    ("stock market", &["stock", "market", "dow", "nasdaq"]),
    ("currency exchange", &["dollar", "euro", "currency", "forex"]),
    ("monetary policy", &["fed", "central bank", "interest"]),
    ("cryptocurrency", &["crypto", "bitcoin", "ethereum"]),
];

/// One `<meta>` element. `attr` is `name` or `property`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaTag {
    pub attr: &'static str,
    pub key: String,
    pub content: String,
}

impl MetaTag {
    fn name(key: &str, content: impl Into<String>) -> Self {
        Self {
            attr: "name",
            key: key.to_string(),
            content: content.into(),
        }
    }

    fn property(key: &str, content: impl Into<String>) -> Self {
        Self {
            attr: "property",
            key: key.to_string(),
            content: content.into(),
        }
    }
}

/// Base keywords followed by financial terms found in the first 20
/// headlines, at most [`KEYWORDS_MAX`] in total.
pub fn extract_keywords(news: &[Headline]) -> Vec<String> {
    let lowered: Vec<String> = news.iter().take(20).map(|h| h.text.to_lowercase()).collect();
    let found = HEADLINE_TERMS
        .iter()
        .filter(|term| lowered.iter().any(|text| text.contains(**term)))
        .filter(|term| !BASE_KEYWORDS.contains(*term));

    BASE_KEYWORDS
        .iter()
        .chain(found)
        .take(KEYWORDS_MAX)
        .map(|k| k.to_string())
        .collect()
}

/// Page description reflecting what the top headlines are about.
pub fn dynamic_description(site_name: &str, news: &[Headline]) -> String {
    let mut description =
        format!("{site_name} provides real-time financial news, market analysis, and economic indicators. ");

    let foci: Vec<&str> = news
        .iter()
        .take(5)
        .filter_map(|h| {
            let text = h.text.to_lowercase();
            FOCI.iter()
                .find(|(_, terms)| terms.iter().any(|t| text.contains(*t)))
                .map(|(focus, _)| *focus)
        })
        .take(3)
        .collect();
    let mut unique: Vec<&str> = Vec::new();
    for focus in foci {
        if !unique.contains(&focus) {
            unique.push(focus);
        }
    }
    if !unique.is_empty() {
        description.push_str(&format!("Track {} updates, ", unique.join(", ")));
    }

    description.push_str("central bank policies, forex rates, and comprehensive economic data dashboard.");
    truncate_with_ellipsis(&description, DESCRIPTION_MAX_CHARS)
}

/// All meta tags for the page head.
pub fn meta_tags(cfg: &SiteConfig, news: &[Headline]) -> Vec<MetaTag> {
    let description = dynamic_description(&cfg.site_name, news);
    let keywords = extract_keywords(news).join(", ");
    let base = &cfg.base_url;

    vec![
        MetaTag::name("description", description.clone()),
        MetaTag::name("keywords", keywords),
        MetaTag::name("author", cfg.author.clone()),
        MetaTag::name("robots", "index, follow"),
        MetaTag::name("googlebot", "index, follow"),
        MetaTag::name("language", "en"),
        MetaTag::name("revisit-after", "1 day"),
        MetaTag::property("og:title", cfg.title.clone()),
        MetaTag::property("og:description", description.clone()),
        MetaTag::property("og:type", "website"),
        MetaTag::property("og:url", base.clone()),
        MetaTag::property("og:site_name", cfg.site_name.clone()),
        MetaTag::property("og:image", format!("{base}/static/images/og-image.jpg")),
        MetaTag::property("og:image:width", "1200"),
        MetaTag::property("og:image:height", "630"),
        MetaTag::property("og:locale", "en_US"),
        MetaTag::name("twitter:card", "summary_large_image"),
        MetaTag::name("twitter:site", cfg.twitter_handle.clone()),
        MetaTag::name("twitter:creator", cfg.twitter_handle.clone()),
        MetaTag::name("twitter:title", cfg.title.clone()),
        MetaTag::name("twitter:description", description),
        MetaTag::name("twitter:image", format!("{base}/static/images/twitter-card.jpg")),
        MetaTag::name("theme-color", "#eaf6ff"),
    ]
}

/// JSON-LD documents describing the site and its top stories.
pub fn structured_data(cfg: &SiteConfig, news: &[Headline], last_updated: &str) -> Value {
    let base = &cfg.base_url;
    let logo = format!("{base}/favicon.svg");

    let organization = json!({
        "@context": "https://schema.org",
        "@type": "Organization",
        "name": cfg.author,
        "alternateName": cfg.site_name,
        "url": base,
        "logo": logo,
        "description": "Real-time financial news aggregation and market analysis platform",
        "contactPoint": {
            "@type": "ContactPoint",
            "contactType": "Customer Service",
            "availableLanguage": "English"
        }
    });

    let website = json!({
        "@context": "https://schema.org",
        "@type": "WebSite",
        "name": cfg.site_name,
        "url": base,
        "description": "Real-time financial news, market data, and economic indicators",
        "publisher": {"@type": "Organization", "name": cfg.author},
        "potentialAction": {
            "@type": "SearchAction",
            "target": format!("{base}/?q={{search_term_string}}"),
            "query-input": "required name=search_term_string"
        }
    });

    let articles: Vec<Value> = news
        .iter()
        .take(10)
        .filter(|h| !h.text.trim().is_empty() && !h.url.trim().is_empty())
        .map(|h| {
            let mut article = json!({
                "@context": "https://schema.org",
                "@type": "NewsArticle",
                "headline": h.text,
                "url": h.url,
                "datePublished": h.published_at.as_deref().unwrap_or(last_updated),
                "publisher": {
                    "@type": "Organization",
                    "name": cfg.author,
                    "logo": {"@type": "ImageObject", "url": logo}
                },
                "mainEntityOfPage": {"@type": "WebPage", "@id": h.url}
            });
            if let Some(image) = &h.image {
                article["image"] = json!({
                    "@type": "ImageObject",
                    "url": format!("{base}/{}", image.path),
                    "width": 512,
                    "height": 512
                });
            }
            article
        })
        .collect();

    let dashboard = json!({
        "@context": "https://schema.org",
        "@type": "WebApplication",
        "name": cfg.site_name,
        "url": base,
        "applicationCategory": "FinanceApplication",
        "operatingSystem": "Any",
        "description": "Real-time financial dashboard with news, market data, and economic indicators",
        "offers": {"@type": "Offer", "price": "0", "priceCurrency": "USD"}
    });

    json!({
        "organization": organization,
        "website": website,
        "news_articles": articles,
        "dashboard": dashboard
    })
}

fn text_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, text: &str) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// `sitemap.xml` listing the site root.
pub fn sitemap_xml(base_url: &str, lastmod: &str) -> Result<String, Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("urlset").with_attributes([
        ("xmlns", "http://www.sitemaps.org/schemas/sitemap/0.9"),
        ("xmlns:news", "http://www.google.com/schemas/sitemap-news/0.9"),
    ])))?;
    writer.write_event(Event::Start(BytesStart::new("url")))?;
    text_element(&mut writer, "loc", base_url)?;
    text_element(&mut writer, "lastmod", lastmod)?;
    text_element(&mut writer, "changefreq", "hourly")?;
    text_element(&mut writer, "priority", "1.0")?;
    writer.write_event(Event::End(BytesEnd::new("url")))?;
    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    let mut xml = String::from_utf8(writer.into_inner().into_inner())?;
    xml.push('\n');
    Ok(xml)
}

/// `robots.txt` allowing everything and pointing at the sitemap.
pub fn robots_txt(base_url: &str) -> String {
    let mut robots = format!("User-agent: *\nAllow: /\n\n# Sitemaps\nSitemap: {base_url}/sitemap.xml\n\nCrawl-delay: 1\n");
    for agent in ["Googlebot", "Bingbot", "Slurp"] {
        robots.push_str(&format!("\nUser-agent: {agent}\nAllow: /\nCrawl-delay: 1\n"));
    }
    robots
}
