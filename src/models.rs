//! Data models for headlines, central-bank data and market figures.
//!
//! This module defines the records that flow from the collectors into the
//! page renderer:
//! - [`Headline`]: a normalized news headline with an optional image
//! - [`HeadlineImage`] / [`ImageKind`]: where a headline's picture came from
//! - [`BankRate`] / [`BankPolicy`]: per-bank extraction results (or sentinels)
//! - [`EconomicIndicator`] / [`ForexQuote`]: static market records
//! - [`MarketAnalysis`] / [`SentimentSnapshot`]: optional LLM enrichment
//! - [`FrontPage`]: everything a single run renders
//!
//! All records are regenerated every run; nothing here is persisted.

use serde::{Deserialize, Serialize};

/// A financial headline as collected from any source.
///
/// Headlines are deduplicated by URL or case-insensitive text within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    /// The headline text shown on the page.
    pub text: String,
    /// Link to the full story.
    pub url: String,
    /// Publication timestamp as reported by the source, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Name of the source the headline was collected from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// The representative image, attached by the image resolver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<HeadlineImage>,
}

impl Headline {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
            published_at: None,
            source: None,
            image: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_published_at(mut self, published_at: Option<String>) -> Self {
        self.published_at = published_at.filter(|s| !s.trim().is_empty());
        self
    }

    /// Host of the headline URL without a leading `www.`.
    ///
    /// For example: `"https://www.cnbc.com/markets"` -> `"cnbc.com"`.
    pub fn domain(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }
}

/// How a headline image was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageKind {
    /// Downloaded from the article page.
    Scraped,
    /// Produced by the AI image endpoint.
    AiGenerated,
    /// Procedurally drawn placeholder.
    Dynamic,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Scraped => "scraped",
            ImageKind::AiGenerated => "ai-generated",
            ImageKind::Dynamic => "dynamic",
        }
    }
}

/// A saved image, with its path relative to the output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineImage {
    /// Path relative to the site root, using `/` separators.
    pub path: String,
    pub kind: ImageKind,
}

/// Latest policy rate for one central bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRate {
    pub bank: String,
    pub code: String,
    /// A percentage such as `"4.50%"`, a range, or a sentinel string.
    pub rate: String,
    pub url: String,
}

/// Policy statement summary for one central bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankPolicy {
    pub bank: String,
    pub code: String,
    /// Up to 500 characters of summary, or a sentinel string.
    pub policy: String,
    pub url: String,
}

/// A headline economic data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicIndicator {
    pub event: String,
    /// Display value, e.g. `"+250K"` or `"2.1% YoY"`.
    pub value: String,
    pub date: String,
    pub numeric_value: f64,
    /// Upper bound used to scale the gauge bar.
    pub max_value: f64,
    pub unit: String,
    /// One of `positive`, `negative`, `neutral`.
    pub sentiment: String,
}

impl EconomicIndicator {
    /// Position of `numeric_value` on the gauge, clamped to `0..=100`.
    pub fn progress_percent(&self) -> f64 {
        if self.max_value <= 0.0 {
            return 0.0;
        }
        (self.numeric_value / self.max_value * 100.0).clamp(0.0, 100.0)
    }
}

/// A forex CFD quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForexQuote {
    pub pair: String,
    pub bid: f64,
    pub ask: f64,
    pub change: f64,
}

impl ForexQuote {
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    pub fn direction(&self) -> &'static str {
        if self.change > 0.0 {
            "up"
        } else if self.change < 0.0 {
            "down"
        } else {
            "flat"
        }
    }
}

/// LLM commentary on the day's headlines.
///
/// The model is asked for JSON; when nothing parseable can be recovered
/// from its reply the raw text is kept instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", content = "body", rename_all = "lowercase")]
pub enum MarketAnalysis {
    Structured(serde_json::Value),
    Raw(String),
}

/// Result of the quick sentiment pass over the headlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    #[serde(default = "neutral")]
    pub sentiment: String,
    #[serde(default = "midpoint")]
    pub score: u8,
    #[serde(default)]
    pub summary: String,
}

fn neutral() -> String {
    "neutral".to_string()
}

fn midpoint() -> u8 {
    50
}

impl Default for SentimentSnapshot {
    fn default() -> Self {
        Self {
            sentiment: neutral(),
            score: midpoint(),
            summary: String::new(),
        }
    }
}

/// Everything produced by a single run, handed to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct FrontPage {
    /// `%Y-%m-%d %H:%M UTC` timestamp of the run.
    pub last_updated: String,
    pub news: Vec<Headline>,
    pub rates: Vec<BankRate>,
    pub policies: Vec<BankPolicy>,
    pub econ: Vec<EconomicIndicator>,
    pub forex: Vec<ForexQuote>,
    pub analysis: Option<MarketAnalysis>,
    pub sentiment: Option<SentimentSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_domain_strips_www() {
        let h = Headline::new("Stocks rally", "https://www.cnbc.com/2025/05/06/stocks.html");
        assert_eq!(h.domain(), Some("cnbc.com".to_string()));
    }

    #[test]
    fn test_headline_domain_invalid_url() {
        let h = Headline::new("Stocks rally", "not a url");
        assert_eq!(h.domain(), None);
    }

    #[test]
    fn test_published_at_blank_is_dropped() {
        let h = Headline::new("a", "https://a.com").with_published_at(Some("  ".to_string()));
        assert_eq!(h.published_at, None);
    }

    #[test]
    fn test_headline_serialization_skips_empty_fields() {
        let h = Headline::new("Fed holds rates", "https://example.com/fed");
        let json = serde_json::to_string(&h).unwrap();
        assert!(json.contains("Fed holds rates"));
        assert!(!json.contains("published_at"));
        assert!(!json.contains("image"));
    }

    #[test]
    fn test_image_kind_serialization() {
        let img = HeadlineImage {
            path: "static/images/ai-generated/ai_1.png".to_string(),
            kind: ImageKind::AiGenerated,
        };
        let json = serde_json::to_string(&img).unwrap();
        assert!(json.contains("\"ai-generated\""));
        assert_eq!(ImageKind::Dynamic.as_str(), "dynamic");
    }

    #[test]
    fn test_progress_percent_clamped() {
        let mut ind = EconomicIndicator {
            event: "US Nonfarm Payrolls".to_string(),
            value: "+250K".to_string(),
            date: "2025-05-20".to_string(),
            numeric_value: 250.0,
            max_value: 500.0,
            unit: "K".to_string(),
            sentiment: "positive".to_string(),
        };
        assert_eq!(ind.progress_percent(), 50.0);
        ind.numeric_value = 900.0;
        assert_eq!(ind.progress_percent(), 100.0);
        ind.max_value = 0.0;
        assert_eq!(ind.progress_percent(), 0.0);
    }

    #[test]
    fn test_forex_direction_and_spread() {
        let q = ForexQuote {
            pair: "EUR/USD".to_string(),
            bid: 1.0850,
            ask: 1.0852,
            change: -0.0002,
        };
        assert_eq!(q.direction(), "down");
        assert!((q.spread() - 0.0002).abs() < 1e-9);
    }

    #[test]
    fn test_sentiment_defaults() {
        let s: SentimentSnapshot = serde_json::from_str(r#"{"summary": "mixed"}"#).unwrap();
        assert_eq!(s.sentiment, "neutral");
        assert_eq!(s.score, 50);
        assert_eq!(s.summary, "mixed");
    }
}
