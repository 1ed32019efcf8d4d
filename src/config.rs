//! Site configuration loaded from an optional YAML file.
//!
//! Every field has a default, so running without `--config` produces the
//! stock site. A partial file only overrides the keys it names:
//!
//! ```yaml
//! site_name: Example Markets
//! base_url: https://markets.example.com
//! max_headlines: 8
//! ```

use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

/// An RSS feed polled for headlines.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
}

/// Site-wide settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub site_name: String,
    /// Absolute URL of the published site, without a trailing slash.
    pub base_url: String,
    pub title: String,
    pub page_title: String,
    pub author: String,
    pub twitter_handle: String,
    pub request_timeout_secs: u64,
    pub llm_timeout_secs: u64,
    pub max_headlines: usize,
    pub max_dynamic_images: usize,
    pub openai_model: String,
    pub openai_image_model: String,
    pub deepseek_model: String,
    /// Homepages handed to the LLM for headline extraction.
    pub homepages: Vec<String>,
    pub rss_feeds: Vec<FeedConfig>,
    pub analysis_question: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Waneye Financial".to_string(),
            base_url: "https://waneye.com".to_string(),
            title: "Waneye - Real-Time Financial News & Market Analysis".to_string(),
            page_title: "Waneye Financial Overview".to_string(),
            author: "Waneye Technology".to_string(),
            twitter_handle: "@WaneyeTech".to_string(),
            request_timeout_secs: 20,
            llm_timeout_secs: 120,
            max_headlines: 12,
            max_dynamic_images: 40,
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_image_model: "dall-e-2".to_string(),
            deepseek_model: "deepseek-chat".to_string(),
            homepages: vec![
                "https://www.cnn.com/business".to_string(),
                "https://www.reuters.com/finance".to_string(),
                "https://www.cnbc.com/world/?region=world".to_string(),
            ],
            rss_feeds: vec![
                FeedConfig {
                    name: "CNBC Top News".to_string(),
                    url: "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=100003114".to_string(),
                },
                FeedConfig {
                    name: "MarketWatch".to_string(),
                    url: "https://feeds.content.dowjones.io/public/rss/mw_topstories".to_string(),
                },
                FeedConfig {
                    name: "Yahoo Finance".to_string(),
                    url: "https://finance.yahoo.com/news/rssindex".to_string(),
                },
            ],
            analysis_question: "What's the current financial situation today, any news that I should pay the most attention to?".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load the config from `path`, or return the defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(Path::new(path))?;
        let config = Self::from_yaml(&raw)?;
        info!(path, base_url = %config.base_url, "Loaded site configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        let mut config: SiteConfig = serde_yaml::from_str(raw)?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }
}
