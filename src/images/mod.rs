//! Headline image resolution.
//!
//! Every headline gets a representative image from the first strategy that
//! succeeds:
//!
//! 1. Open Graph / Twitter / itemprop meta tags ([`meta`])
//! 2. JSON-LD structured data ([`jsonld`])
//! 3. `<img>` elements with story-like classes ([`dom`])
//! 4. The largest declared `<img>` on the page ([`dom`])
//! 5. An AI-generated illustration, when an OpenAI key is configured ([`ai`])
//! 6. A procedurally drawn placeholder ([`placeholder`])
//!
//! Candidates from strategies 1-4 are downloaded into
//! `static/images/headlines/`; a failed download moves on to the next
//! candidate, then the next strategy. Headlines are processed one at a
//! time and nothing is retried. The placeholder directory is rotated once
//! all headlines have their images, never deleting one the page uses.

pub mod ai;
pub mod dom;
pub mod download;
pub mod jsonld;
pub mod meta;
pub mod placeholder;

use crate::api::AskAsync;
use crate::http::fetch_text;
use crate::models::{Headline, HeadlineImage, ImageKind};
use ai::{ImageGenerator, illustration_prompt};
use download::{download_image, normalize_candidate};
use scraper::Html;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};

pub const HEADLINES_DIR: &str = "static/images/headlines";
pub const AI_DIR: &str = "static/images/ai-generated";
pub const DYNAMIC_DIR: &str = "static/images/dynamic";

/// Everything the cascade needs besides the headline itself.
#[derive(Debug)]
pub struct ImageResolver {
    client: reqwest::Client,
    output_dir: PathBuf,
    generator: Option<ImageGenerator>,
    max_dynamic_images: usize,
    offline: bool,
}

impl ImageResolver {
    pub fn new(client: reqwest::Client, output_dir: impl Into<PathBuf>, max_dynamic_images: usize) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
            generator: None,
            max_dynamic_images,
            offline: false,
        }
    }

    pub fn with_generator(mut self, generator: Option<ImageGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Skip every network strategy and go straight to placeholders.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    fn dir(&self, relative: &str) -> PathBuf {
        self.output_dir.join(relative)
    }

    /// Resolve one image for `headline`. `None` only when even the
    /// placeholder could not be written.
    #[instrument(level = "info", skip_all, fields(url = %headline.url))]
    pub async fn resolve(&self, headline: &Headline) -> Option<HeadlineImage> {
        if !self.offline {
            if let Some(image) = self.scrape(headline).await {
                return Some(image);
            }
            if let Some(image) = self.generate(headline).await {
                return Some(image);
            }
        }
        self.placeholder()
    }

    async fn scrape(&self, headline: &Headline) -> Option<HeadlineImage> {
        let html = match fetch_text(&self.client, &headline.url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Could not fetch article page for images");
                return None;
            }
        };

        let dir = self.dir(HEADLINES_DIR);
        for (strategy, candidates) in page_candidates(&html, &headline.url) {
            for candidate in candidates {
                match download_image(&self.client, &candidate, &dir).await {
                    Ok(file) => {
                        info!(strategy, file = %file, "Resolved headline image");
                        return Some(HeadlineImage {
                            path: format!("{HEADLINES_DIR}/{file}"),
                            kind: ImageKind::Scraped,
                        });
                    }
                    Err(e) => debug!(strategy, candidate = %candidate, error = %e, "Image candidate rejected"),
                }
            }
        }
        None
    }

    async fn generate(&self, headline: &Headline) -> Option<HeadlineImage> {
        let generator = self.generator.as_ref()?;
        let url = match generator.ask(&illustration_prompt(&headline.text)).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "AI image generation failed");
                return None;
            }
        };
        match download_image(&self.client, &url, &self.dir(AI_DIR)).await {
            Ok(file) => {
                info!(file = %file, "Using AI-generated image");
                Some(HeadlineImage {
                    path: format!("{AI_DIR}/{file}"),
                    kind: ImageKind::AiGenerated,
                })
            }
            Err(e) => {
                warn!(error = %e, "Could not download AI-generated image");
                None
            }
        }
    }

    fn placeholder(&self) -> Option<HeadlineImage> {
        match placeholder::write_placeholder(&self.dir(DYNAMIC_DIR)) {
            Ok(file) => Some(HeadlineImage {
                path: format!("{DYNAMIC_DIR}/{file}"),
                kind: ImageKind::Dynamic,
            }),
            Err(e) => {
                error!(error = %e, "Failed to write placeholder image");
                None
            }
        }
    }

    /// Attach an image to every headline, one at a time.
    #[instrument(level = "info", skip_all, fields(count = headlines.len()))]
    pub async fn attach_images(&self, headlines: &mut [Headline]) {
        for headline in headlines.iter_mut() {
            headline.image = self.resolve(headline).await;
            if let Some(image) = &headline.image {
                debug!(kind = image.kind.as_str(), path = %image.path, "Headline image ready");
            }
        }
        let scraped = headlines
            .iter()
            .filter(|h| matches!(h.image.as_ref().map(|i| i.kind), Some(ImageKind::Scraped)))
            .count();
        info!(scraped, total = headlines.len(), "Attached headline images");
        self.rotate_placeholders(headlines);
    }

    fn rotate_placeholders(&self, headlines: &[Headline]) {
        let dir = self.dir(DYNAMIC_DIR);
        if !dir.is_dir() {
            return;
        }
        let in_use: HashSet<String> = headlines
            .iter()
            .filter_map(|h| h.image.as_ref())
            .filter(|img| img.kind == ImageKind::Dynamic)
            .filter_map(|img| img.path.rsplit('/').next())
            .map(str::to_string)
            .collect();
        match placeholder::rotate(&dir, self.max_dynamic_images, &in_use) {
            Ok(removed) => debug!(removed, in_use = in_use.len(), "Rotated placeholder images"),
            Err(e) => warn!(error = %e, "Failed to rotate placeholder images"),
        }
    }
}

/// Candidate URLs per strategy, resolved and filtered, in cascade order.
pub fn page_candidates(html: &str, page_url: &str) -> Vec<(&'static str, Vec<String>)> {
    let document = Html::parse_document(html);
    let strategies = [
        ("meta", meta::candidates(&document)),
        ("json-ld", jsonld::candidates(&document)),
        ("class", dom::class_candidates(&document)),
        ("largest", dom::largest_candidate(&document).into_iter().collect()),
    ];
    strategies
        .into_iter()
        .map(|(name, raw)| {
            let mut resolved: Vec<String> = Vec::with_capacity(raw.len());
            for url in raw.iter().filter_map(|c| normalize_candidate(page_url, c)) {
                if !resolved.contains(&url) {
                    resolved.push(url);
                }
            }
            (name, resolved)
        })
        .filter(|(_, urls)| !urls.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_candidates_order() {
        let html = r#"<html><head>
            <meta property="og:image" content="/og.jpg">
            <script type="application/ld+json">{"image": "https://cdn.example/ld.jpg"}</script>
        </head><body>
            <img class="hero" src="/hero.jpg">
            <img src="/big.jpg" width="1200" height="800">
            <img class="logo" src="/logo.svg">
        </body></html>"#;
        let found = page_candidates(html, "https://news.example/a/story");
        let names: Vec<&str> = found.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["meta", "json-ld", "class", "largest"]);
        assert_eq!(found[0].1, vec!["https://news.example/og.jpg"]);
        assert_eq!(found[3].1, vec!["https://news.example/big.jpg"]);
    }

    #[test]
    fn test_page_candidates_drop_filtered() {
        let html = r#"<html><head><meta property="og:image" content="/brand.svg"></head><body></body></html>"#;
        assert!(page_candidates(html, "https://news.example/").is_empty());
    }

    #[tokio::test]
    async fn test_offline_resolution_uses_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ImageResolver::new(reqwest::Client::new(), dir.path(), 5).offline(true);
        let mut headlines = vec![
            Headline::new("Stocks rally", "https://news.example/1"),
            Headline::new("Bonds slip", "https://news.example/2"),
        ];
        resolver.attach_images(&mut headlines).await;

        let paths: Vec<String> = headlines
            .iter()
            .map(|h| {
                let image = h.image.as_ref().unwrap();
                assert_eq!(image.kind, ImageKind::Dynamic);
                assert!(image.path.starts_with("static/images/dynamic/dynamic_"));
                image.path.clone()
            })
            .collect();
        assert_ne!(paths[0], paths[1]);
        assert!(dir.path().join(&paths[0]).exists());
    }

    #[tokio::test]
    async fn test_rotation_keeps_every_image_the_page_uses() {
        let dir = tempfile::tempdir().unwrap();
        let dynamic = dir.path().join(DYNAMIC_DIR);
        std::fs::create_dir_all(&dynamic).unwrap();
        let stale = dynamic.join("dynamic_1_00000000.jpg");
        std::fs::write(&stale, b"jpeg").unwrap();
        let old = std::time::SystemTime::now() - std::time::Duration::from_secs(3_600);
        std::fs::File::options().write(true).open(&stale).unwrap().set_modified(old).unwrap();

        let resolver = ImageResolver::new(reqwest::Client::new(), dir.path(), 2).offline(true);
        let mut headlines: Vec<Headline> = (1..=4)
            .map(|i| Headline::new(format!("Headline {i}"), format!("https://news.example/{i}")))
            .collect();
        resolver.attach_images(&mut headlines).await;

        for h in &headlines {
            let path = &h.image.as_ref().unwrap().path;
            assert!(dir.path().join(path).exists(), "{path} was rotated away");
        }
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_zero_quota_still_keeps_current_images() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ImageResolver::new(reqwest::Client::new(), dir.path(), 0).offline(true);
        let mut headlines = vec![Headline::new("Gold climbs", "https://news.example/gold")];
        resolver.attach_images(&mut headlines).await;

        let path = &headlines[0].image.as_ref().unwrap().path;
        assert!(dir.path().join(path).exists());
    }
}
