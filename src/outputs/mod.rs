//! Output generation: the static page, its assets and SEO sidecar files.
//!
//! # Submodules
//!
//! - [`html`]: Renders the front page with Tera and minifies it
//! - [`seo`]: Meta tags, JSON-LD structured data, sitemap and robots.txt
//! - [`json`]: Writes the structured data to a JSON file
//! - [`assets`]: The stylesheet and script the page links
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── index.html
//! ├── sitemap.xml
//! ├── robots.txt
//! ├── structured-data.json
//! └── static/
//!     ├── style.css
//!     ├── main.js
//!     └── images/
//!         ├── headlines/      # downloaded article images
//!         ├── ai-generated/   # AI illustrations
//!         └── dynamic/        # procedural placeholders (rotated)
//! ```

pub mod assets;
pub mod html;
pub mod json;
pub mod seo;

use crate::config::SiteConfig;
use chrono::Utc;
use serde_json::Value;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `sitemap.xml`, `robots.txt` and `structured-data.json`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir))]
pub async fn write_seo_files(cfg: &SiteConfig, structured_data: &Value, output_dir: &str) -> Result<(), Box<dyn Error>> {
    let lastmod = Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string();
    let sitemap = seo::sitemap_xml(&cfg.base_url, &lastmod)?;
    fs::write(Path::new(output_dir).join("sitemap.xml"), sitemap).await?;
    info!("Generated sitemap.xml");

    fs::write(Path::new(output_dir).join("robots.txt"), seo::robots_txt(&cfg.base_url)).await?;
    info!("Generated robots.txt");

    json::write_structured_data(structured_data, output_dir).await?;
    Ok(())
}
