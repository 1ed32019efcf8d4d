//! Static assets linked from the page layout.

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const ASSETS_DIR: &str = "static";

/// `(file name, contents)` for every asset `base.html` links.
pub const ASSETS: &[(&str, &str)] = &[
    ("style.css", include_str!("../../assets/style.css")),
    ("main.js", include_str!("../../assets/main.js")),
];

/// Write the stylesheet and script to `{output_dir}/static/`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir))]
pub async fn write_assets(output_dir: &str) -> Result<(), Box<dyn Error>> {
    let dir = Path::new(output_dir).join(ASSETS_DIR);
    fs::create_dir_all(&dir).await?;
    for (name, body) in ASSETS {
        fs::write(dir.join(name), body).await?;
    }
    info!(count = ASSETS.len(), dir = %dir.display(), "Wrote page assets");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::models::FrontPage;
    use crate::outputs::html;

    #[tokio::test]
    async fn test_every_linked_asset_is_written() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path().to_str().unwrap()).await.unwrap();

        let page = FrontPage {
            last_updated: "2025-05-20 10:00 UTC".to_string(),
            news: Vec::new(),
            rates: Vec::new(),
            policies: Vec::new(),
            econ: Vec::new(),
            forex: Vec::new(),
            analysis: None,
            sentiment: None,
        };
        let tera = html::build_tera(None).unwrap();
        let rendered =
            html::render_page(&tera, &SiteConfig::default(), &page, &[], &serde_json::json!({}), 42).unwrap();

        for (name, body) in ASSETS {
            assert!(rendered.contains(&format!("static/{name}?v=42")), "{name} not linked");
            let written = std::fs::read_to_string(dir.path().join(ASSETS_DIR).join(name)).unwrap();
            assert_eq!(written, *body);
        }
    }

    #[test]
    fn test_script_targets_rendered_image_class() {
        let (_, script) = ASSETS.iter().find(|(name, _)| *name == "main.js").unwrap();
        assert!(script.contains("img.news-image"));
        assert!(script.contains("IntersectionObserver"));
    }
}
