//! Candidate filtering and image downloads.

use crate::error::FetchError;
use crate::http::fetch_bytes;
use crate::utils::short_hash;
use std::error::Error;
use std::path::Path;
use tracing::{debug, instrument};
use url::Url;

/// Minimum accepted body size. Anything smaller is a tracking pixel or an
/// error page.
pub const MIN_IMAGE_BYTES: usize = 1024;

const TRACKING_HINTS: &[&str] = &["pixel", "spacer", "blank.gif", "1x1", "tracking", "beacon"];

/// Resolve `candidate` against the page URL and reject URLs that cannot be
/// downloaded as a raster image.
pub fn normalize_candidate(page_url: &str, candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() || candidate.starts_with("data:") {
        return None;
    }
    let resolved = match Url::parse(page_url) {
        Ok(base) => base.join(candidate).ok()?,
        Err(_) => Url::parse(candidate).ok()?,
    };
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    let path = resolved.path().to_ascii_lowercase();
    if path.ends_with(".svg") {
        return None;
    }
    let lower = resolved.as_str().to_ascii_lowercase();
    if TRACKING_HINTS.iter().any(|hint| lower.contains(hint)) {
        return None;
    }
    Some(resolved.to_string())
}

/// File extension for an image content type. SVG and unknown types are
/// refused.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    match mime {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

/// Download `url` into `dir`, named after a hash of the URL.
///
/// Returns the file name on success. The response must be 2xx, declare an
/// `image/*` content type and carry at least [`MIN_IMAGE_BYTES`].
#[instrument(level = "debug", skip(client, dir))]
pub async fn download_image(client: &reqwest::Client, url: &str, dir: &Path) -> Result<String, Box<dyn Error>> {
    let download = fetch_bytes(client, url).await?;
    if !download.content_type.starts_with("image/") {
        return Err(FetchError::ContentType {
            content_type: download.content_type,
            url: url.to_string(),
        }
        .into());
    }
    if download.bytes.len() < MIN_IMAGE_BYTES {
        return Err(FetchError::TooSmall {
            bytes: download.bytes.len(),
            url: url.to_string(),
        }
        .into());
    }
    let ext = extension_for(&download.content_type).ok_or_else(|| FetchError::ContentType {
        content_type: download.content_type.clone(),
        url: url.to_string(),
    })?;

    let file_name = format!("{}.{ext}", short_hash(url, 16));
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&file_name), &download.bytes).await?;
    debug!(file = %file_name, bytes = download.bytes.len(), "Saved image");
    Ok(file_name)
}
