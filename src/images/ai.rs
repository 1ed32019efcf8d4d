//! AI-generated headline illustrations via the OpenAI images endpoint.

use crate::api::AskAsync;
use crate::utils::truncate_with_ellipsis;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

pub const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

/// Client for the image generation endpoint. `ask` returns the URL of the
/// generated image.
#[derive(Clone)]
pub struct ImageGenerator {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    size: String,
    timeout: Duration,
}

impl fmt::Debug for ImageGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageGenerator")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("size", &self.size)
            .finish()
    }
}

impl ImageGenerator {
    pub fn new(http: Client, api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            http,
            endpoint: OPENAI_IMAGES_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            size: "512x512".to_string(),
            timeout,
        }
    }
}

/// Prompt for an editorial illustration of `headline`.
pub fn illustration_prompt(headline: &str) -> String {
    format!(
        "A professional editorial illustration for a financial news story titled \"{}\". \
         Clean modern style, muted colors, charts or market imagery where relevant. \
         No text, no logos, no real people.",
        truncate_with_ellipsis(headline.trim(), 200)
    )
}

impl AskAsync for ImageGenerator {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&ImageRequest {
                model: &self.model,
                prompt: text,
                n: 1,
                size: &self.size,
                response_format: "url",
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body = %crate::utils::truncate_for_log(&body, 300),
                "Image generation failed"
            );
            return Err(format!("images endpoint returned {status}").into());
        }

        let parsed: ImageResponse = resp.json().await?;
        let url = parsed
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or("image response contained no url")?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Generated image");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illustration_prompt() {
        let prompt = illustration_prompt("  Fed holds rates steady  ");
        assert!(prompt.contains("\"Fed holds rates steady\""));
        assert!(prompt.contains("No text"));
    }

    #[test]
    fn test_image_response_parsing() {
        let body = r#"{"created": 1, "data": [{"url": "https://img.example/gen.png", "revised_prompt": "x"}]}"#;
        let parsed: ImageResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data[0].url.as_deref(), Some("https://img.example/gen.png"));
    }

    #[test]
    fn test_debug_hides_key() {
        let generator = ImageGenerator::new(Client::new(), "sk-secret", "dall-e-2", Duration::from_secs(5));
        let dbg = format!("{generator:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("dall-e-2"));
    }
}
