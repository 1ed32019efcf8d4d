//! LLM API interaction with exponential backoff retry logic.
//!
//! This module talks to OpenAI-compatible chat-completion endpoints (OpenAI
//! for headline extraction, DeepSeek for market analysis). It includes
//! automatic retry logic with exponential backoff and jitter, and helpers to
//! recover JSON from chatty model replies.
//!
//! # Architecture
//!
//! - [`AskAsync`]: Core trait defining async LLM interaction
//! - [`ChatClient`]: `reqwest`-based chat-completions client
//! - [`RetryAsk`]: Decorator that adds retry logic to any `AskAsync` implementation
//!
//! # Retry Strategy
//!
//! - Maximum 3 retry attempts
//! - Exponential backoff starting at 2 seconds
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::utils::looks_truncated;
use once_cell::sync::Lazy;
use rand::{Rng, rng};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEEPSEEK_CHAT_URL: &str = "https://api.deepseek.com/chat/completions";

/// Trait for async LLM interaction.
///
/// Implementors send text to an LLM and receive a response. Decorators such
/// as [`RetryAsk`] implement it too.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    /// The underlying LLM client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Create a new retry wrapper around an existing [`AskAsync`] implementation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let retry_client = RetryAsk::new(chat_client, 3, Duration::from_secs(2));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    system_prompt: Option<String>,
    temperature: f32,
    max_tokens: u32,
    timeout: StdDuration,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ChatClient {
    pub fn new(http: Client, endpoint: &str, api_key: &str, model: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            system_prompt: None,
            temperature: 0.2,
            max_tokens: 400,
            timeout: StdDuration::from_secs(120),
        }
    }

    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = Some(prompt.to_string());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request<'a>(&'a self, text: &'a str) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: text,
        });
        ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        }
    }
}

impl AskAsync for ChatClient {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&self.request(text))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                elapsed_ms = t0.elapsed().as_millis() as u64,
                status = status.as_u16(),
                body = %crate::utils::truncate_for_log(&body, 300),
                "API call failed"
            );
            return Err(format!("chat endpoint returned {status}").into());
        }

        let parsed: ChatResponse = resp.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or("empty completion")?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, bytes = content.len(), "API call succeeded");
        Ok(content)
    }
}

/// Call the LLM with exponential backoff retry logic.
///
/// # Retry Behavior
///
/// - Up to 3 retry attempts
/// - Exponential backoff: 2s, 4s, 8s (capped at 30s)
/// - Random jitter added to prevent thundering herd
#[instrument(level = "info", skip_all)]
pub async fn ask_with_backoff(client: &ChatClient, prompt: &str) -> Result<String, Box<dyn Error>> {
    let t0 = Instant::now();
    let api = RetryAsk::new(client.clone(), 3, StdDuration::from_secs(2));
    let res = api.ask(prompt).await;
    let dt = t0.elapsed();

    match &res {
        Ok(_) => info!(elapsed_ms_total = dt.as_millis() as u64, "ask_with_backoff succeeded"),
        Err(e) => {
            error!(elapsed_ms_total = dt.as_millis() as u64, error = %e, "ask_with_backoff failed")
        }
    }
    res
}

static RE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").unwrap());
static RE_TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([}\]])").unwrap());

/// Recover a JSON value from a model reply.
///
/// Tries, in order: the whole reply, the contents of each fenced code
/// block, the first balanced `{...}`/`[...]` span, and finally that span
/// with trailing commas removed.
pub fn recover_json(reply: &str) -> Option<Value> {
    let trimmed = reply.trim();
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return Some(v);
    }

    for caps in RE_FENCE.captures_iter(trimmed) {
        if let Ok(v) = serde_json::from_str::<Value>(caps[1].trim()) {
            return Some(v);
        }
    }

    let span = balanced_span(trimmed)?;
    if let Ok(v) = serde_json::from_str::<Value>(span) {
        return Some(v);
    }
    let fixed = RE_TRAILING_COMMA.replace_all(span, "$1");
    serde_json::from_str::<Value>(&fixed).ok()
}

/// The parse error when the JSON in `reply` stops mid-value, as happens
/// when the model hits its token limit. Prose before the first `{`/`[` and
/// a closing code fence are ignored.
pub fn truncated_json(reply: &str) -> Option<serde_json::Error> {
    let start = reply.find(['{', '['])?;
    let body = reply[start..].trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    match serde_json::from_str::<Value>(body) {
        Err(e) if looks_truncated(&e) => Some(e),
        _ => None,
    }
}

/// The first bracket-balanced JSON-looking span, ignoring brackets in strings.
fn balanced_span(s: &str) -> Option<&str> {
    let start = s.find(['{', '['])?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in s[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
    }

    impl AskAsync for Flaky {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err("transient".into())
            } else {
                Ok(format!("echo: {text}"))
            }
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_after_failures() {
        let api = RetryAsk::new(
            Flaky {
                failures: 2,
                calls: AtomicUsize::new(0),
            },
            3,
            StdDuration::from_millis(1),
        );
        let out = api.ask("hi").await.unwrap();
        assert_eq!(out, "echo: hi");
        assert_eq!(api.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let api = RetryAsk::new(
            Flaky {
                failures: 10,
                calls: AtomicUsize::new(0),
            },
            1,
            StdDuration::from_millis(1),
        );
        assert!(api.ask("hi").await.is_err());
        assert_eq!(api.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_chat_request_includes_system_prompt() {
        let client = ChatClient::new(Client::new(), OPENAI_CHAT_URL, "k", "gpt-3.5-turbo")
            .with_system_prompt("You extract headlines.")
            .with_max_tokens(500);
        let body = serde_json::to_value(client.request("hello")).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_recover_json_direct() {
        let v = recover_json(r#"{"a": 1, "b": 2}"#).unwrap();
        assert_eq!(v["b"], 2);
    }

    #[test]
    fn test_recover_json_fenced() {
        let reply = "Here you go:\n```json\n{\"sentiment\": \"positive\", \"score\": 70}\n```\nThanks";
        let v = recover_json(reply).unwrap();
        assert_eq!(v["score"], 70);
    }

    #[test]
    fn test_recover_json_embedded_list() {
        let reply = r#"Sure! [{"headline": "Oil {jumps}", "url": "https://x.com/a"}] hope that helps"#;
        let v = recover_json(reply).unwrap();
        assert_eq!(v[0]["headline"], "Oil {jumps}");
    }

    #[test]
    fn test_recover_json_trailing_comma() {
        let reply = "analysis: {\"a\": [1, 2,], \"b\": \"x\",}";
        let v = recover_json(reply).unwrap();
        assert_eq!(v["a"][1], 2);
    }

    #[test]
    fn test_truncated_json_inside_fence() {
        let reply = "```json\n[{\"headline\": \"Treasury yields climb\", \"url\": \"/markets/yi";
        assert!(truncated_json(reply).is_some());
        let closed = "```json\n{\"executive_summary\": {\"key_highlights\": [\"a\",\n```";
        assert!(truncated_json(closed).is_some());
    }

    #[test]
    fn test_truncated_json_after_preamble() {
        assert!(truncated_json("Here is the analysis: {\"market_outlook\": {\"short_term\": \"Vol").is_some());
    }

    #[test]
    fn test_truncated_json_ignores_complete_or_missing_json() {
        assert!(truncated_json("```json\n{\"a\": 1}\n```").is_none());
        assert!(truncated_json("[1, 2] and some trailing words").is_none());
        assert!(truncated_json("I cannot help with that.").is_none());
    }

    #[test]
    fn test_recover_json_gives_up() {
        assert!(recover_json("no json here").is_none());
        assert!(recover_json("{ unterminated").is_none());
    }
}
