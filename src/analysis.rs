//! LLM market commentary on the day's headlines.
//!
//! A DeepSeek "financial expert" reads the numbered headline list and
//! answers the configured analysis question as a JSON document. A second,
//! cheaper call produces a one-line sentiment reading for the page header.
//! Both are optional: without a key, or on any failure, the page renders
//! without them.

use crate::api::{ChatClient, DEEPSEEK_CHAT_URL, ask_with_backoff, recover_json, truncated_json};
use crate::models::{Headline, MarketAnalysis, SentimentSnapshot};
use crate::utils::truncate_for_log;
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument, warn};

const ANALYST_SYSTEM_PROMPT: &str = "You are DeepSeek, a senior financial analyst with expertise in global markets, \
providing comprehensive and actionable financial analysis. Your analysis should be professional, data-driven, \
and include specific recommendations. Always respond in JSON format when requested for easy consumption by applications.";

const SENTIMENT_SYSTEM_PROMPT: &str =
    "You are a financial sentiment analyst. Provide concise, accurate sentiment analysis in JSON format.";

const SENTIMENT_HEADLINES: usize = 10;

/// Numbered headline list with the bare source domain under each entry.
pub fn headlines_text(headlines: &[Headline], limit: Option<usize>) -> String {
    let take = limit.unwrap_or(headlines.len());
    headlines
        .iter()
        .take(take)
        .enumerate()
        .map(|(i, h)| {
            let source = h.domain().unwrap_or_else(|| h.url.clone());
            if h.url.is_empty() {
                format!("{}. {}", i + 1, h.text)
            } else {
                format!("{}. {}\n   Source: {}", i + 1, h.text, source)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn analysis_prompt(headlines: &str, question: &str) -> String {
    let now = Utc::now();
    let date = now.format("%B %d, %Y");
    let time = now.format("%H:%M");
    format!(
        r#"You are DeepSeek, an advanced AI financial analyst with real-time financial news data provided.
Your expertise includes market analysis and trend identification, risk assessment, economic indicator
interpretation, company fundamentals, technical analysis and global macro-economic insights.

Your analysis should be data-driven, balanced between opportunities and risks, actionable, and forward-looking.

Provide a comprehensive analysis of today's financial headlines ({date}).

Headlines to analyze:
{headlines}

Please provide a detailed financial analysis answering: "{question}"

Format your response as a JSON object with the following structure:
{{
  "analysis_date": "{date}",
  "analysis_time": "{time}",
  "executive_summary": {{
    "key_highlights": ["..."],
    "market_sentiment_score": 85,
    "overall_sentiment": "positive/negative/neutral"
  }},
  "market_insights": {{
    "sectors": [{{"sector": "Technology", "trend": "description", "implications": "impact analysis"}}],
    "key_themes": ["..."]
  }},
  "risk_assessment": [
    {{"risk_factor": "Factor name", "impact": "High/Medium/Low", "likelihood": "High/Medium/Low", "mitigation": "Strategy description"}}
  ],
  "strategic_recommendations": {{
    "opportunities": [{{"recommendation": "Action", "rationale": "Why", "tickers": ["..."], "timeframe": "short/medium/long-term"}}],
    "defensive_moves": [{{"recommendation": "Action", "rationale": "Why", "tickers": ["..."], "timeframe": "short/medium/long-term"}}]
  }},
  "market_outlook": {{
    "short_term": "1-3 month outlook",
    "long_term": "6-12 month outlook",
    "key_catalysts": ["..."],
    "watch_list": ["..."]
  }}
}}

Provide the analysis in this JSON structure without any markdown formatting."#
    )
}

fn sentiment_prompt(headlines: &str) -> String {
    format!(
        "Analyze the sentiment of these financial headlines and provide a brief assessment:\n\n{headlines}\n\n\
         Respond in JSON format with:\n\
         - \"sentiment\": \"positive\", \"negative\", or \"neutral\"\n\
         - \"score\": integer from 1-100 (market optimism score)\n\
         - \"summary\": brief 2-3 sentence summary of key themes\n\n\
         Keep the response concise and data-focused."
    )
}

/// Interpret an analysis reply: a JSON object when one can be recovered,
/// raw text otherwise.
pub fn parse_analysis(reply: &str) -> MarketAnalysis {
    match recover_json(reply) {
        Some(value @ Value::Object(_)) => MarketAnalysis::Structured(value),
        _ => MarketAnalysis::Raw(reply.trim().to_string()),
    }
}

/// Interpret a sentiment reply. Unparseable replies become a neutral
/// reading with the reply as summary.
pub fn parse_sentiment(reply: &str) -> SentimentSnapshot {
    let Some(Value::Object(map)) = recover_json(reply) else {
        return SentimentSnapshot {
            summary: reply.trim().to_string(),
            ..SentimentSnapshot::default()
        };
    };

    let sentiment = map
        .get("sentiment")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_lowercase())
        .filter(|s| matches!(s.as_str(), "positive" | "negative" | "neutral"))
        .unwrap_or_else(|| "neutral".to_string());
    let score = map
        .get("score")
        .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .map(|s| s.round().clamp(1.0, 100.0) as u8)
        .unwrap_or(50);
    let summary = map
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    SentimentSnapshot {
        sentiment,
        score,
        summary,
    }
}

/// DeepSeek-backed headline analyst.
#[derive(Debug, Clone)]
pub struct FinancialExpert {
    analyst: ChatClient,
    sentiment: ChatClient,
    question: String,
}

impl FinancialExpert {
    pub fn new(http: reqwest::Client, api_key: &str, model: &str, question: &str, timeout: Duration) -> Self {
        let analyst = ChatClient::new(http.clone(), DEEPSEEK_CHAT_URL, api_key, model)
            .with_system_prompt(ANALYST_SYSTEM_PROMPT)
            .with_temperature(0.3)
            .with_max_tokens(4000)
            .with_timeout(timeout);
        let sentiment = ChatClient::new(http, DEEPSEEK_CHAT_URL, api_key, model)
            .with_system_prompt(SENTIMENT_SYSTEM_PROMPT)
            .with_temperature(0.2)
            .with_max_tokens(300)
            .with_timeout(timeout.min(Duration::from_secs(60)));
        Self {
            analyst,
            sentiment,
            question: question.to_string(),
        }
    }

    /// Full market analysis of `headlines`. `None` when there is nothing to
    /// analyse or the model could not be reached.
    #[instrument(level = "info", skip_all, fields(headlines = headlines.len()))]
    pub async fn analyze_headlines(&self, headlines: &[Headline]) -> Option<MarketAnalysis> {
        if headlines.is_empty() {
            warn!("No headlines available for analysis");
            return None;
        }
        let prompt = analysis_prompt(&headlines_text(headlines, None), &self.question);

        let mut reply = match ask_with_backoff(&self.analyst, &prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Market analysis unavailable");
                return None;
            }
        };

        // Re-ask once when the JSON was cut off by the token limit.
        if let Some(e) = truncated_json(&reply) {
            warn!(error = %e, "EOF while parsing; re-asking once");
            match ask_with_backoff(&self.analyst, &prompt).await {
                Ok(second) => reply = second,
                Err(e2) => warn!(error = %e2, "Re-ask failed; keeping the first reply"),
            }
        }

        let analysis = parse_analysis(&reply);
        match &analysis {
            MarketAnalysis::Structured(_) => info!("Parsed structured market analysis"),
            MarketAnalysis::Raw(text) => warn!(
                preview = %truncate_for_log(text, 200),
                "Could not parse analysis as JSON; keeping raw text"
            ),
        }
        Some(analysis)
    }

    /// Quick sentiment reading over the first ten headlines.
    #[instrument(level = "info", skip_all)]
    pub async fn quick_sentiment(&self, headlines: &[Headline]) -> Option<SentimentSnapshot> {
        if headlines.is_empty() {
            return None;
        }
        let prompt = sentiment_prompt(&headlines_text(headlines, Some(SENTIMENT_HEADLINES)));
        match ask_with_backoff(&self.sentiment, &prompt).await {
            Ok(reply) => {
                let snapshot = parse_sentiment(&reply);
                info!(sentiment = %snapshot.sentiment, score = snapshot.score, "Quick sentiment ready");
                Some(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "Sentiment analysis unavailable");
                None
            }
        }
    }
}
