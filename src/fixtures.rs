//! Canned data for `--test-mode` runs, which make no network requests.

use crate::banks::BANKS;
use crate::models::{BankPolicy, BankRate, Headline, SentimentSnapshot};

const HEADLINES: &[(&str, &str, &str)] = &[
    (
        "Stocks close higher as Treasury yields ease ahead of Fed minutes",
        "https://www.cnbc.com/test/stocks-close-higher.html",
        "CNBC",
    ),
    (
        "Dollar slips against the yen after softer US retail sales",
        "https://www.marketwatch.com/test/dollar-slips",
        "MarketWatch",
    ),
    (
        "ECB officials signal patience on further rate cuts",
        "https://finance.yahoo.com/test/ecb-patience",
        "Yahoo Finance",
    ),
    (
        "Oil falls for a third day as inventories build",
        "https://www.reuters.com/test/oil-falls",
        "Reuters",
    ),
    (
        "Gold holds near record as central banks keep buying",
        "https://www.bloomberg.com/test/gold-record",
        "Bloomberg",
    ),
    (
        "Tech earnings beat estimates, lifting the Nasdaq",
        "https://www.cnbc.com/test/tech-earnings.html",
        "CNBC",
    ),
];

const RATES: &[(&str, &str)] = &[
    ("fed", "4.25%–4.50%"),
    ("ecb", "2.25%"),
    ("boe", "4.25%"),
    ("boj", "0.5%"),
    ("snb", "0.25%"),
    ("boc", "2.75%"),
    ("rba", "3.85%"),
    ("pboc", "3.0%"),
    ("rbnz", "3.25%"),
];

pub fn headlines() -> Vec<Headline> {
    HEADLINES
        .iter()
        .map(|(text, url, source)| Headline::new(*text, *url).with_source(*source))
        .collect()
}

/// One canned rate per registered bank.
pub fn rates() -> Vec<BankRate> {
    BANKS
        .iter()
        .map(|bank| {
            let rate = RATES
                .iter()
                .find(|(code, _)| *code == bank.code)
                .map(|(_, rate)| rate.to_string())
                .unwrap_or_else(|| crate::banks::rates::RATE_NOT_FOUND.to_string());
            bank.rate_record(rate)
        })
        .collect()
}

/// One canned policy summary per registered bank.
pub fn policies() -> Vec<BankPolicy> {
    BANKS
        .iter()
        .map(|bank| {
            bank.policy_record(format!(
                "The {} left its monetary policy stance unchanged at its latest meeting. \
                 The committee will continue to assess the inflation outlook and incoming data.",
                bank.name
            ))
        })
        .collect()
}

pub fn sentiment() -> SentimentSnapshot {
    SentimentSnapshot {
        sentiment: "neutral".to_string(),
        score: 55,
        summary: "Markets are steady as investors weigh easing yields against central bank caution.".to_string(),
    }
}
