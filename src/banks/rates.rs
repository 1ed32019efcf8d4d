//! Keyword-anchored policy rate extraction.
//!
//! Each bank has a ranked chain of [`RateRule`]s. A rule looks for its
//! keywords in the lower-cased page text and parses a percentage in a fixed
//! window after each occurrence. When no rule matches, a bare-percentage
//! "last resort" scan accepts the first value under 50.
//!
//! Extraction never fails: anything that goes wrong yields a sentinel.

use super::Bank;
use super::text::flatten;
use crate::error::FetchError;
use crate::http::fetch_text;
use crate::models::BankRate;
use crate::utils::prefix_chars;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

pub const RATE_NOT_FOUND: &str = "Rate not found";
pub const RATE_FETCH_FAILED: &str = "Could not fetch rate";
pub const RATE_FETCH_ERROR: &str = "Error fetching rate";

const DEFAULT_WINDOW: usize = 200;
const MAX_RATE: f64 = 50.0;

static RE_FRACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})-(\d)/(\d)\b").unwrap());
static RE_SINGLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d.])(\d{1,2}(?:\.\d{1,3})?)\s*(?:%|per\s?cent|pct)").unwrap()
});
static RE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:^|[^\d.])(\d{1,2}(?:\.\d{1,3})?)\s*(?:%|per\s?cent)?\s*(?:to|-|–|and)\s*(\d{1,2}(?:\.\d{1,3})?)\s*(?:%|per\s?cent|pct)",
    )
    .unwrap()
});
static RE_LAST_RESORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\d.])(\d{1,2}(?:\.\d{1,2})?)\s?%").unwrap());

/// What a rule parses inside its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// A single percentage, e.g. `"4.50%"`.
    Single,
    /// A target range, e.g. `"4.25%–4.50%"`.
    Range,
}

/// One link of a bank's fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRule {
    /// Lower-case phrases, tried in rank order.
    pub keywords: &'static [&'static str],
    /// Number of characters after the keyword searched for a number.
    pub window: usize,
    pub kind: RuleKind,
}

impl RateRule {
    pub const fn single(keywords: &'static [&'static str]) -> Self {
        Self {
            keywords,
            window: DEFAULT_WINDOW,
            kind: RuleKind::Single,
        }
    }

    pub const fn range(keywords: &'static [&'static str]) -> Self {
        Self {
            keywords,
            window: DEFAULT_WINDOW,
            kind: RuleKind::Range,
        }
    }
}

const GENERIC: RateRule = RateRule::single(&["interest rate"]);

/// The ranked rule chain for a bank code. Unknown codes get the generic rule.
pub fn rule_chain(code: &str) -> Vec<RateRule> {
    let mut chain = match code {
        "fed" => vec![
            RateRule::range(&["target range"]),
            RateRule::range(&["federal funds rate"]),
            RateRule::single(&["federal funds rate"]),
        ],
        "ecb" => vec![RateRule::single(&["deposit facility", "main refinancing operations"])],
        "boe" => vec![RateRule::single(&["bank rate"])],
        "boj" => vec![RateRule::single(&[
            "short-term policy interest rate",
            "policy interest rate",
            "uncollateralized overnight call rate",
        ])],
        "snb" => vec![RateRule::single(&["snb policy rate", "policy rate"])],
        "boc" => vec![RateRule::single(&["policy interest rate", "target for the overnight rate"])],
        "rba" => vec![RateRule::single(&["cash rate target", "cash rate"])],
        "pboc" => vec![RateRule::single(&["loan prime rate", "1-year lpr", "reverse repo"])],
        "rbnz" => vec![RateRule::single(&["official cash rate", "ocr"])],
        _ => Vec::new(),
    };
    chain.push(GENERIC);
    chain
}

/// Extract a rate string from a page, or [`RATE_NOT_FOUND`].
pub fn extract_rate(html: &str, rules: &[RateRule]) -> String {
    let text = normalize_fractions(&flatten(html).to_lowercase());

    for rule in rules {
        if let Some(rate) = apply_rule(&text, rule) {
            debug!(?rule.kind, rate = %rate, "Rate matched by keyword rule");
            return rate;
        }
    }

    match last_resort(&text) {
        Some(rate) => {
            debug!(rate = %rate, "Rate matched by last-resort scan");
            rate
        }
        None => RATE_NOT_FOUND.to_string(),
    }
}

fn apply_rule(text: &str, rule: &RateRule) -> Option<String> {
    for keyword in rule.keywords {
        for (pos, _) in text.match_indices(keyword) {
            let window = prefix_chars(&text[pos + keyword.len()..], rule.window);
            let found = match rule.kind {
                RuleKind::Single => parse_single(window),
                RuleKind::Range => parse_range(window),
            };
            if found.is_some() {
                return found;
            }
        }
    }
    None
}

fn parse_single(window: &str) -> Option<String> {
    RE_SINGLE
        .captures_iter(window)
        .find_map(|caps| plausible(&caps[1]).map(|v| format!("{v}%")))
}

fn parse_range(window: &str) -> Option<String> {
    RE_RANGE.captures_iter(window).find_map(|caps| {
        let low = plausible(&caps[1])?;
        let high = plausible(&caps[2])?;
        let (lo, hi) = (low.parse::<f64>().ok()?, high.parse::<f64>().ok()?);
        (lo <= hi).then(|| format!("{low}%–{high}%"))
    })
}

fn last_resort(text: &str) -> Option<String> {
    RE_LAST_RESORT
        .captures_iter(text)
        .find_map(|caps| plausible(&caps[1]).map(|v| format!("{v}%")))
}

/// Return `raw` if it parses to a value below [`MAX_RATE`].
fn plausible(raw: &str) -> Option<&str> {
    let value: f64 = raw.parse().ok()?;
    (value < MAX_RATE).then_some(raw)
}

/// Rewrite `4-1/4` style fractions as decimals (`4.25`).
fn normalize_fractions(text: &str) -> String {
    RE_FRACTION
        .replace_all(text, |caps: &Captures| {
            let whole: f64 = caps[1].parse().unwrap_or(0.0);
            let num: f64 = caps[2].parse().unwrap_or(0.0);
            let den: f64 = caps[3].parse().unwrap_or(1.0);
            if den == 0.0 {
                return caps[0].to_string();
            }
            format!("{:.2}", whole + num / den)
        })
        .into_owned()
}

/// Fetch and extract the rate for one bank. Never fails.
#[instrument(level = "info", skip_all, fields(bank = %bank.code))]
pub async fn fetch_rate(client: &Client, bank: &Bank) -> BankRate {
    let rate = match fetch_text(client, bank.rate_url).await {
        Ok(html) => extract_rate(&html, &rule_chain(bank.code)),
        Err(FetchError::Status { status, .. }) => {
            warn!(status, url = bank.rate_url, "Rate page returned an error status");
            RATE_FETCH_FAILED.to_string()
        }
        Err(e) => {
            warn!(error = %e, url = bank.rate_url, "Rate page fetch failed");
            RATE_FETCH_ERROR.to_string()
        }
    };
    info!(rate = %rate, "Central bank rate");
    bank.rate_record(rate)
}

/// Fetch rates for every bank, one after another.
#[instrument(level = "info", skip_all)]
pub async fn fetch_rates(client: &Client, banks: &[Bank]) -> Vec<BankRate> {
    let rates: Vec<BankRate> = stream::iter(banks)
        .then(|bank| fetch_rate(client, bank))
        .collect()
        .await;
    let found = rates.iter().filter(|r| r.rate.ends_with('%')).count();
    info!(total = rates.len(), found, "Fetched central bank rates");
    rates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boe_bank_rate() {
        let html = r#"<html><body><nav>Home | About</nav>
            <h2>Current Bank Rate</h2><p class="big">4.25%</p>
            <p>Next due: 7 August 2025</p></body></html>"#;
        assert_eq!(extract_rate(html, &rule_chain("boe")), "4.25%");
    }

    #[test]
    fn test_fed_target_range_with_fractions() {
        let html = "<p>The Committee decided to maintain the target range for the federal funds rate \
                    at 4-1/4 to 4-1/2 percent.</p>";
        assert_eq!(extract_rate(html, &rule_chain("fed")), "4.25%–4.50%");
    }

    #[test]
    fn test_fed_target_range_decimal() {
        let html = "<p>Target range: 5.25% - 5.50%</p>";
        assert_eq!(extract_rate(html, &rule_chain("fed")), "5.25%–5.50%");
    }

    #[test]
    fn test_ecb_deposit_facility_per_cent() {
        let html = "<table><tr><td>Deposit facility</td><td>2.00 per cent</td></tr></table>";
        assert_eq!(extract_rate(html, &rule_chain("ecb")), "2.00%");
    }

    #[test]
    fn test_ranked_keywords_prefer_first() {
        let html = "<p>Cash rate: 3.85%</p><p>Cash rate target 4.10%</p>";
        assert_eq!(extract_rate(html, &rule_chain("rba")), "4.10%");
    }

    #[test]
    fn test_keyword_outside_window_is_ignored() {
        let filler = "x".repeat(300);
        let html = format!("<p>Official cash rate {filler} 3.25%</p>");
        // Falls through to the last-resort scan, which still finds the number.
        assert_eq!(extract_rate(&html, &rule_chain("rbnz")), "3.25%");
    }

    #[test]
    fn test_last_resort_skips_large_values() {
        let html = "<p>Unemployment fell. Stocks rose 75% this decade, inflation ran at 2.4%.</p>";
        assert_eq!(extract_rate(html, &rule_chain("snb")), "2.4%");
    }

    #[test]
    fn test_rate_not_found_sentinel() {
        let html = "<p>No numbers on this page at all.</p>";
        assert_eq!(extract_rate(html, &rule_chain("boj")), RATE_NOT_FOUND);
    }

    #[test]
    fn test_year_is_not_a_rate() {
        let html = "<p>Policy rate decision of 2025 % announced</p><p>policy rate 0.50%</p>";
        assert_eq!(extract_rate(html, &rule_chain("snb")), "0.50%");
    }

    #[test]
    fn test_every_chain_ends_with_generic_rule() {
        for code in ["fed", "ecb", "boe", "boj", "snb", "boc", "rba", "pboc", "rbnz", "other"] {
            assert_eq!(rule_chain(code).last(), Some(&GENERIC));
        }
    }

    #[test]
    fn test_normalize_fractions() {
        assert_eq!(normalize_fractions("4-3/4 percent"), "4.75 percent");
        assert_eq!(normalize_fractions("2025-1/2"), "2025-1/2");
    }
}
