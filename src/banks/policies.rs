//! Policy statement summaries for central banks.
//!
//! Pages are segmented into paragraphs, navigation and footer boilerplate is
//! filtered out, paragraphs mentioning monetary-policy phrases are kept (with
//! a short lookahead for banks whose statements span several paragraphs),
//! and the first few substantial sentences become the summary.

use super::Bank;
use super::text::{lines, paragraphs, sentences, strip_markup};
use crate::error::FetchError;
use crate::http::fetch_text;
use crate::models::BankPolicy;
use crate::utils::truncate_with_ellipsis;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

pub const POLICY_NOT_FOUND: &str = "Relevant policy information not found after filtering.";
pub const POLICY_PROCESSING_ERROR: &str = "Error processing policy data.";

const POLICY_KEYWORDS: &[&str] = &[
    "monetary policy",
    "interest rate decision",
    "policy statement",
    "inflation outlook",
    "economic projections",
    "rate decision",
    "policy committee",
    "central bank statement",
];

const PBOC_REPORT_KEYWORDS: &[&str] = &["monetary policy report", "policy release", "pbc news"];

const BOILERPLATE_KEYWORDS: &[&str] = &[
    "copyright", "contact us", "terms of use", "privacy policy", "terms of service",
    "skip to main content", "official website", "toggle navigation", "go to main content",
    "accessibility", "sitemap", "search", "menu", "home", "about us", "careers",
    "all rights reserved", "last updated", "share this page", "print this page",
    "media releases", "press releases", "publications", "news", "events", "videos",
    "related links", "follow us", "subscribe", "sign up", "log in", "register",
    "feedback", "help", "faq", "glossary", "archive", "archives", "download", "pdf",
    "disclaimer", "legal", "notices", "site map", "related topics", "more information",
    "key topics", "useful links", "language selection", "choose language", "español", "français",
];

/// Banks whose pages are segmented by single newlines when blank lines are scarce.
const LINE_SPLIT_BANKS: &[&str] = &["boc", "boj"];
/// Banks whose statements continue past the keyword paragraph.
const LOOKAHEAD_BANKS: &[&str] = &["boc", "boj", "pboc", "rba"];

const MIN_PARAGRAPH_CHARS: usize = 25;
const MIN_LOOKAHEAD_CHARS: usize = 50;
const SHORT_BOILERPLATE_CHARS: usize = 250;
const SENTENCE_TARGET: usize = 3;
const MIN_FOLLOWUP_SENTENCE_CHARS: usize = 20;
const SOFT_CHAR_LIMIT: usize = 200;
const HARD_CHAR_LIMIT: usize = 450;
const MAX_SUMMARY_CHARS: usize = 500;

/// A paragraph is boilerplate if it has one boilerplate phrase and is short,
/// or has two or more phrases regardless of length.
pub fn is_boilerplate(paragraph: &str) -> bool {
    let lower = paragraph.to_lowercase();
    let hits = BOILERPLATE_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();
    (hits > 0 && paragraph.chars().count() < SHORT_BOILERPLATE_CHARS) || hits >= 2
}

fn has_policy_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    POLICY_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn is_relevant(paragraph: &str, code: &str) -> bool {
    if is_boilerplate(paragraph) || paragraph.chars().count() < MIN_PARAGRAPH_CHARS {
        return false;
    }
    let pboc_report = code == "pboc" && {
        let lower = paragraph.to_lowercase();
        PBOC_REPORT_KEYWORDS.iter().any(|kw| lower.contains(kw))
    };
    has_policy_keyword(paragraph) || pboc_report
}

fn segment(html: &str, code: &str) -> Vec<String> {
    let text = strip_markup(html);
    let mut paras = paragraphs(&text);
    if LINE_SPLIT_BANKS.contains(&code) && paras.len() < 10 {
        let by_line = lines(&text);
        if by_line.len() > paras.len() {
            debug!(code, before = paras.len(), after = by_line.len(), "Using single-newline split");
            paras = by_line;
        }
    }
    paras
}

/// Collect relevant paragraphs, plus lookahead paragraphs for banks that need it.
fn collect_relevant(paras: &[String], code: &str) -> Vec<String> {
    let relevant: Vec<usize> = paras
        .iter()
        .enumerate()
        .filter(|(_, p)| is_relevant(p, code))
        .map(|(i, _)| i)
        .collect();

    let mut collected = Vec::new();
    for &idx in &relevant {
        collected.push(paras[idx].clone());
        if !LOOKAHEAD_BANKS.contains(&code) {
            continue;
        }
        for next in idx + 1..=idx + 2 {
            if next >= paras.len() || relevant.contains(&next) {
                break;
            }
            let candidate = &paras[next];
            if is_boilerplate(candidate) || candidate.chars().count() <= MIN_LOOKAHEAD_CHARS {
                break;
            }
            collected.push(candidate.clone());
        }
    }
    collected.into_iter().unique().collect()
}

/// Pick up to three substantial sentences, preferring policy sentences.
fn summarize(paragraphs: &[String]) -> String {
    let joined = paragraphs.join(" ");
    let mut picked: Vec<String> = Vec::new();
    let mut char_count = 0usize;

    for sentence in sentences(&joined) {
        let len = sentence.chars().count();
        if len < MIN_FOLLOWUP_SENTENCE_CHARS && !picked.is_empty() {
            continue;
        }
        if has_policy_keyword(&sentence) || picked.len() < SENTENCE_TARGET {
            char_count += len + 1;
            picked.push(sentence);
            if picked.len() >= SENTENCE_TARGET && char_count > SOFT_CHAR_LIMIT {
                break;
            }
            if char_count > HARD_CHAR_LIMIT {
                break;
            }
        }
    }

    truncate_with_ellipsis(&picked.join(" "), MAX_SUMMARY_CHARS)
}

/// Extract a policy summary from a page, or [`POLICY_NOT_FOUND`].
pub fn extract_policy(html: &str, code: &str) -> String {
    let paras = segment(html, code);
    let relevant = collect_relevant(&paras, code);
    debug!(code, paragraphs = paras.len(), relevant = relevant.len(), "Segmented policy page");
    let summary = summarize(&relevant);
    if summary.is_empty() {
        POLICY_NOT_FOUND.to_string()
    } else {
        summary
    }
}

/// Fetch and summarize the policy page for one bank. Never fails.
#[instrument(level = "info", skip_all, fields(bank = %bank.code))]
pub async fn fetch_policy(client: &Client, bank: &Bank) -> BankPolicy {
    let policy = match fetch_text(client, bank.policy_url).await {
        Ok(html) => extract_policy(&html, bank.code),
        Err(e @ (FetchError::Transport(_) | FetchError::Status { .. })) => {
            warn!(error = %e, url = bank.policy_url, "Policy page fetch failed");
            format!("Could not fetch policy: Request error ({}).", e.kind())
        }
        Err(e) => {
            warn!(error = %e, url = bank.policy_url, "Policy page processing failed");
            POLICY_PROCESSING_ERROR.to_string()
        }
    };
    bank.policy_record(policy)
}

/// Fetch policy summaries for every bank, one after another.
#[instrument(level = "info", skip_all)]
pub async fn fetch_policies(client: &Client, banks: &[Bank]) -> Vec<BankPolicy> {
    let policies: Vec<BankPolicy> = stream::iter(banks)
        .then(|bank| fetch_policy(client, bank))
        .collect()
        .await;
    let found = policies
        .iter()
        .filter(|p| p.policy != POLICY_NOT_FOUND && !p.policy.starts_with("Could not"))
        .count();
    info!(total = policies.len(), found, "Fetched central bank policies");
    policies
}
