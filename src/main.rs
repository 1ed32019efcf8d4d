//! # Finance Frontpage
//!
//! Builds a static financial news dashboard: headlines from news APIs, RSS
//! feeds and LLM-assisted homepage extraction, central-bank rates and
//! policy statements scraped from the banks' own pages, static economic
//! indicators and forex quotes, and optional LLM market commentary.
//!
//! ## Features
//!
//! - Headline collection from NewsAPI, GNews, Marketaux, FMP, RSS feeds and
//!   financial homepages, deduplicated and capped
//! - Keyword-anchored rate extraction with per-bank rule chains
//! - Policy summaries with boilerplate filtering
//! - An image for every headline: page metadata, then DOM heuristics, then
//!   AI generation, then a procedurally drawn placeholder
//! - Static `index.html` with its stylesheet and script, plus
//!   `sitemap.xml`, `robots.txt` and `structured-data.json`
//!
//! ## Usage
//!
//! ```sh
//! finance_frontpage -o ./site
//! finance_frontpage --test-mode -o ./site
//! ```
//!
//! ## Architecture
//!
//! A single sequential pass:
//! 1. **Headlines**: query every configured source, dedupe, cap
//! 2. **Images**: resolve one image per headline
//! 3. **Banks**: fetch rates, then policy statements
//! 4. **Market**: static indicators and quotes, optional LLM analysis
//! 5. **Output**: render, minify and write the page and SEO files

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod api;
mod banks;
mod cli;
mod config;
mod error;
mod fixtures;
mod http;
mod images;
mod market;
mod models;
mod outputs;
mod scrapers;
mod utils;

use api::{ChatClient, OPENAI_CHAT_URL};
use banks::BANKS;
use cli::Cli;
use config::SiteConfig;
use images::ImageResolver;
use images::ai::ImageGenerator;
use models::FrontPage;
use outputs::{html, seo};
use scrapers::SourceKeys;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("finance_frontpage starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(output_dir = %args.output_dir, test_mode = args.test_mode, config = ?args.config, "Parsed CLI arguments");

    let mut cfg = SiteConfig::load(args.config.as_deref())?;
    if let Some(max) = args.max_headlines {
        cfg.max_headlines = max;
    }

    // Early check: ensure output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // Templates are compiled up front so a broken override fails before any fetching
    let tera = html::build_tera(args.templates_dir.as_deref())?;
    let client = http::build_client(cfg.request_timeout_secs)?;

    let page = if args.test_mode {
        info!("Test mode: using canned data, no network access");
        canned_page(&args, &cfg, &client).await
    } else {
        live_page(&args, &cfg, &client).await
    };
    info!(
        news = page.news.len(),
        rates = page.rates.len(),
        policies = page.policies.len(),
        analysis = page.analysis.is_some(),
        "FrontPage assembled"
    );

    // ---- Render ----
    let meta_tags = seo::meta_tags(&cfg, &page.news);
    let structured_data = seo::structured_data(&cfg, &page.news, &page.last_updated);
    let rendered = html::render_page(&tera, &cfg, &page, &meta_tags, &structured_data, Utc::now().timestamp())?;
    let minified = html::minify_html(&rendered);
    debug!(raw = rendered.len(), minified = minified.len(), "Minified page");
    html::write_index(&minified, &args.output_dir).await?;
    outputs::assets::write_assets(&args.output_dir).await?;

    // ---- SEO sidecars ----
    if let Err(e) = outputs::write_seo_files(&cfg, &structured_data, &args.output_dir).await {
        error!(error = %e, "Failed to write SEO files");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

fn last_updated() -> String {
    Utc::now().format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Gather everything from the network. Remote failures degrade to
/// sentinels and never abort the run.
#[instrument(level = "info", skip_all)]
async fn live_page(args: &Cli, cfg: &SiteConfig, client: &reqwest::Client) -> FrontPage {
    let llm_timeout = Duration::from_secs(cfg.llm_timeout_secs);
    let openai_key = args.openai_api_key.as_deref().filter(|k| !k.trim().is_empty());

    // ---- Headlines ----
    let homepage_llm = openai_key
        .map(|key| ChatClient::new(client.clone(), OPENAI_CHAT_URL, key, &cfg.openai_model).with_timeout(llm_timeout));
    let keys = SourceKeys {
        newsapi: args.newsapi_api_key.clone(),
        gnews: args.gnews_api_key.clone(),
        marketaux: args.marketaux_api_key.clone(),
        fmp: args.fmp_api_key.clone(),
    };
    let mut news = scrapers::collect_headlines(client, cfg, &keys, homepage_llm.as_ref()).await;
    if news.is_empty() {
        warn!("No headlines from any source; falling back to source homepages");
        news = scrapers::fallback_headlines(&cfg.homepages);
    }

    // ---- Images ----
    let generator = openai_key.map(|key| ImageGenerator::new(client.clone(), key, &cfg.openai_image_model, llm_timeout));
    if generator.is_none() {
        info!("No OpenAI key configured; AI images disabled");
    }
    ImageResolver::new(client.clone(), &args.output_dir, cfg.max_dynamic_images)
        .with_generator(generator)
        .attach_images(&mut news)
        .await;

    // ---- Central banks ----
    let rates = banks::rates::fetch_rates(client, BANKS).await;
    let policies = if args.skip_policies {
        info!("Skipping policy statements");
        Vec::new()
    } else {
        banks::policies::fetch_policies(client, BANKS).await
    };

    // ---- Market analysis ----
    let deepseek_key = args.deepseek_api_key.as_deref().filter(|k| !k.trim().is_empty());
    let (analysis, sentiment) = match deepseek_key {
        _ if args.skip_analysis => {
            info!("Skipping market analysis");
            (None, None)
        }
        None => {
            info!("No DeepSeek key configured; market analysis disabled");
            (None, None)
        }
        Some(key) => {
            let expert = analysis::FinancialExpert::new(
                client.clone(),
                key,
                &cfg.deepseek_model,
                &cfg.analysis_question,
                llm_timeout,
            );
            let analysis = expert.analyze_headlines(&news).await;
            let sentiment = expert.quick_sentiment(&news).await;
            (analysis, sentiment)
        }
    };

    FrontPage {
        last_updated: last_updated(),
        news,
        rates,
        policies,
        econ: market::economic_indicators(),
        forex: market::forex_quotes(),
        analysis,
        sentiment,
    }
}

/// Canned data with placeholder images; nothing leaves the machine.
#[instrument(level = "info", skip_all)]
async fn canned_page(args: &Cli, cfg: &SiteConfig, client: &reqwest::Client) -> FrontPage {
    let mut news = fixtures::headlines();
    news.truncate(cfg.max_headlines.max(1));

    ImageResolver::new(client.clone(), &args.output_dir, cfg.max_dynamic_images)
        .offline(true)
        .attach_images(&mut news)
        .await;

    let policies = if args.skip_policies { Vec::new() } else { fixtures::policies() };
    let sentiment = (!args.skip_analysis).then(fixtures::sentiment);

    FrontPage {
        last_updated: last_updated(),
        news,
        rates: fixtures::rates(),
        policies,
        econ: market::economic_indicators(),
        forex: market::forex_quotes(),
        analysis: None,
        sentiment,
    }
}
