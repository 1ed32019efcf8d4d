//! Command-line interface definitions.
//!
//! All API keys can be provided as flags or through the environment
//! variables named below; a missing key simply disables that integration.

use clap::Parser;

/// Command-line arguments for the front page generator.
///
/// # Examples
///
/// ```sh
/// # Offline run with canned data
/// finance_frontpage --test-mode -o ./site
///
/// # Live run with a custom site definition
/// NEWSAPI_API_KEY=... finance_frontpage -o ./site -c site.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Use canned data instead of touching the network
    #[arg(long)]
    pub test_mode: bool,

    /// Directory that receives index.html, the SEO files and static/images
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    /// Optional path to a YAML site configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory with base.html/index.html overriding the built-in templates
    #[arg(long)]
    pub templates_dir: Option<String>,

    /// Maximum number of headlines on the page (overrides the config file)
    #[arg(long)]
    pub max_headlines: Option<usize>,

    /// Skip fetching central-bank policy statements
    #[arg(long)]
    pub skip_policies: bool,

    /// Skip the LLM market analysis
    #[arg(long)]
    pub skip_analysis: bool,

    /// OpenAI API key (homepage headline extraction, AI images)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// DeepSeek API key (market analysis)
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub deepseek_api_key: Option<String>,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_API_KEY", hide_env_values = true)]
    pub newsapi_api_key: Option<String>,

    /// Financial Modeling Prep key
    #[arg(long, env = "FMP_API_KEY", hide_env_values = true)]
    pub fmp_api_key: Option<String>,

    /// Marketaux key
    #[arg(long, env = "MARKETAUX_API_KEY", hide_env_values = true)]
    pub marketaux_api_key: Option<String>,

    /// GNews key
    #[arg(long, env = "GNEWS_API_KEY", hide_env_values = true)]
    pub gnews_api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["finance_frontpage"]);
        assert!(!cli.test_mode);
        assert_eq!(cli.output_dir, ".");
        assert!(cli.config.is_none());
        assert!(cli.max_headlines.is_none());
    }

    #[test]
    fn test_cli_test_mode_and_output() {
        let cli = Cli::parse_from([
            "finance_frontpage",
            "--test-mode",
            "-o",
            "/tmp/site",
            "--max-headlines",
            "5",
            "--skip-policies",
        ]);
        assert!(cli.test_mode);
        assert!(cli.skip_policies);
        assert_eq!(cli.output_dir, "/tmp/site");
        assert_eq!(cli.max_headlines, Some(5));
    }

    #[test]
    fn test_cli_api_key_flag() {
        let cli = Cli::parse_from(["finance_frontpage", "--gnews-api-key", "abc"]);
        assert_eq!(cli.gnews_api_key.as_deref(), Some("abc"));
    }
}
