//! Economic indicators and forex quotes shown on the dashboard.
//!
//! These are static records; there is no live market-data feed.

use crate::models::{EconomicIndicator, ForexQuote};
use tracing::debug;

pub fn economic_indicators() -> Vec<EconomicIndicator> {
    let indicators = vec![
        EconomicIndicator {
            event: "US Nonfarm Payrolls".to_string(),
            value: "+250K".to_string(),
            date: "2025-05-20".to_string(),
            numeric_value: 250.0,
            max_value: 500.0,
            unit: "K".to_string(),
            sentiment: "positive".to_string(),
        },
        EconomicIndicator {
            event: "Eurozone CPI".to_string(),
            value: "2.1% YoY".to_string(),
            date: "2025-05-19".to_string(),
            numeric_value: 2.1,
            max_value: 5.0,
            unit: "%".to_string(),
            sentiment: "neutral".to_string(),
        },
    ];
    debug!(count = indicators.len(), "Loaded economic indicators");
    indicators
}

pub fn forex_quotes() -> Vec<ForexQuote> {
    vec![
        ForexQuote {
            pair: "EUR/USD".to_string(),
            bid: 1.0850,
            ask: 1.0852,
            change: -0.0002,
        },
        ForexQuote {
            pair: "USD/JPY".to_string(),
            bid: 155.20,
            ask: 155.23,
            change: 0.05,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_progress() {
        let econ = economic_indicators();
        assert_eq!(econ.len(), 2);
        assert!((econ[0].progress_percent() - 50.0).abs() < 1e-9);
        assert!((econ[1].progress_percent() - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_forex_directions() {
        let fx = forex_quotes();
        assert_eq!(fx[0].direction(), "down");
        assert_eq!(fx[1].direction(), "up");
        assert!(fx.iter().all(|q| q.spread() > 0.0));
    }
}
