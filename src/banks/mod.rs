//! Central-bank rate and policy extraction.
//!
//! # Supported Banks
//!
//! | Bank | Code |
//! |------|------|
//! | Federal Reserve | `fed` |
//! | European Central Bank | `ecb` |
//! | Bank of England | `boe` |
//! | Bank of Japan | `boj` |
//! | Swiss National Bank | `snb` |
//! | Bank of Canada | `boc` |
//! | Reserve Bank of Australia | `rba` |
//! | People's Bank of China | `pboc` |
//! | Reserve Bank of New Zealand | `rbnz` |
//!
//! Each bank has two pages: one carrying the current policy rate, read by
//! [`rates`], and one carrying policy statements, read by [`policies`].
//! Both extractors substitute sentinel strings on failure, so the output
//! always holds one record per bank.

pub mod policies;
pub mod rates;
pub mod text;

use crate::models::{BankPolicy, BankRate};

/// A central bank and the pages scraped for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Bank {
    pub name: &'static str,
    pub code: &'static str,
    pub rate_url: &'static str,
    pub policy_url: &'static str,
}

impl Bank {
    pub fn rate_record(&self, rate: String) -> BankRate {
        BankRate {
            bank: self.name.to_string(),
            code: self.code.to_string(),
            rate,
            url: self.rate_url.to_string(),
        }
    }

    pub fn policy_record(&self, policy: String) -> BankPolicy {
        BankPolicy {
            bank: self.name.to_string(),
            code: self.code.to_string(),
            policy,
            url: self.policy_url.to_string(),
        }
    }
}

/// The nine central banks shown on the page, in display order.
pub const BANKS: &[Bank] = &[
    Bank {
        name: "Federal Reserve",
        code: "fed",
        rate_url: "https://www.federalreserve.gov/monetarypolicy/openmarket.htm",
        policy_url: "https://www.federalreserve.gov/monetarypolicy.htm",
    },
    Bank {
        name: "European Central Bank",
        code: "ecb",
        rate_url: "https://www.ecb.europa.eu/stats/policy_and_exchange_rates/key_ecb_interest_rates/html/index.en.html",
        policy_url: "https://www.ecb.europa.eu/press/pr/date/latest/html/index.en.html",
    },
    Bank {
        name: "Bank of England",
        code: "boe",
        rate_url: "https://www.bankofengland.co.uk/boeapps/database/Bank-Rate.asp",
        policy_url: "https://www.bankofengland.co.uk/monetary-policy-summary-and-minutes",
    },
    Bank {
        name: "Bank of Japan",
        code: "boj",
        rate_url: "https://www.boj.or.jp/en/statistics/boj/other/interest/index.htm/",
        policy_url: "https://www.boj.or.jp/en/mopo/mpmdeci/index.htm/",
    },
    Bank {
        name: "Swiss National Bank",
        code: "snb",
        rate_url: "https://www.snb.ch/en/iabout/stat/statpub/zirefi/id/statpub_zirefi_hist",
        policy_url: "https://www.snb.ch/en/iabout/stat/statpub/zirefi/id/statpub_zirefi_hist",
    },
    Bank {
        name: "Bank of Canada",
        code: "boc",
        rate_url: "https://www.bankofcanada.ca/rates/interest-rates/canadian-interest-rates/",
        policy_url: "https://www.bankofcanada.ca/press/press-releases/",
    },
    Bank {
        name: "Reserve Bank of Australia",
        code: "rba",
        rate_url: "https://www.rba.gov.au/statistics/cash-rate/",
        policy_url: "https://www.rba.gov.au/media-releases/",
    },
    Bank {
        name: "People's Bank of China",
        code: "pboc",
        rate_url: "http://www.pbc.gov.cn/en/3688229/index.html",
        policy_url: "http://www.pbc.gov.cn/english/130721/index.html",
    },
    Bank {
        name: "Reserve Bank of New Zealand",
        code: "rbnz",
        rate_url: "https://www.rbnz.govt.nz/monetary-policy/official-cash-rate",
        policy_url: "https://www.rbnz.govt.nz/news",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_has_nine_unique_banks() {
        assert_eq!(BANKS.len(), 9);
        let codes: HashSet<_> = BANKS.iter().map(|b| b.code).collect();
        assert_eq!(codes.len(), 9);
    }

    #[test]
    fn test_every_bank_has_a_specific_rule_chain() {
        for bank in BANKS {
            assert!(rates::rule_chain(bank.code).len() >= 2, "{} has no specific rules", bank.code);
        }
    }

    #[test]
    fn test_records_carry_bank_identity() {
        let rate = BANKS[2].rate_record("4.25%".to_string());
        assert_eq!(rate.bank, "Bank of England");
        assert_eq!(rate.code, "boe");
        let policy = BANKS[2].policy_record("Held.".to_string());
        assert_eq!(policy.url, BANKS[2].policy_url);
    }
}
