//! Synthetic NAV histories for offline use.
//!
//! Each fund is a geometric random walk over business days with a
//! fund-specific drift and volatility. Output mimics the live feed: dates as
//! `DD-MM-YYYY` text, newest first, NAV as a decimal string, and a listing that
//! contains the same kinds of noisy names the feed does.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::NavSource;
use crate::domain::{FundHistory, FundIdentity, FundMeta, RawNavRecord};
use crate::error::AppError;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Catalogue entry: code, raw (noisy) name, category, annual drift, annual volatility, starting NAV.
struct SampleFund {
    code: &'static str,
    name: &'static str,
    category: &'static str,
    drift: f64,
    vol: f64,
    start_nav: f64,
}

const CATALOGUE: &[SampleFund] = &[
    SampleFund {
        code: "900001",
        name: "as Axis Bluechip Fund - Direct Growth",
        category: "Equity Scheme - Large Cap Fund",
        drift: 0.11,
        vol: 0.16,
        start_nav: 42.5,
    },
    SampleFund {
        code: "900002",
        name: "Nippon India Small Cap Scheme - Growth",
        category: "Equity Scheme - Small Cap Fund",
        drift: 0.18,
        vol: 0.26,
        start_nav: 88.0,
    },
    SampleFund {
        code: "900003",
        name: "HDFC Liquid Fund - Direct Growth",
        category: "Debt Scheme - Liquid Fund",
        drift: 0.065,
        vol: 0.004,
        start_nav: 4210.0,
    },
    SampleFund {
        code: "900004",
        name: "name Parag Parikh Flexi Cap Fund",
        category: "Equity Scheme - Flexi Cap Fund",
        drift: 0.15,
        vol: 0.14,
        start_nav: 55.2,
    },
    SampleFund {
        code: "900005",
        name: "ICICI Prudential Gilt Fund",
        category: "Debt Scheme - Gilt Fund",
        drift: 0.072,
        vol: 0.035,
        start_nav: 93.1,
    },
    SampleFund {
        code: "900099",
        name: "Name",
        category: "",
        drift: 0.0,
        vol: 0.0,
        start_nav: 10.0,
    },
];

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone)]
pub struct SampleSource {
    seed: u64,
    end: NaiveDate,
    business_days: usize,
}

impl SampleSource {
    /// `business_days` observations ending at `end` (weekends skipped).
    pub fn new(seed: u64, end: NaiveDate, business_days: usize) -> Self {
        Self {
            seed,
            end,
            business_days,
        }
    }

    fn lookup(code: &str) -> Option<&'static SampleFund> {
        CATALOGUE.iter().find(|f| f.code == code)
    }

    /// FNV-1a over the code bytes, starting from the source seed.
    ///
    /// Fixed arithmetic, so a seed gives the same paths on every toolchain.
    fn fund_seed(&self, code: &str) -> u64 {
        code.bytes().fold(self.seed ^ FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME))
    }
}

impl NavSource for SampleSource {
    fn name(&self) -> &str {
        "sample"
    }

    fn list_funds(&self) -> Result<Vec<FundIdentity>, AppError> {
        Ok(CATALOGUE
            .iter()
            .map(|f| FundIdentity::new(f.code, f.name))
            .collect())
    }

    fn fetch_history(&self, code: &str) -> Result<FundHistory, AppError> {
        let fund = Self::lookup(code.trim())
            .ok_or_else(|| AppError::new(2, format!("Unknown sample fund code '{code}'.")))?;

        let dates = business_days_back(self.end, self.business_days);
        let navs = random_walk(
            fund.start_nav,
            fund.drift,
            fund.vol,
            dates.len(),
            self.fund_seed(fund.code),
        )?;

        // Newest first, like the live feed.
        let data = dates
            .iter()
            .zip(navs.iter())
            .rev()
            .map(|(d, nav)| RawNavRecord::new(d.format("%d-%m-%Y").to_string(), format!("{nav:.4}").as_str()))
            .collect();

        Ok(FundHistory {
            fund: FundIdentity::new(fund.code, fund.name),
            meta: Some(FundMeta {
                fund_house: Some("Sample AMC".to_string()),
                scheme_type: Some("Open Ended Schemes".to_string()),
                scheme_category: Some(fund.category.to_string()).filter(|c| !c.is_empty()),
                scheme_code: Some(fund.code.to_string()),
                scheme_name: Some(fund.name.to_string()),
            }),
            data,
        })
    }
}

/// The last `n` weekdays up to and including `end`, oldest first.
fn business_days_back(end: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut day = end;
    while out.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
        day -= Duration::days(1);
    }
    out.reverse();
    out
}

/// Geometric random walk with daily log-returns `N(mu_d, sigma_d)`.
fn random_walk(start: f64, drift: f64, vol: f64, n: usize, seed: u64) -> Result<Vec<f64>, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let sigma_d = vol / TRADING_DAYS_PER_YEAR.sqrt();
    let mu_d = drift / TRADING_DAYS_PER_YEAR - 0.5 * sigma_d * sigma_d;
    let normal = Normal::new(mu_d, sigma_d)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut out = Vec::with_capacity(n);
    let mut nav = start;
    for _ in 0..n {
        out.push(nav);
        nav *= normal.sample(&mut rng).exp();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{sort_ascending, validate};

    fn source() -> SampleSource {
        SampleSource::new(7, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), 30)
    }

    #[test]
    fn business_days_skip_weekends() {
        // 2024-03-15 is a Friday.
        let days = business_days_back(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), 6);
        assert_eq!(days.first(), NaiveDate::from_ymd_opt(2024, 3, 8).as_ref());
        assert_eq!(days.last(), NaiveDate::from_ymd_opt(2024, 3, 15).as_ref());
        assert!(days.iter().all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn history_is_deterministic_newest_first_and_valid() {
        let a = source().fetch_history("900001").unwrap();
        let b = source().fetch_history("900001").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.data.len(), 30);
        assert_eq!(a.data[0].date, "15-03-2024");

        let validated = validate(&a.data);
        assert!(validated.rejected.is_empty());
        let sorted = sort_ascending(&validated.records);
        assert_eq!(sorted.last().map(|r| r.date()), Some("15-03-2024"));
    }

    #[test]
    fn different_funds_get_different_paths() {
        let a = source().fetch_history("900001").unwrap();
        let b = source().fetch_history("900004").unwrap();
        assert_ne!(a.data[5].nav, b.data[5].nav);
    }

    #[test]
    fn fund_seeds_are_pinned() {
        let at = |seed| SampleSource::new(seed, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 10);
        assert_eq!(at(0).fund_seed(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(at(0).fund_seed("a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(at(42).fund_seed("900001"), 0x3fae_7bc2_5fce_2649);
        assert_ne!(at(43).fund_seed("900001"), at(42).fund_seed("900001"));
    }

    #[test]
    fn unknown_code_is_a_usage_error() {
        assert_eq!(source().fetch_history("nope").unwrap_err().exit_code(), 2);
    }

    #[test]
    fn listing_contains_feed_noise() {
        let funds = source().list_funds().unwrap();
        assert!(funds.iter().any(|f| f.name == "Name"));
        assert!(funds.iter().any(|f| f.name.starts_with("as ")));
    }
}
