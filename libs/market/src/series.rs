use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{FetchError, Symbol};

/// Lookback window for a historical chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days(u32),
    Months(u32),
    Year,
}

const NAMED_EQUITY_PERIODS: &[(&str, Period)] = &[
    ("1mo", Period::Months(1)),
    ("3mo", Period::Months(3)),
    ("6mo", Period::Months(6)),
    ("1y", Period::Year),
];

impl Period {
    /// `<n>d` with `n >= 1`.
    pub fn parse_days(raw: &str) -> Option<Self> {
        let digits = raw.trim().to_lowercase();
        let digits = digits.strip_suffix('d')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match digits.parse::<u32>() {
            Ok(n) if n > 0 => Some(Period::Days(n)),
            _ => None,
        }
    }

    /// Crypto history is only addressable in whole days.
    pub fn parse_crypto(raw: &str) -> Option<Self> {
        Self::parse_days(raw)
    }

    /// `<n>d` or one of `1d`, `5d`, `1mo`, `3mo`, `6mo`, `1y`.
    pub fn parse_equity(raw: &str) -> Option<Self> {
        if let Some(days) = Self::parse_days(raw) {
            return Some(days);
        }
        let raw = raw.trim().to_lowercase();
        NAMED_EQUITY_PERIODS
            .iter()
            .find(|(name, _)| *name == raw)
            .map(|(_, period)| *period)
    }

    pub fn parse_for(symbol: &Symbol, raw: &str) -> Option<Self> {
        match symbol {
            Symbol::Crypto(_) => Self::parse_crypto(raw),
            Symbol::Equity(_) => Self::parse_equity(raw),
        }
    }

    /// Approximate length in days, for upstreams that only take a day count.
    pub fn days(&self) -> u32 {
        match self {
            Period::Days(n) => *n,
            Period::Months(n) => n * 30,
            Period::Year => 365,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{n}d"),
            Period::Months(n) => write!(f, "{n}mo"),
            Period::Year => f.write_str("1y"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub time: DateTime<Utc>,
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn labels(&self, fmt: &str) -> Vec<String> {
        self.points
            .iter()
            .map(|p| p.time.format(fmt).to_string())
            .collect()
    }
}

/// Historical close prices for one upstream.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn history(&self, symbol: &Symbol, period: Period) -> Result<Series, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_accepts_only_days() {
        assert_eq!(Period::parse_crypto("7d"), Some(Period::Days(7)));
        assert_eq!(Period::parse_crypto("30D"), Some(Period::Days(30)));
        assert_eq!(Period::parse_crypto("1mo"), None);
        assert_eq!(Period::parse_crypto("1y"), None);
        assert_eq!(Period::parse_crypto("0d"), None);
        assert_eq!(Period::parse_crypto("+7d"), None);
        assert_eq!(Period::parse_crypto("d"), None);
        assert_eq!(Period::parse_crypto("7"), None);
    }

    #[test]
    fn equity_accepts_days_and_named_ranges() {
        assert_eq!(Period::parse_equity("1d"), Some(Period::Days(1)));
        assert_eq!(Period::parse_equity("5d"), Some(Period::Days(5)));
        assert_eq!(Period::parse_equity("14d"), Some(Period::Days(14)));
        assert_eq!(Period::parse_equity("3MO"), Some(Period::Months(3)));
        assert_eq!(Period::parse_equity("1y"), Some(Period::Year));
        assert_eq!(Period::parse_equity("2y"), None);
        assert_eq!(Period::parse_equity("badperiod"), None);
    }

    #[test]
    fn display_round_trips_query_form() {
        assert_eq!(Period::Days(7).to_string(), "7d");
        assert_eq!(Period::Months(6).to_string(), "6mo");
        assert_eq!(Period::Year.to_string(), "1y");
        assert_eq!(Period::Months(3).days(), 90);
    }
}
