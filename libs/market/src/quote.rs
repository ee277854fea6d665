use std::fmt;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};
use tracing_futures::Instrument;

use crate::{FetchError, Symbol, format_price};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReason {
    Network,
    UpstreamStatus,
    Parse,
    InvalidValue,
}

impl ErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorReason::Network => "network",
            ErrorReason::UpstreamStatus => "upstream status",
            ErrorReason::Parse => "parse",
            ErrorReason::InvalidValue => "invalid value",
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuoteStatus {
    Ok(f64),
    Unavailable,
    Error(ErrorReason),
}

impl FetchError {
    pub fn as_status(&self) -> QuoteStatus {
        match self {
            FetchError::Transport(_) => QuoteStatus::Error(ErrorReason::Network),
            FetchError::UpstreamStatus(_) => QuoteStatus::Error(ErrorReason::UpstreamStatus),
            FetchError::Parse(_) => QuoteStatus::Error(ErrorReason::Parse),
            FetchError::NotFound(_) => QuoteStatus::Unavailable,
            FetchError::InvalidValue(_) => QuoteStatus::Error(ErrorReason::InvalidValue),
            // a missing credential never reaches a price lookup
            FetchError::Configuration(_) => QuoteStatus::Unavailable,
        }
    }
}

/// A quote of zero or below is a data-quality failure, not a price.
pub fn validate_price(price: f64) -> Result<f64, FetchError> {
    if price > 0.0 {
        Ok(price)
    } else {
        Err(FetchError::InvalidValue(price.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuoteResult {
    pub symbol: Symbol,
    pub status: QuoteStatus,
}

impl PriceQuoteResult {
    /// Fold a raw fetch outcome into one of the three terminal states.
    pub fn classify(symbol: Symbol, raw: Result<f64, FetchError>) -> Self {
        let status = match raw.and_then(validate_price) {
            Ok(price) => QuoteStatus::Ok(price),
            Err(e) => e.as_status(),
        };

        if let QuoteStatus::Error(reason) = status {
            warn!(symbol = %symbol, %reason, "quote failed");
        }

        Self { symbol, status }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, QuoteStatus::Ok(_))
    }

    /// One display line, e.g. "Shiba Inu: $0.00001234" or "AAPL: network error".
    pub fn line(&self) -> String {
        let name = self.symbol.display_name();
        match self.status {
            QuoteStatus::Ok(v) => format!("{name}: {}", format_price(v)),
            QuoteStatus::Unavailable => format!("{name}: N/A"),
            QuoteStatus::Error(reason) => format!("{name}: {reason} error"),
        }
    }
}

/// Per-symbol results of a batch query, in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    pub results: Vec<PriceQuoteResult>,
}

impl AggregateReport {
    pub fn new(results: Vec<PriceQuoteResult>) -> Self {
        Self { results }
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// "`N/M` succeeded", only when at least one symbol is not `Ok`.
    pub fn summary(&self) -> Option<String> {
        let (ok, total) = (self.succeeded(), self.total());
        (ok < total).then(|| format!("`{ok}/{total}` succeeded"))
    }

    pub fn render(&self, header: &str) -> String {
        let mut out = String::from(header);
        for r in &self.results {
            out.push('\n');
            out.push_str(&r.line());
        }
        if let Some(summary) = self.summary() {
            out.push_str("\n\n");
            out.push_str(&summary);
        }
        out
    }
}

/// Spot price provider for one upstream.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn quote(&self, symbol: &Symbol) -> PriceQuoteResult;

    /// Fan out one request per symbol and join. Output order follows `symbols`,
    /// not completion order.
    async fn quote_many(&self, symbols: &[Symbol]) -> AggregateReport {
        let tasks = symbols.iter().map(|symbol| {
            let span = tracing::info_span!("quote", symbol = %symbol);
            self.quote(symbol).instrument(span)
        });

        let results = join_all(tasks).await;
        let report = AggregateReport::new(results);
        debug!(
            succeeded = report.succeeded(),
            total = report.total(),
            "batch quote finished"
        );
        report
    }
}
