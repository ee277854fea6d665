use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    FetchError, HistorySource, Period, Point, PriceQuoteResult, PriceSource, Series, Symbol,
    error::fetch_json,
};

pub const DEFAULT_BASE_API: &str = "https://query1.finance.yahoo.com";

const HISTORY_INTERVAL: &str = "1h";

/// Quotes and hourly history for equities via the Yahoo chart endpoint.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_api: String,
}

impl YahooClient {
    pub fn new(base_api: impl Into<String>, timeout: Duration) -> Result<Self> {
        // the chart endpoint throttles requests without a browser-ish agent
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0 (pricebot)"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_api: base_api.into(),
        })
    }

    pub async fn fetch_chart(
        &self,
        ticker: &str,
        range: Option<Period>,
    ) -> Result<ChartResponse, FetchError> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_api.trim_end_matches('/'),
            ticker.to_uppercase()
        );

        let mut req = self.client.get(url);
        if let Some(range) = range {
            let range = range.to_string();
            req = req.query(&[("interval", HISTORY_INTERVAL), ("range", range.as_str())]);
        }

        unknown_ticker_as_missing(fetch_json(req).await, ticker)
    }
}

/// Yahoo answers an unknown or delisted ticker with 404 and an empty result.
fn unknown_ticker_as_missing<T>(res: Result<T, FetchError>, ticker: &str) -> Result<T, FetchError> {
    match res {
        Err(FetchError::UpstreamStatus(404)) => Err(FetchError::NotFound(ticker.to_uppercase())),
        other => other,
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    #[instrument(name = "yahoo_quote", skip_all, fields(symbol = %symbol))]
    async fn quote(&self, symbol: &Symbol) -> PriceQuoteResult {
        let raw = self
            .fetch_chart(symbol.id(), None)
            .await
            .and_then(|res| res.market_price(symbol.id()));
        PriceQuoteResult::classify(symbol.clone(), raw)
    }
}

#[async_trait]
impl HistorySource for YahooClient {
    #[instrument(name = "yahoo_history", skip_all, fields(symbol = %symbol, %period))]
    async fn history(&self, symbol: &Symbol, period: Period) -> Result<Series, FetchError> {
        let series = self
            .fetch_chart(symbol.id(), Some(period))
            .await?
            .into_series();
        debug!(points = series.len(), "fetched chart history");
        Ok(series)
    }
}

//
// Match Yahoo v8 chart JSON
//
#[derive(Debug, Deserialize, Clone)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartResult {
    pub meta: ChartMeta,

    #[serde(default)]
    pub timestamp: Vec<i64>,

    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct QuoteBlock {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResponse {
    fn first(&self) -> Option<&ChartResult> {
        self.chart.result.as_ref()?.first()
    }

    pub fn market_price(&self, ticker: &str) -> Result<f64, FetchError> {
        self.first()
            .and_then(|r| r.meta.regular_market_price)
            .ok_or_else(|| FetchError::NotFound(ticker.to_string()))
    }

    /// Pair timestamps with closes, dropping hours with no trade.
    pub fn into_series(self) -> Series {
        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Series::default();
        };
        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        let points = result
            .timestamp
            .into_iter()
            .zip(closes)
            .filter_map(|(ts, close)| {
                let price = close?;
                let time = DateTime::from_timestamp(ts, 0)?;
                Some(Point { time, price })
            })
            .collect();

        Series::new(points)
    }
}
