use std::{collections::HashMap, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    AggregateReport, FetchError, HistorySource, Period, Point, PriceQuoteResult, PriceSource,
    Series, Symbol, error::fetch_json,
};

pub const DEFAULT_BASE_API: &str = "https://api.coingecko.com/api/v3";

/// Spot prices and market charts for coins, keyed by CoinGecko id.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_api: String,
}

impl CoinGeckoClient {
    pub fn new(base_api: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_api: base_api.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_api.trim_end_matches('/'), path)
    }

    /// One `simple/price` request covering every id in `ids`.
    pub async fn fetch_prices(&self, ids: &[&str]) -> Result<SimplePriceResponse, FetchError> {
        let req = self
            .client
            .get(self.url("simple/price"))
            .query(&[("ids", ids.join(",").as_str()), ("vs_currencies", "usd")]);

        fetch_json(req).await
    }

    pub async fn fetch_market_chart(&self, id: &str, days: u32) -> Result<Series, FetchError> {
        let days = days.to_string();
        let req = self
            .client
            .get(self.url(&format!("coins/{id}/market_chart")))
            .query(&[("vs_currency", "usd"), ("days", days.as_str())]);

        let res: MarketChartResponse = fetch_json(req).await?;
        Ok(res.into_series())
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    #[instrument(name = "coingecko_quote", skip_all, fields(symbol = %symbol))]
    async fn quote(&self, symbol: &Symbol) -> PriceQuoteResult {
        let raw = self
            .fetch_prices(&[symbol.id()])
            .await
            .and_then(|res| res.usd(symbol.id()));
        PriceQuoteResult::classify(symbol.clone(), raw)
    }

    /// CoinGecko answers a whole id list in one round trip, so the batch is a
    /// single request classified per symbol.
    #[instrument(name = "coingecko_quote_many", skip_all, fields(count = symbols.len()))]
    async fn quote_many(&self, symbols: &[Symbol]) -> AggregateReport {
        let ids: Vec<&str> = symbols.iter().map(Symbol::id).collect();
        let res = self.fetch_prices(&ids).await;

        let results = symbols
            .iter()
            .map(|symbol| {
                let raw = match &res {
                    Ok(body) => body.usd(symbol.id()),
                    Err(e) => Err(e.clone()),
                };
                PriceQuoteResult::classify(symbol.clone(), raw)
            })
            .collect();

        AggregateReport::new(results)
    }
}

#[async_trait]
impl HistorySource for CoinGeckoClient {
    #[instrument(name = "coingecko_history", skip_all, fields(symbol = %symbol, %period))]
    async fn history(&self, symbol: &Symbol, period: Period) -> Result<Series, FetchError> {
        let series = self.fetch_market_chart(symbol.id(), period.days()).await?;
        debug!(points = series.len(), "fetched market chart");
        Ok(series)
    }
}

//
// Match CoinGecko API JSON
// https://docs.coingecko.com/reference/simple-price
//
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(transparent)]
pub struct SimplePriceResponse(pub HashMap<String, SimplePrice>);

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SimplePrice {
    pub usd: Option<f64>,
}

impl SimplePriceResponse {
    pub fn usd(&self, id: &str) -> Result<f64, FetchError> {
        self.0
            .get(id)
            .and_then(|p| p.usd)
            .ok_or_else(|| FetchError::NotFound(id.to_string()))
    }
}

//
// https://docs.coingecko.com/reference/coins-id-market-chart
//
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MarketChartResponse {
    /// `[unix_millis, price]` pairs.
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
}

impl MarketChartResponse {
    pub fn into_series(self) -> Series {
        let points = self
            .prices
            .into_iter()
            .filter_map(|(ms, price)| {
                DateTime::from_timestamp_millis(ms as i64).map(|time| Point { time, price })
            })
            .collect();
        Series::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_price_lookup() {
        let res: SimplePriceResponse = serde_json::from_str(
            r#"{"bitcoin":{"usd":67012.5},"pepe":{"usd":0.0000123},"ondo":{}}"#,
        )
        .unwrap();

        assert_eq!(res.usd("bitcoin"), Ok(67012.5));
        assert_eq!(res.usd("pepe"), Ok(0.0000123));
        assert!(matches!(res.usd("ondo"), Err(FetchError::NotFound(_))));
        assert!(matches!(res.usd("solana"), Err(FetchError::NotFound(_))));
    }

    #[test]
    fn unexpected_shape_is_rejected() {
        let err = serde_json::from_str::<SimplePriceResponse>(r#"[1, 2, 3]"#).unwrap_err();
        assert!(matches!(FetchError::from(err), FetchError::Parse(_)));
    }

    #[test]
    fn market_chart_into_series() {
        let res: MarketChartResponse = serde_json::from_str(
            r#"{"prices":[[1700000000000,36500.1],[1700003600000,36610.0]],"total_volumes":[]}"#,
        )
        .unwrap();
        let series = res.into_series();

        assert_eq!(series.len(), 2);
        assert_eq!(series.prices(), vec![36500.1, 36610.0]);
        assert_eq!(series.points[0].time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn missing_prices_is_an_empty_series() {
        let res: MarketChartResponse = serde_json::from_str("{}").unwrap();
        assert!(res.into_series().is_empty());
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_network_error() {
        // nothing listens on the discard port
        let client =
            CoinGeckoClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let symbols = vec![
            Symbol::Crypto("bitcoin".into()),
            Symbol::Crypto("ethereum".into()),
        ];

        let report = client.quote_many(&symbols).await;

        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.results[0].line(), "Bitcoin: network error");
        assert_eq!(report.results[1].line(), "Ethereum: network error");
        assert_eq!(report.summary().as_deref(), Some("`0/2` succeeded"));
    }
}
