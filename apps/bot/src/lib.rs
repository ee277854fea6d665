use std::sync::Arc;

use anyhow::Result;
use market::{
    ChartRenderer, CoinGeckoClient, HistorySource, LineChartRenderer, NewsApiClient, NewsSource,
    PriceSource, YahooClient,
};
use tracing::info;

use crate::config::Config;

pub mod command;
pub mod config;
pub mod poller;
pub mod reply;
pub mod sender;
pub mod telegram;

/// Everything a command handler can reach. Built once, shared behind `Arc`.
pub struct Data {
    pub config: Arc<Config>,
    pub crypto_prices: Arc<dyn PriceSource>,
    pub crypto_history: Arc<dyn HistorySource>,
    pub stock_prices: Arc<dyn PriceSource>,
    pub stock_history: Arc<dyn HistorySource>,
    /// `None` when no news API key is configured.
    pub news: Option<Arc<dyn NewsSource>>,
    pub renderer: Arc<dyn ChartRenderer>,
}

impl Data {
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let coingecko = Arc::new(CoinGeckoClient::new(
            config.coingecko_api_base.clone(),
            config.http_timeout,
        )?);
        let yahoo = Arc::new(YahooClient::new(
            config.yahoo_api_base.clone(),
            config.http_timeout,
        )?);

        let news = match &config.news_api_key {
            Some(key) => {
                let client =
                    NewsApiClient::new(config.news_api_base.clone(), key.clone(), config.http_timeout)?;
                Some(Arc::new(client) as Arc<dyn NewsSource>)
            }
            None => {
                info!("NEWS_API_KEY not set, /news disabled");
                None
            }
        };

        Ok(Self {
            crypto_prices: coingecko.clone(),
            crypto_history: coingecko,
            stock_prices: yahoo.clone(),
            stock_history: yahoo,
            news,
            renderer: Arc::new(LineChartRenderer::default()),
            config,
        })
    }
}
