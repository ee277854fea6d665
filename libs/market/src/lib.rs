mod error;
mod format;
mod quote;
mod series;
mod symbol;

pub mod chart;
pub mod coingecko;
pub mod news;
pub mod yahoo;

pub use chart::{ChartRenderer, LineChartRenderer};
pub use coingecko::CoinGeckoClient;
pub use error::{FetchError, fetch_json};
pub use format::{CURRENCY, format_price};
pub use news::{Headline, NewsApiClient, NewsSource};
pub use quote::{
    AggregateReport, ErrorReason, PriceQuoteResult, PriceSource, QuoteStatus, validate_price,
};
pub use series::{HistorySource, Period, Point, Series};
pub use symbol::{DEFAULT_CRYPTO_IDS, DEFAULT_STOCK_TICKERS, Registry, Symbol};
pub use yahoo::YahooClient;
