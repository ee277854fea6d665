use tracing::info;

use crate::{Data, reply::Reply};

pub const CRYPTO_HEADER: &str = "📊 *Crypto Prices*";
pub const STOCKS_HEADER: &str = "📈 *Top Stock Prices*";

pub async fn crypto(data: &Data) -> Reply {
    let symbols = data.config.registry.crypto();
    let report = data.crypto_prices.quote_many(&symbols).await;

    info!(
        succeeded = report.succeeded(),
        total = report.total(),
        "crypto prices"
    );
    Reply::text(report.render(CRYPTO_HEADER))
}

pub async fn stocks(data: &Data) -> Reply {
    let symbols = data.config.registry.equities();
    let report = data.stock_prices.quote_many(&symbols).await;

    info!(
        succeeded = report.succeeded(),
        total = report.total(),
        "stock prices"
    );
    Reply::text(report.render(STOCKS_HEADER))
}
