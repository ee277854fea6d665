use std::sync::Arc;

use market::{ChartRenderer, FetchError, Period, QuoteStatus, Series, Symbol};
use tracing::{info, instrument, warn};

use crate::{Data, reply::Reply};

pub const USAGE: &str = "Usage: `/chart <symbol> <period>`\n\
e.g. `/chart bitcoin 7d` or `/chart AAPL 1d`";

pub const CRYPTO_PERIOD_USAGE: &str = "For crypto, period must be in days (e.g. `7d`, `30d`).";

pub const STOCK_PERIOD_USAGE: &str =
    "Invalid period for stock. Use `1d`, `5d`, `1mo`, `3mo`, `6mo`, `1y` or `<n>d`.";

pub const UNKNOWN_SYMBOL: &str = "⚠️ Symbol not recognized. Use a valid crypto ID or stock ticker.";

/// `/chart <symbol> <period>`: validate, fetch history, render.
#[instrument(name = "chart", skip(data))]
pub async fn chart(data: &Data, symbol: &str, period: &str) -> Reply {
    let Some(symbol) = data.config.registry.resolve(symbol) else {
        return Reply::text(UNKNOWN_SYMBOL);
    };

    // reject bad periods before any outbound call
    let Some(period) = Period::parse_for(&symbol, period) else {
        return Reply::text(match symbol {
            Symbol::Crypto(_) => CRYPTO_PERIOD_USAGE,
            Symbol::Equity(_) => STOCK_PERIOD_USAGE,
        });
    };

    let history = match symbol {
        Symbol::Crypto(_) => &data.crypto_history,
        Symbol::Equity(_) => &data.stock_history,
    };

    match history.history(&symbol, period).await {
        Ok(series) if !series.is_empty() => {
            render(Arc::clone(&data.renderer), &symbol, period, series).await
        }
        Ok(_) | Err(FetchError::NotFound(_)) => {
            info!(symbol = %symbol, "no historical data");
            Reply::text(could_not_fetch(&symbol))
        }
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "history fetch failed");
            let reason = match e.as_status() {
                QuoteStatus::Error(reason) => reason.to_string(),
                _ => e.to_string(),
            };
            Reply::text(format!(
                "⚠️ Error fetching historical data for {} ({reason} error).",
                symbol.display_name()
            ))
        }
    }
}

pub fn could_not_fetch(symbol: &Symbol) -> String {
    format!(
        "⚠️ Could not fetch historical data for {}.",
        symbol.display_name()
    )
}

pub fn caption(symbol: &Symbol, period: Period) -> String {
    let window = match period {
        Period::Days(1) => "1 day".to_string(),
        Period::Days(n) => format!("{n} days"),
        other => other.to_string(),
    };
    format!("📈 {} - Last {window}", symbol.display_name())
}

async fn render(
    renderer: Arc<dyn ChartRenderer>,
    symbol: &Symbol,
    period: Period,
    series: Series,
) -> Reply {
    let title = format!("{} ({period})", symbol.display_name());
    let points = series.len();

    let rendered =
        tokio::task::spawn_blocking(move || renderer.render(&title, &series)).await;

    match rendered {
        Ok(Ok(png)) => {
            info!(symbol = %symbol, points, bytes = png.len(), "chart rendered");
            Reply::Image {
                png,
                caption: Some(caption(symbol, period)),
            }
        }
        Ok(Err(e)) => {
            warn!(symbol = %symbol, error = ?e, "chart render failed");
            Reply::text(format!(
                "⚠️ Could not render chart for {}.",
                symbol.display_name()
            ))
        }
        Err(e) => {
            warn!(symbol = %symbol, error = ?e, "render task join failed");
            Reply::text(format!(
                "⚠️ Could not render chart for {}.",
                symbol.display_name()
            ))
        }
    }
}
