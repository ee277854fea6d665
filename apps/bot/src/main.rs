use std::sync::Arc;

use anyhow::Result;
use pricebot::{
    Data,
    command::Router,
    config::Config,
    poller::{self, Poller},
    sender::ResponseSender,
    telegram::TelegramClient,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(Config::from_env()?);
    let data = Arc::new(Data::from_config(Arc::clone(&config))?);

    let telegram = Arc::new(TelegramClient::new(
        config.telegram_api_base.clone(),
        config.telegram_token.clone(),
        config.poll_timeout,
        config.http_timeout,
    )?);

    let poller = Poller::new(telegram.clone(), config.poll_timeout, config.retry_delay);
    let router = Arc::new(Router::new(data));
    let sender = ResponseSender::new(telegram);

    info!(
        crypto = config.registry.crypto().len(),
        stocks = config.registry.equities().len(),
        news = config.news_api_key.is_some(),
        webapp = config.webapp_url.is_some(),
        "bot started"
    );

    tokio::select! {
        _ = poller::run(poller, router, sender) => {},
        _ = shutdown_signal() => {},
    }

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::{
            select,
            signal::unix::{SignalKind, signal},
        };
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    error!(error = %e, "failed to install signal handlers, falling back to ctrl-c");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
