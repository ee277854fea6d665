use market::{FetchError, Headline, QuoteStatus};
use tracing::{info, instrument, warn};

use crate::{
    Data,
    reply::{Reply, escape_markdown},
};

pub const USAGE: &str = "Usage: `/news <symbol>`\n(e.g. `/news bitcoin` or `/news AAPL`)";

const NEWS_KEY: &str = "NEWS_API_KEY";

const HEADLINE_LIMIT: usize = 3;

#[instrument(name = "news", skip(data))]
pub async fn news(data: &Data, symbol: &str) -> Reply {
    let Some(source) = &data.news else {
        return Reply::text(not_configured());
    };

    // known symbols search by their readable name, anything else verbatim
    let query = match data.config.registry.resolve(symbol) {
        Some(known) => known.display_name(),
        None => symbol.to_string(),
    };
    let shown = escape_markdown(&symbol.to_uppercase());

    match source.headlines(&query, HEADLINE_LIMIT).await {
        Ok(headlines) if headlines.is_empty() => {
            info!(%query, "no headlines");
            Reply::text(format!("📰 No recent news found for {shown}."))
        }
        Ok(headlines) => {
            info!(%query, count = headlines.len(), "headlines");
            Reply::text(render(&shown, &headlines))
        }
        Err(e) => {
            warn!(%query, error = %e, "news fetch failed");
            let reason = match e.as_status() {
                QuoteStatus::Error(reason) => reason.to_string(),
                _ => "lookup".to_string(),
            };
            Reply::text(format!("⚠️ Error fetching news for {shown} ({reason} error)."))
        }
    }
}

pub fn not_configured() -> String {
    let err = FetchError::Configuration(NEWS_KEY);
    format!("⚠️ News is unavailable: {}.", escape_markdown(&err.to_string()))
}

fn render(shown: &str, headlines: &[Headline]) -> String {
    let mut text = format!("📰 *News for* {shown}");
    for h in headlines {
        text.push_str(&format!(
            "\n• [{}]({})",
            escape_title(&h.title),
            h.url.replace(')', "%29")
        ));
    }
    text
}

/// Keep a title from breaking out of its `[...]` link text.
fn escape_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .map(|c| match c {
            '[' => '(',
            ']' => ')',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tests::{FakeMarket, FakeNews, config, event, harness};

    fn headline(title: &str, url: &str) -> Headline {
        Headline {
            title: title.into(),
            url: url.into(),
        }
    }

    #[tokio::test]
    async fn renders_at_most_three_links() {
        let news = FakeNews(Ok(vec![
            headline("Bitcoin hits *new* high", "https://a.example/1"),
            headline("[Analysis] ETF flows", "https://a.example/(2)"),
            headline("Miners_rally", "https://a.example/3"),
            headline("Fourth story", "https://a.example/4"),
        ]));
        let h = harness(FakeMarket::default(), FakeMarket::default(), Some(news), config());

        let reply = h.router.route(&event("/news bitcoin")).await.unwrap();

        assert_eq!(
            reply.as_text(),
            Some(
                "📰 *News for* BITCOIN\n\
                 • [Bitcoin hits new high](https://a.example/1)\n\
                 • [(Analysis) ETF flows](https://a.example/(2%29)\n\
                 • [Minersrally](https://a.example/3)"
            )
        );
    }

    #[tokio::test]
    async fn empty_result() {
        let h = harness(
            FakeMarket::default(),
            FakeMarket::default(),
            Some(FakeNews(Ok(vec![]))),
            config(),
        );
        let reply = h.router.route(&event("/headlines aapl")).await.unwrap();
        assert_eq!(reply.as_text(), Some("📰 No recent news found for AAPL."));
    }

    #[tokio::test]
    async fn upstream_failure_is_reported() {
        let h = harness(
            FakeMarket::default(),
            FakeMarket::default(),
            Some(FakeNews(Err(FetchError::UpstreamStatus(429)))),
            config(),
        );
        let reply = h.router.route(&event("/news eth")).await.unwrap();
        assert_eq!(
            reply.as_text(),
            Some("⚠️ Error fetching news for ETH (upstream status error).")
        );
    }

    #[tokio::test]
    async fn missing_key_is_explained() {
        let h = harness(FakeMarket::default(), FakeMarket::default(), None, config());
        let reply = h.router.route(&event("/news bitcoin")).await.unwrap();
        assert_eq!(
            reply.as_text(),
            Some(r"⚠️ News is unavailable: NEWS\_API\_KEY is not configured.")
        );
    }

    #[tokio::test]
    async fn echoed_symbols_are_escaped() {
        let h = harness(
            FakeMarket::default(),
            FakeMarket::default(),
            Some(FakeNews(Err(FetchError::Transport("timed out".into())))),
            config(),
        );
        let reply = h.router.route(&event("/news foo_bar")).await.unwrap();
        assert_eq!(
            reply.as_text(),
            Some(r"⚠️ Error fetching news for FOO\_BAR (network error).")
        );

        let h = harness(
            FakeMarket::default(),
            FakeMarket::default(),
            Some(FakeNews(Ok(vec![]))),
            config(),
        );
        let reply = h.router.route(&event("/news a*b")).await.unwrap();
        assert_eq!(reply.as_text(), Some(r"📰 No recent news found for A\*B."));
    }

    #[test]
    fn titles_cannot_break_links() {
        assert_eq!(escape_title("a [b] *c* `d` _e_"), "a (b) c d e");
    }
}
