use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{FetchError, error::fetch_json};

pub const DEFAULT_BASE_API: &str = "https://newsapi.org/v2";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Headline {
    pub title: String,
    pub url: String,
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Most recent headlines mentioning `query`, newest first.
    async fn headlines(&self, query: &str, limit: usize) -> Result<Vec<Headline>, FetchError>;
}

/// NewsAPI.org `everything` search.
#[derive(Clone)]
pub struct NewsApiClient {
    client: Client,
    base_api: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(
        base_api: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_api: base_api.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    #[instrument(name = "newsapi_headlines", skip(self))]
    async fn headlines(&self, query: &str, limit: usize) -> Result<Vec<Headline>, FetchError> {
        let url = format!("{}/everything", self.base_api.trim_end_matches('/'));

        let page_size = limit.to_string();
        let req = self.client.get(url).query(&[
            ("q", query),
            ("apiKey", self.api_key.as_str()),
            ("pageSize", page_size.as_str()),
            ("sortBy", "publishedAt"),
            ("language", "en"),
        ]);

        let res: EverythingResponse = fetch_json(req).await?;
        let headlines = res.into_headlines(limit);
        debug!(count = headlines.len(), "fetched headlines");
        Ok(headlines)
    }
}

//
// https://newsapi.org/docs/endpoints/everything
//
#[derive(Debug, Deserialize, Clone)]
pub struct EverythingResponse {
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Article {
    pub title: Option<String>,
    pub url: Option<String>,
}

impl EverythingResponse {
    /// Articles without both a title and a link are useless in a chat reply.
    pub fn into_headlines(self, limit: usize) -> Vec<Headline> {
        self.articles
            .into_iter()
            .filter_map(|a| {
                Some(Headline {
                    title: a.title.filter(|t| !t.trim().is_empty())?,
                    url: a.url?,
                })
            })
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headlines_drop_incomplete_articles() {
        let res: EverythingResponse = serde_json::from_str(
            r#"{
                "status": "ok",
                "totalResults": 4,
                "articles": [
                    {"title": "Bitcoin tops $70k", "url": "https://ex.com/a"},
                    {"title": null, "url": "https://ex.com/b"},
                    {"title": "ETF inflows slow", "url": "https://ex.com/c"},
                    {"title": "Miners rally", "url": "https://ex.com/d"}
                ]
            }"#,
        )
        .unwrap();

        let headlines = res.into_headlines(2);
        assert_eq!(
            headlines,
            vec![
                Headline {
                    title: "Bitcoin tops $70k".into(),
                    url: "https://ex.com/a".into()
                },
                Headline {
                    title: "ETF inflows slow".into(),
                    url: "https://ex.com/c".into()
                },
            ]
        );
    }

    #[test]
    fn missing_articles_is_empty() {
        let res: EverythingResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(res.into_headlines(3).is_empty());
    }
}
