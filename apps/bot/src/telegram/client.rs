use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use market::{FetchError, fetch_json};
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde_json::json;
use tracing::{debug, instrument};

use super::types::{InlineKeyboardMarkup, TgResponse, Update};
use crate::{poller::UpdateSource, sender::Messenger};

/// Headroom over the long-poll timeout before the HTTP client gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Minimal Bot API client: long-poll for updates, send text and photos.
#[derive(Clone)]
pub struct TelegramClient {
    poll_client: Client,
    send_client: Client,
    base_api: String,
    token: String,
}

impl TelegramClient {
    pub fn new(
        base_api: impl Into<String>,
        token: impl Into<String>,
        poll_timeout: Duration,
        send_timeout: Duration,
    ) -> Result<Self> {
        let poll_client = Client::builder()
            .timeout(poll_timeout + POLL_GRACE)
            .build()?;
        let send_client = Client::builder().timeout(send_timeout).build()?;

        Ok(Self {
            poll_client,
            send_client,
            base_api: base_api.into(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_api.trim_end_matches('/'),
            self.token,
            method
        )
    }
}

fn unwrap_response<T>(body: TgResponse<T>) -> Result<T, FetchError> {
    if !body.ok {
        return Err(match body.error_code {
            Some(code) => FetchError::UpstreamStatus(code),
            None => FetchError::Parse(body.description.unwrap_or_else(|| "ok=false".to_string())),
        });
    }
    body.result
        .ok_or_else(|| FetchError::Parse("missing result".to_string()))
}

#[async_trait]
impl UpdateSource for TelegramClient {
    #[instrument(name = "get_updates", skip(self))]
    async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>, FetchError> {
        let req = self.poll_client.get(self.method_url("getUpdates")).query(&[
            ("offset", offset),
            ("timeout", timeout.as_secs() as i64),
        ]);

        let body: TgResponse<Vec<Update>> = fetch_json(req).await?;
        let updates = unwrap_response(body)?;
        debug!(count = updates.len(), "received updates");
        Ok(updates)
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), FetchError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });
        if let Some(keyboard) = keyboard {
            payload["reply_markup"] = serde_json::to_value(keyboard)?;
        }

        let req = self
            .send_client
            .post(self.method_url("sendMessage"))
            .json(&payload);

        let body: TgResponse<serde_json::Value> = fetch_json(req).await?;
        unwrap_response(body).map(|_| ())
    }

    async fn send_image(
        &self,
        chat_id: i64,
        png: Vec<u8>,
        caption: Option<&str>,
    ) -> Result<(), FetchError> {
        let photo = Part::bytes(png)
            .file_name("chart.png")
            .mime_str("image/png")?;

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", photo);
        if let Some(caption) = caption {
            form = form
                .text("caption", caption.to_string())
                .text("parse_mode", "Markdown");
        }

        let req = self
            .send_client
            .post(self.method_url("sendPhoto"))
            .multipart(form);

        let body: TgResponse<serde_json::Value> = fetch_json(req).await?;
        unwrap_response(body).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_urls_embed_token() {
        let client = TelegramClient::new(
            "https://api.telegram.org/",
            "123:abc",
            Duration::from_secs(30),
            Duration::from_secs(15),
        )
        .unwrap();

        assert_eq!(
            client.method_url("getUpdates"),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn not_ok_responses_are_errors() {
        let body: TgResponse<Vec<Update>> = serde_json::from_str(
            r#"{"ok":false,"error_code":409,"description":"Conflict: terminated by other getUpdates request"}"#,
        )
        .unwrap();
        assert_eq!(unwrap_response(body).err(), Some(FetchError::UpstreamStatus(409)));

        let body: TgResponse<Vec<Update>> = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(matches!(unwrap_response(body), Err(FetchError::Parse(_))));
    }

    #[test]
    fn ok_responses_unwrap() {
        let body: TgResponse<Vec<Update>> = serde_json::from_str(
            r#"{"ok":true,"result":[{"update_id":3},{"update_id":4}]}"#,
        )
        .unwrap();
        let ids: Vec<i64> = unwrap_response(body)
            .unwrap()
            .iter()
            .map(|u| u.update_id)
            .collect();
        assert_eq!(ids, [3, 4]);
    }
}
