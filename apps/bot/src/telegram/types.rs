use serde::{Deserialize, Serialize};

//
// Match Telegram Bot API JSON
// https://core.telegram.org/bots/api#getting-updates
//
#[derive(Debug, Deserialize)]
pub struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub inline_query: Option<InlineQuery>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
    pub web_app_data: Option<WebAppData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebAppData {
    pub data: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub web_app: WebAppInfo,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WebAppInfo {
    pub url: String,
}

impl InlineKeyboardMarkup {
    pub fn web_app(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: label.into(),
                web_app: WebAppInfo { url: url.into() },
            }]],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Message,
    InlineQuery,
    Callback,
    WebAppData,
}

/// One inbound update reduced to what routing needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub id: i64,
    pub chat_id: i64,
    pub raw_text: String,
    pub kind: EventKind,
}

impl Update {
    /// `None` for update kinds the bot does not act on (edits, joins, ...).
    pub fn into_event(self) -> Option<InboundEvent> {
        let id = self.update_id;

        if let Some(msg) = self.message {
            let chat_id = msg.chat.id;
            if let Some(web) = msg.web_app_data {
                return Some(InboundEvent {
                    id,
                    chat_id,
                    raw_text: web.data,
                    kind: EventKind::WebAppData,
                });
            }
            let text = msg.text?.trim().to_string();
            if text.is_empty() {
                return None;
            }
            return Some(InboundEvent {
                id,
                chat_id,
                raw_text: text,
                kind: EventKind::Message,
            });
        }

        if let Some(cb) = self.callback_query {
            let chat_id = cb.message.map(|m| m.chat.id).unwrap_or(cb.from.id);
            return Some(InboundEvent {
                id,
                chat_id,
                raw_text: cb.data?.trim().to_string(),
                kind: EventKind::Callback,
            });
        }

        if let Some(q) = self.inline_query {
            return Some(InboundEvent {
                id,
                chat_id: q.from.id,
                raw_text: q.query,
                kind: EventKind::InlineQuery,
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn text_message() {
        let event = parse(
            r#"{"update_id":10,"message":{"message_id":1,"chat":{"id":42,"type":"private"},"text":"  /crypto  "}}"#,
        )
        .into_event()
        .unwrap();

        assert_eq!(
            event,
            InboundEvent {
                id: 10,
                chat_id: 42,
                raw_text: "/crypto".into(),
                kind: EventKind::Message,
            }
        );
    }

    #[test]
    fn web_app_payload_wins_over_text() {
        let event = parse(
            r#"{"update_id":11,"message":{"message_id":2,"chat":{"id":7},"web_app_data":{"data":"chart:bitcoin 7d","button_text":"Open"}}}"#,
        )
        .into_event()
        .unwrap();

        assert_eq!(event.kind, EventKind::WebAppData);
        assert_eq!(event.raw_text, "chart:bitcoin 7d");
    }

    #[test]
    fn callback_uses_originating_chat() {
        let event = parse(
            r#"{"update_id":12,"callback_query":{"id":"cb","from":{"id":5},"message":{"message_id":3,"chat":{"id":-100}},"data":"/stocks"}}"#,
        )
        .into_event()
        .unwrap();

        assert_eq!(event.kind, EventKind::Callback);
        assert_eq!(event.chat_id, -100);
        assert_eq!(event.raw_text, "/stocks");
    }

    #[test]
    fn inline_query() {
        let event = parse(
            r#"{"update_id":13,"inline_query":{"id":"q","from":{"id":9},"query":"btc","offset":""}}"#,
        )
        .into_event()
        .unwrap();

        assert_eq!(event.kind, EventKind::InlineQuery);
        assert_eq!(event.chat_id, 9);
    }

    #[test]
    fn unsupported_updates_are_skipped() {
        assert!(parse(r#"{"update_id":14,"edited_message":{}}"#).into_event().is_none());
        assert!(
            parse(r#"{"update_id":15,"message":{"message_id":4,"chat":{"id":1},"sticker":{}}}"#)
                .into_event()
                .is_none()
        );
    }

    #[test]
    fn web_app_button_shape() {
        let markup = InlineKeyboardMarkup::web_app("🚀 Open App", "https://app.example");
        assert_eq!(
            serde_json::to_value(&markup).unwrap(),
            serde_json::json!({
                "inline_keyboard": [[{"text": "🚀 Open App", "web_app": {"url": "https://app.example"}}]]
            })
        );
    }
}
