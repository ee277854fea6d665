use std::sync::Arc;

use async_trait::async_trait;
use market::FetchError;
use tracing::{debug, warn};

use crate::{reply::Reply, telegram::InlineKeyboardMarkup};

/// Telegram rejects messages longer than this many characters.
pub const MESSAGE_LIMIT: usize = 4096;

/// Outbound side of the messaging platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), FetchError>;

    async fn send_image(
        &self,
        chat_id: i64,
        png: Vec<u8>,
        caption: Option<&str>,
    ) -> Result<(), FetchError>;
}

/// Best-effort, at-most-once delivery. Failures are logged and dropped.
#[derive(Clone)]
pub struct ResponseSender {
    messenger: Arc<dyn Messenger>,
}

impl ResponseSender {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    pub async fn deliver(&self, chat_id: i64, reply: Reply) {
        match reply {
            Reply::Text(text) => self.send_text(chat_id, &text, None).await,
            Reply::Keyboard { text, keyboard } => {
                self.send_text(chat_id, &text, Some(&keyboard)).await
            }
            Reply::Image { png, caption } => self.send_image(chat_id, png, caption).await,
        }
    }

    pub async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) {
        let chunks = split_message(text, MESSAGE_LIMIT);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.iter().enumerate() {
            // keyboard rides on the final chunk
            let markup = if i == last { keyboard } else { None };
            match self.messenger.send_text(chat_id, chunk, markup).await {
                Ok(()) => debug!(chat_id, chars = chunk.chars().count(), "text sent"),
                Err(e) => {
                    warn!(chat_id, error = %e, "send_text failed, dropping reply");
                    return;
                }
            }
        }
    }

    pub async fn send_image(&self, chat_id: i64, png: Vec<u8>, caption: Option<String>) {
        let bytes = png.len();
        match self
            .messenger
            .send_image(chat_id, png, caption.as_deref())
            .await
        {
            Ok(()) => debug!(chat_id, bytes, "image sent"),
            Err(e) => warn!(chat_id, error = %e, "send_image failed, dropping reply"),
        }
    }
}

/// Split on line or word boundaries so every chunk fits in `max_chars`.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        let cut = if end < rest.len() {
            rest[..end]
                .rfind('\n')
                .or_else(|| rest[..end].rfind(' '))
                .filter(|&pos| pos > 0)
                .map(|pos| pos + 1)
                .unwrap_or(end)
        } else {
            end
        };

        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    chunks
}

#[cfg(test)]
pub(crate) mod tests {
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Sent {
        Text {
            chat_id: i64,
            text: String,
            keyboard: bool,
        },
        Image {
            chat_id: i64,
            bytes: usize,
            caption: Option<String>,
        },
    }

    /// Records everything it is asked to send; optionally fails every call.
    #[derive(Default)]
    pub struct RecordingMessenger {
        pub sent: Mutex<Vec<Sent>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_text(
            &self,
            chat_id: i64,
            text: &str,
            keyboard: Option<&InlineKeyboardMarkup>,
        ) -> Result<(), FetchError> {
            self.sent.lock().await.push(Sent::Text {
                chat_id,
                text: text.to_string(),
                keyboard: keyboard.is_some(),
            });
            if self.fail {
                return Err(FetchError::Transport("connection reset".into()));
            }
            Ok(())
        }

        async fn send_image(
            &self,
            chat_id: i64,
            png: Vec<u8>,
            caption: Option<&str>,
        ) -> Result<(), FetchError> {
            self.sent.lock().await.push(Sent::Image {
                chat_id,
                bytes: png.len(),
                caption: caption.map(str::to_string),
            });
            if self.fail {
                return Err(FetchError::UpstreamStatus(400));
            }
            Ok(())
        }
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("hello", 10), vec!["hello"]);
    }

    #[test]
    fn long_text_splits_on_newlines() {
        let text = "line one\nline two\nline three";
        let chunks = split_message(text, 12);

        assert!(chunks.iter().all(|c| c.chars().count() <= 12));
        assert_eq!(chunks.concat(), text);
        assert_eq!(chunks[0], "line one\n");
    }

    #[test]
    fn unbroken_text_is_hard_split_on_char_boundaries() {
        let text = "ééééééé";
        let chunks = split_message(text, 3);
        assert_eq!(chunks, vec!["ééé", "ééé", "é"]);
    }

    #[tokio::test]
    async fn delivery_failures_are_swallowed() {
        let messenger = Arc::new(RecordingMessenger {
            fail: true,
            ..Default::default()
        });
        let sender = ResponseSender::new(messenger.clone());

        sender.deliver(1, Reply::text("hi")).await;
        sender
            .deliver(
                1,
                Reply::Image {
                    png: vec![0; 8],
                    caption: Some("cap".into()),
                },
            )
            .await;

        assert_eq!(messenger.sent.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn keyboard_is_attached_to_last_chunk() {
        let messenger = Arc::new(RecordingMessenger::default());
        let sender = ResponseSender::new(messenger.clone());
        let text = format!("{}\n{}", "a".repeat(MESSAGE_LIMIT - 1), "tail");

        sender
            .deliver(
                5,
                Reply::Keyboard {
                    text,
                    keyboard: InlineKeyboardMarkup::web_app("Open", "https://x"),
                },
            )
            .await;

        let sent = messenger.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], Sent::Text { keyboard: false, .. }));
        assert!(
            matches!(&sent[1], Sent::Text { keyboard: true, text, .. } if text == "tail")
        );
    }
}
