use crate::telegram::InlineKeyboardMarkup;

/// What a handler wants sent back to the originating chat.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    /// Text with an inline keyboard attached.
    Keyboard {
        text: String,
        keyboard: InlineKeyboardMarkup,
    },
    Image {
        png: Vec<u8>,
        caption: Option<String>,
    },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    /// Text body, if any; the caption for images.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) | Reply::Keyboard { text, .. } => Some(text),
            Reply::Image { caption, .. } => caption.as_deref(),
        }
    }
}

/// Backslash-escape the characters legacy Telegram Markdown treats as entity
/// delimiters, so echoed user text always parses.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
