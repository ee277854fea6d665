mod client;
mod types;

pub use client::TelegramClient;
pub use types::{EventKind, InboundEvent, InlineKeyboardMarkup, Update};
