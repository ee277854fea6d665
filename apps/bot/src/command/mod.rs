mod chart;
mod news;
mod prices;
mod start;
mod webapp;

use std::{collections::HashMap, sync::Arc, sync::LazyLock};

use tracing::{debug, info};

use crate::{
    Data,
    reply::{Reply, escape_markdown},
    telegram::{EventKind, InboundEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Start,
    Crypto,
    Stocks,
    Chart,
    News,
}

impl CommandName {
    /// Exact argument count, for commands that take parameters.
    fn arity(&self) -> Option<usize> {
        match self {
            CommandName::Chart => Some(2),
            CommandName::News => Some(1),
            CommandName::Start | CommandName::Crypto | CommandName::Stocks => None,
        }
    }

    fn usage(&self) -> &'static str {
        match self {
            CommandName::Chart => chart::USAGE,
            CommandName::News => news::USAGE,
            CommandName::Start | CommandName::Crypto | CommandName::Stocks => start::HELP,
        }
    }
}

const ALIASES: &[(&str, CommandName)] = &[
    ("start", CommandName::Start),
    ("crypto", CommandName::Crypto),
    ("cryptocurrency", CommandName::Crypto),
    ("coins", CommandName::Crypto),
    ("crypto_prices", CommandName::Crypto),
    ("stocks", CommandName::Stocks),
    ("equities", CommandName::Stocks),
    ("shares", CommandName::Stocks),
    ("stock_prices", CommandName::Stocks),
    ("chart", CommandName::Chart),
    ("graph", CommandName::Chart),
    ("price_chart", CommandName::Chart),
    ("chart_price", CommandName::Chart),
    ("news", CommandName::News),
    ("headlines", CommandName::News),
    ("latest_news", CommandName::News),
    ("news_articles", CommandName::News),
];

static COMMANDS: LazyLock<HashMap<&'static str, CommandName>> =
    LazyLock::new(|| ALIASES.iter().copied().collect());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: CommandName,
    pub args: Vec<String>,
}

impl Command {
    /// `/Verb@my_bot arg1 arg2` → `(verb, [arg1, arg2])`. Text that is not a
    /// `/`-prefixed known verb yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let verb = tokens.next()?.strip_prefix('/')?;
        let verb = verb.split('@').next().unwrap_or(verb).to_lowercase();

        let name = *COMMANDS.get(verb.as_str())?;
        Some(Self {
            name,
            args: tokens.map(str::to_string).collect(),
        })
    }
}

/// Outcome of the synchronous routing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Ignore,
    Usage(&'static str),
    Invoke(Command),
}

/// Pure text → route decision. No handler runs and nothing touches the
/// network here.
pub fn resolve(text: &str) -> Route {
    let Some(command) = Command::parse(text) else {
        return Route::Ignore;
    };

    match command.name.arity() {
        Some(n) if command.args.len() != n => Route::Usage(command.name.usage()),
        _ => Route::Invoke(command),
    }
}

pub struct Router {
    data: Arc<Data>,
}

impl Router {
    pub fn new(data: Arc<Data>) -> Self {
        Self { data }
    }

    /// Map an event to at most one reply. Unknown commands produce nothing.
    pub async fn route(&self, event: &InboundEvent) -> Option<Reply> {
        match event.kind {
            EventKind::Message | EventKind::Callback => self.route_text(&event.raw_text).await,
            EventKind::WebAppData => match webapp::translate(&event.raw_text) {
                Some(text) => self.route_text(&text).await,
                None => Some(Reply::text(format!(
                    "❓ Unknown web app data: {}",
                    escape_markdown(&event.raw_text)
                ))),
            },
            EventKind::InlineQuery => {
                debug!(query = %event.raw_text, "ignoring inline query");
                None
            }
        }
    }

    async fn route_text(&self, text: &str) -> Option<Reply> {
        let command = match resolve(text) {
            Route::Ignore => return None,
            Route::Usage(usage) => return Some(Reply::text(usage)),
            Route::Invoke(command) => command,
        };

        info!(command = ?command.name, args = ?command.args, "dispatching");
        let data = &self.data;

        let reply = match command.name {
            CommandName::Start => start::start(data),
            CommandName::Crypto => prices::crypto(data).await,
            CommandName::Stocks => prices::stocks(data).await,
            CommandName::Chart => chart::chart(data, &command.args[0], &command.args[1]).await,
            CommandName::News => news::news(data, &command.args[0]).await,
        };
        Some(reply)
    }
}
