use crate::{Data, reply::Reply, telegram::InlineKeyboardMarkup};

pub const HELP: &str = "👋 *CryptoStock Bot*\n\n\
Use `/crypto` to get all crypto prices.\n\
Use `/stocks` to get all stock prices.\n\
Use `/chart <symbol> <period>` for a price chart:\n   \
`/chart bitcoin 7d` or `/chart AAPL 1d`.\n\
Use `/news <symbol>` for latest headlines.";

const WEBAPP_HINT: &str = "\n\n🌐 Or tap the button below to open the web interface:";
const WEBAPP_LABEL: &str = "🚀 Launch Web App";

pub fn start(data: &Data) -> Reply {
    match &data.config.webapp_url {
        Some(url) => Reply::Keyboard {
            text: format!("{HELP}{WEBAPP_HINT}"),
            keyboard: InlineKeyboardMarkup::web_app(WEBAPP_LABEL, url.clone()),
        },
        None => Reply::text(HELP),
    }
}
