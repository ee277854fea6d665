use std::fmt;

pub const DEFAULT_CRYPTO_IDS: &[&str] = &[
    "bitcoin",
    "ethereum",
    "ripple",
    "hedera-hashgraph",
    "stellar",
    "quant-network",
    "ondo",
    "xdc-network",
    "pepe",
    "shiba-inu",
    "solana",
    "dogecoin",
];

pub const DEFAULT_STOCK_TICKERS: &[&str] = &["AAPL", "MSFT", "NVDA", "AMZN", "GOOGL"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// CoinGecko coin id, always lower case.
    Crypto(String),
    /// Exchange ticker, always upper case.
    Equity(String),
}

impl Symbol {
    pub fn id(&self) -> &str {
        match self {
            Symbol::Crypto(id) => id,
            Symbol::Equity(ticker) => ticker,
        }
    }

    /// "hedera-hashgraph" becomes "Hedera Hashgraph"; tickers are shown as-is.
    pub fn display_name(&self) -> String {
        match self {
            Symbol::Crypto(id) => id
                .split('-')
                .filter(|w| !w.is_empty())
                .map(|w| {
                    let mut chars = w.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
            Symbol::Equity(ticker) => ticker.clone(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The fixed set of symbols the bot knows how to quote and chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    crypto: Vec<String>,
    equities: Vec<String>,
}

impl Registry {
    pub fn new<C, E>(crypto: C, equities: E) -> Self
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            crypto: crypto
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            equities: equities
                .into_iter()
                .map(|s| s.as_ref().trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn crypto(&self) -> Vec<Symbol> {
        self.crypto.iter().cloned().map(Symbol::Crypto).collect()
    }

    pub fn equities(&self) -> Vec<Symbol> {
        self.equities.iter().cloned().map(Symbol::Equity).collect()
    }

    /// Case-insensitive lookup. Crypto ids win over equity tickers when a
    /// token appears in both registries.
    pub fn resolve(&self, token: &str) -> Option<Symbol> {
        let token = token.trim();

        let lower = token.to_lowercase();
        if self.crypto.contains(&lower) {
            return Some(Symbol::Crypto(lower));
        }

        let upper = token.to_uppercase();
        if self.equities.contains(&upper) {
            return Some(Symbol::Equity(upper));
        }

        None
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DEFAULT_CRYPTO_IDS, DEFAULT_STOCK_TICKERS)
    }
}
