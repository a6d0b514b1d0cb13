use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 12;

/// Upper-cased Yahoo-style ticker: `AAPL`, `BRK-B`, `0700.HK`, `^GSPC`,
/// `EURUSD=X`.
///
/// Tickers double as CSV file stems (`<dir>/<TICKER>.csv`), so anything that
/// could step outside the data directory is refused here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let ticker = input.trim().to_ascii_uppercase();
        if ticker.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        match ticker_problem(&ticker) {
            None => Ok(Self(ticker)),
            Some(reason) => Err(ValidationError::InvalidSymbol {
                symbol: ticker,
                reason,
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn ticker_problem(ticker: &str) -> Option<&'static str> {
    if ticker.len() > MAX_TICKER_LEN {
        return Some("longer than 12 characters");
    }

    // Index tickers carry a leading caret.
    let body = ticker.strip_prefix('^').unwrap_or(ticker);
    if !body.starts_with(|ch: char| ch.is_ascii_alphanumeric()) {
        return Some("must start with a letter or digit");
    }
    if let Some(ch) = body
        .chars()
        .find(|&ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '=')))
    {
        return Some(match ch {
            '/' | '\\' => "path separators are not allowed",
            '^' => "'^' is only allowed as a prefix",
            _ => "only letters, digits, '.', '-' and '=' are allowed",
        });
    }
    // Currency and futures quotes: `EURUSD=X`, `CL=F`.
    match body.split_once('=') {
        Some((_, suffix)) if suffix.is_empty() || suffix.contains('=') => {
            Some("'=' must be followed by a single exchange suffix")
        }
        _ => None,
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}
