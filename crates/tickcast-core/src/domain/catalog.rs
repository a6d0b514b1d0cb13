use serde::Serialize;

use crate::{Symbol, ValidationError};

/// One selectable instrument of the fixed allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub label: &'static str,
    pub symbol: Symbol,
}

const ENTRIES: [(&str, &str); 7] = [
    ("Apple (AAPL)", "AAPL"),
    ("Google (GOOG)", "GOOG"),
    ("Microsoft (MSFT)", "MSFT"),
    ("Amazon (AMZN)", "AMZN"),
    ("Meta (META)", "META"),
    ("NVIDIA (NVDA)", "NVDA"),
    ("Tesla (TSLA)", "TSLA"),
];

/// Fixed set of instruments the tool will download and forecast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// The built-in big-tech allow-list.
    pub fn big_tech() -> Self {
        let entries = ENTRIES
            .iter()
            .filter_map(|&(label, ticker)| {
                Symbol::parse(ticker)
                    .ok()
                    .map(|symbol| CatalogEntry { label, symbol })
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.entries.iter().any(|entry| &entry.symbol == symbol)
    }

    /// Resolve user input given either as a ticker (`aapl`) or a display label
    /// (`Apple (AAPL)`).
    pub fn resolve(&self, input: &str) -> Result<Symbol, ValidationError> {
        let trimmed = input.trim();
        if let Some(entry) = self
            .entries
            .iter()
            .find(|entry| entry.label.eq_ignore_ascii_case(trimmed))
        {
            return Ok(entry.symbol.clone());
        }

        let symbol = Symbol::parse(trimmed)?;
        if self.contains(&symbol) {
            Ok(symbol)
        } else {
            Err(ValidationError::NotInCatalog {
                symbol: symbol.into(),
            })
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::big_tech()
    }
}
