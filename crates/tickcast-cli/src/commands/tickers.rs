use serde::Serialize;

use super::{CommandData, CommandResult, Context};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerRow {
    pub label: String,
    pub symbol: String,
}

pub fn run(context: &Context) -> CommandResult {
    let rows = context
        .service
        .catalog()
        .entries()
        .iter()
        .map(|entry| TickerRow {
            label: entry.label.to_owned(),
            symbol: entry.symbol.as_str().to_owned(),
        })
        .collect();

    CommandResult::ok(CommandData::Tickers(rows)).with_cache_hit(true)
}
