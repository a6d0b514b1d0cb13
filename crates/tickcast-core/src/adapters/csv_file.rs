use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use csv::{ReaderBuilder, StringRecord};

use crate::data_source::{DataSource, HistoryRequest, SourceError, SourceId};
use crate::domain::fold_label;
use crate::{ColumnLabel, RawCell, RawFrame, RawRecord, Symbol};

const INDEX_LABELS: [&str; 3] = ["date", "datetime", "timestamp"];

/// Local CSV exports, one `<SYMBOL>.csv` per instrument.
///
/// Accepts a plain single header row or the three-row header written by
/// multi-instrument downloads:
///
/// ```text
/// Price,Close,High,Low,Open,Volume
/// Ticker,AAPL,AAPL,AAPL,AAPL,AAPL
/// Date,,,,,
/// 2024-01-02,185.6,188.4,183.8,187.1,82488700
/// ```
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    directory: PathBuf,
}

impl CsvFileSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.directory.join(format!("{}.csv", symbol.as_str()))
    }

    async fn load(&self, req: HistoryRequest) -> Result<RawFrame, SourceError> {
        let path = self.path_for(&req.symbol);
        tracing::info!(symbol = %req.symbol, path = %path.display(), "reading csv history");

        let body = tokio::fs::read_to_string(&path).await.map_err(|e| {
            SourceError::unavailable(format!("cannot read {}: {e}", path.display()))
        })?;

        parse_csv(req.symbol, &body)
    }
}

impl DataSource for CsvFileSource {
    fn id(&self) -> SourceId {
        SourceId::Csv
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawFrame, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.load(req).await })
    }
}

/// Parse CSV text into a raw frame for `symbol`.
pub fn parse_csv(symbol: Symbol, body: &str) -> Result<RawFrame, SourceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let rows = reader
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()
        .map_err(|e| SourceError::internal(format!("csv parse failed for {symbol}: {e}")))?;

    let mut rows = rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| SourceError::unavailable(format!("csv for {symbol} is empty")))?;
    let mut rows = rows.peekable();

    let ticker_row = rows
        .peek()
        .filter(|row| row.get(0).is_some_and(|cell| cell.eq_ignore_ascii_case("ticker")))
        .cloned();
    if ticker_row.is_some() {
        rows.next();
    }

    let mut index_label = header.get(0).unwrap_or("Date").to_owned();
    if ticker_row.is_some() {
        let placeholder = rows
            .peek()
            .filter(|row| is_index_placeholder(row))
            .map(|row| row.get(0).unwrap_or("Date").to_owned());
        if let Some(label) = placeholder {
            index_label = label;
            rows.next();
        } else {
            index_label = String::from("Date");
        }
    }

    let index_column = if ticker_row.is_some() {
        0
    } else {
        header
            .iter()
            .position(|label| INDEX_LABELS.contains(&fold_label(label).as_str()))
            .unwrap_or(0)
    };
    if ticker_row.is_none() {
        index_label = header.get(index_column).unwrap_or("Date").to_owned();
    }

    let columns = header
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != index_column)
        .map(|(position, label)| match &ticker_row {
            Some(tickers) => ColumnLabel::grouped([label, tickers.get(position).unwrap_or("")]),
            None => ColumnLabel::simple(label),
        })
        .collect::<Vec<_>>();

    let records = rows
        .map(|row| {
            let index = to_cell(row.get(index_column));
            let cells = (0..header.len())
                .filter(|position| *position != index_column)
                .map(|position| to_cell(row.get(position)))
                .collect();
            RawRecord::new(index, cells)
        })
        .collect();

    Ok(RawFrame::new(symbol, index_label, columns).with_records(records))
}

fn is_index_placeholder(row: &StringRecord) -> bool {
    let mut cells = row.iter();
    let first = cells.next().map(fold_label).unwrap_or_default();
    INDEX_LABELS.contains(&first.as_str()) && cells.all(str::is_empty)
}

fn to_cell(value: Option<&str>) -> RawCell {
    match value {
        Some(text) if !text.is_empty() => RawCell::text(text),
        _ => RawCell::Missing,
    }
}
