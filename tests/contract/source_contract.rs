use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tickcast_core::{
    normalize, CsvFileSource, DataSource, HistoryRequest, HttpClient, HttpError, HttpRequest,
    HttpResponse, PriceField, SourceErrorKind, SourceId, Symbol, TradeDate, YahooAdapter,
};

const CHART_BODY: &str = r#"{"chart":{"result":[{"meta":{"symbol":"AAPL"},
    "timestamp":[1704205800,1704292200,1704378600],
    "indicators":{"quote":[{"open":[187.1,184.2,182.1],"high":[188.4,185.8,183.0],
    "low":[183.8,183.4,180.8],"close":[185.6,184.2,181.9],"volume":[82488700,58414500,71983600]}],
    "adjclose":[{"adjclose":[184.9,183.5,181.2]}]}}],"error":null}}"#;

const CSV_BODY: &str = "\
Price,Adj Close,Close,High,Low,Open,Volume
Ticker,AAPL,AAPL,AAPL,AAPL,AAPL,AAPL
Date,,,,,,
2024-01-02,184.9,185.6,188.4,183.8,187.1,82488700
2024-01-03,183.5,184.2,185.8,183.4,184.2,58414500
2024-01-04,181.2,181.9,183.0,180.8,182.1,71983600
";

struct CannedHttpClient {
    response: Result<HttpResponse, HttpError>,
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

struct SourceCase {
    id: SourceId,
    source: Arc<dyn DataSource>,
    _dir: Option<tempfile::TempDir>,
}

fn yahoo_case(response: Result<HttpResponse, HttpError>) -> SourceCase {
    SourceCase {
        id: SourceId::Yahoo,
        source: Arc::new(YahooAdapter::with_http_client(Arc::new(CannedHttpClient {
            response,
        }))),
        _dir: None,
    }
}

fn csv_case(files: &[(&str, &str)]) -> SourceCase {
    let dir = tempfile::tempdir().expect("temp dir");
    for (name, body) in files {
        std::fs::write(dir.path().join(name), body).expect("write csv");
    }
    SourceCase {
        id: SourceId::Csv,
        source: Arc::new(CsvFileSource::new(dir.path())),
        _dir: Some(dir),
    }
}

fn healthy_cases() -> Vec<SourceCase> {
    vec![
        yahoo_case(Ok(HttpResponse::new(200, CHART_BODY))),
        csv_case(&[("AAPL.csv", CSV_BODY)]),
    ]
}

fn request(ticker: &str) -> HistoryRequest {
    let start = TradeDate::from_ymd(2024, 1, 1).expect("valid");
    let end = TradeDate::from_ymd(2024, 1, 5).expect("valid");
    HistoryRequest::starting(Symbol::parse(ticker).expect("valid symbol"), start)
        .with_end(end)
        .expect("ordered window")
}

#[tokio::test]
async fn every_source_reports_its_identifier() {
    let ids = healthy_cases()
        .iter()
        .map(|case| case.source.id())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![SourceId::Yahoo, SourceId::Csv]);
    for case in healthy_cases() {
        assert_eq!(case.source.id(), case.id);
    }
}

#[tokio::test]
async fn every_source_yields_a_frame_for_the_requested_symbol() {
    for case in healthy_cases() {
        let frame = case
            .source
            .history(request("AAPL"))
            .await
            .unwrap_or_else(|error| panic!("source '{}' history failed: {error}", case.id));

        assert_eq!(frame.symbol().as_str(), "AAPL", "source '{}': symbol", case.id);
        assert_eq!(frame.len(), 3, "source '{}': row count", case.id);
        assert!(
            frame.columns().iter().any(|label| label.base() == "Close"),
            "source '{}': close column present",
            case.id
        );
    }
}

#[tokio::test]
async fn every_source_normalizes_to_the_same_series() {
    let mut normalized = Vec::new();
    for case in healthy_cases() {
        let frame = case.source.history(request("AAPL")).await.expect("history");
        for field in [PriceField::Close, PriceField::AdjClose, PriceField::Volume] {
            let series = normalize(&frame, field)
                .unwrap_or_else(|error| panic!("source '{}' {field}: {error}", case.id));
            normalized.push((case.id, field, series));
        }
    }

    let (yahoo, csv): (Vec<_>, Vec<_>) = normalized
        .into_iter()
        .partition(|(id, _, _)| *id == SourceId::Yahoo);
    for ((_, field, from_yahoo), (_, _, from_csv)) in yahoo.iter().zip(csv.iter()) {
        assert_eq!(from_yahoo, from_csv, "{field} differs between sources");
    }
    assert_eq!(
        yahoo[0]
            .2
            .points()
            .iter()
            .map(|point| point.date.format_iso())
            .collect::<Vec<_>>(),
        vec!["2024-01-02", "2024-01-03", "2024-01-04"]
    );
}

#[tokio::test]
async fn every_source_reports_failures_as_unavailable() {
    let failing = vec![
        yahoo_case(Err(HttpError::Connect(String::from("connection reset")))),
        yahoo_case(Ok(HttpResponse::new(503, "busy"))),
        csv_case(&[]),
    ];

    for case in failing {
        let error = case
            .source
            .history(request("AAPL"))
            .await
            .expect_err("history must fail");
        assert_eq!(
            error.kind(),
            SourceErrorKind::Unavailable,
            "source '{}': kind",
            case.id
        );
        assert_eq!(error.code(), "source.unavailable");
    }
}
