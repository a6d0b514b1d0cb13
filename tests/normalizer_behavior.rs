//! Behavior-driven tests for the series normalizer.
//!
//! These tests describe WHAT a caller observes when raw downloads of varying
//! quality are turned into series.

use tickcast_core::{
    normalize, normalize_with_report, ColumnLabel, NormalizeError, PriceField, PricePoint,
    RawCell, RawFrame, RawRecord, Series, Symbol, TradeDate,
};

fn aapl() -> Symbol {
    Symbol::parse("AAPL").expect("valid symbol")
}

fn date(text: &str) -> TradeDate {
    TradeDate::parse(text).expect("valid date")
}

fn close_frame(rows: &[(&str, RawCell)]) -> RawFrame {
    RawFrame::new(aapl(), "Date", vec![ColumnLabel::simple("Close")]).with_records(
        rows.iter()
            .map(|(index, value)| RawRecord::new(*index, vec![value.clone()]))
            .collect(),
    )
}

fn pairs(series: &Series) -> Vec<(String, f64)> {
    series
        .points()
        .iter()
        .map(|point| (point.date.format_iso(), point.value))
        .collect()
}

fn assert_strictly_sorted(series: &Series) {
    assert!(
        series.points().windows(2).all(|pair| pair[0].date < pair[1].date),
        "series must be strictly increasing: {:?}",
        pairs(series)
    );
}

// =============================================================================
// Row-level exclusion
// =============================================================================

#[test]
fn when_a_close_is_nan_only_that_row_is_dropped() {
    // Given: three days, the middle one with a NaN close
    let frame = close_frame(&[
        ("2024-01-02", RawCell::Number(100.0)),
        ("2024-01-03", RawCell::Number(f64::NAN)),
        ("2024-01-04", RawCell::Number(102.0)),
    ]);

    // When: the frame is normalized
    let series = normalize(&frame, PriceField::Close).expect("usable data");

    // Then: the NaN day is absent and the others are unchanged
    assert_eq!(
        pairs(&series),
        vec![
            (String::from("2024-01-02"), 100.0),
            (String::from("2024-01-04"), 102.0)
        ]
    );
}

#[test]
fn when_values_are_non_numeric_text_other_rows_are_unaffected() {
    // Given: a mix of numeric and non-numeric text values
    let frame = close_frame(&[
        ("2024-02-01", RawCell::text("181.5")),
        ("2024-02-02", RawCell::text("n/a")),
        ("2024-02-05", RawCell::text("")),
        ("2024-02-06", RawCell::text("189.3")),
        ("2024-02-07", RawCell::Missing),
    ]);

    // When: normalizing
    let (series, report) = normalize_with_report(&frame, PriceField::Close).expect("usable");

    // Then: exactly the numeric rows survive with their values intact
    assert_eq!(
        pairs(&series),
        vec![
            (String::from("2024-02-01"), 181.5),
            (String::from("2024-02-06"), 189.3)
        ]
    );
    assert_eq!(report.invalid_values, 3);
    assert_eq!(report.unparseable_timestamps, 0);
}

#[test]
fn when_timestamps_do_not_parse_rows_are_excluded_silently() {
    // Given: rows with garbage and missing dates
    let frame = RawFrame::new(aapl(), "Date", vec![ColumnLabel::simple("Close")]).with_records(vec![
        RawRecord::new("not a date", vec![RawCell::Number(1.0)]),
        RawRecord::new(RawCell::Missing, vec![RawCell::Number(2.0)]),
        RawRecord::new("2024-03-01", vec![RawCell::Number(3.0)]),
    ]);

    // When / Then: normalization succeeds with the one good row
    let (series, report) = normalize_with_report(&frame, PriceField::Close).expect("usable");
    assert_eq!(series.len(), 1);
    assert_eq!(report.unparseable_timestamps, 2);
}

#[test]
fn when_values_are_negative_or_infinite_rows_are_excluded() {
    let frame = close_frame(&[
        ("2024-01-02", RawCell::Number(-5.0)),
        ("2024-01-03", RawCell::Number(f64::INFINITY)),
        ("2024-01-04", RawCell::Number(0.0)),
    ]);

    let series = normalize(&frame, PriceField::Close).expect("usable");
    assert_eq!(pairs(&series), vec![(String::from("2024-01-04"), 0.0)]);
}

// =============================================================================
// Ordering and duplicates
// =============================================================================

#[test]
fn when_rows_arrive_out_of_order_output_is_sorted() {
    let frame = close_frame(&[
        ("2024-01-05", RawCell::Number(5.0)),
        ("2024-01-02", RawCell::Number(2.0)),
        ("2024-01-04", RawCell::Number(4.0)),
        ("2024-01-03", RawCell::Number(3.0)),
    ]);

    let series = normalize(&frame, PriceField::Close).expect("usable");

    assert_strictly_sorted(&series);
    assert_eq!(series.values().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn when_dates_repeat_the_first_occurrence_is_kept() {
    // Given: the same date three times, plus mixed date formats resolving to it
    let frame = close_frame(&[
        ("2024-01-03", RawCell::Number(30.0)),
        ("2024-01-02", RawCell::Number(20.0)),
        ("2024-01-03 00:00:00-05:00", RawCell::Number(31.0)),
        ("2024-01-03T16:00:00Z", RawCell::Number(32.0)),
    ]);

    // When: normalizing
    let (series, report) = normalize_with_report(&frame, PriceField::Close).expect("usable");

    // Then: one entry per date; 2024-01-03 keeps the earliest input row
    assert_strictly_sorted(&series);
    assert_eq!(
        pairs(&series),
        vec![
            (String::from("2024-01-02"), 20.0),
            (String::from("2024-01-03"), 30.0)
        ]
    );
    assert_eq!(report.duplicates_dropped, 2);
}

#[test]
fn when_a_duplicate_first_occurrence_is_invalid_the_next_valid_one_wins() {
    let frame = close_frame(&[
        ("2024-01-03", RawCell::text("bad")),
        ("2024-01-03", RawCell::Number(33.0)),
        ("2024-01-03", RawCell::Number(34.0)),
    ]);

    let series = normalize(&frame, PriceField::Close).expect("usable");
    assert_eq!(pairs(&series), vec![(String::from("2024-01-03"), 33.0)]);
}

// =============================================================================
// Column resolution
// =============================================================================

#[test]
fn when_labels_are_grouped_for_one_instrument_output_matches_flat_labels() {
    // Given: the same rows under grouped and flat labels
    let columns = ["Open", "High", "Low", "Close", "Volume"];
    let records = vec![
        RawRecord::new(
            "2024-01-03",
            [184.2, 185.8, 183.4, 184.2, 5.8e7].map(RawCell::Number).to_vec(),
        ),
        RawRecord::new(
            "2024-01-02",
            [187.1, 188.4, 183.8, 185.6, 8.2e7].map(RawCell::Number).to_vec(),
        ),
    ];
    let grouped = RawFrame::new(
        aapl(),
        "Date",
        columns
            .iter()
            .map(|label| ColumnLabel::grouped([*label, "AAPL"]))
            .collect(),
    )
    .with_records(records.clone());
    let flat = RawFrame::new(
        aapl(),
        "Date",
        columns.iter().map(|label| ColumnLabel::simple(*label)).collect(),
    )
    .with_records(records);

    // When: both are normalized
    let from_grouped = normalize(&grouped, PriceField::Close).expect("usable");
    let from_flat = normalize(&flat, PriceField::Close).expect("usable");

    // Then: the series are identical, and identical to the explicitly flattened frame
    assert_eq!(from_grouped, from_flat);
    assert_eq!(
        normalize(&grouped.flattened(), PriceField::Close).expect("usable"),
        from_flat
    );
}

#[test]
fn when_another_field_is_selected_that_column_is_projected() {
    let frame = RawFrame::new(
        aapl(),
        "Date",
        vec![ColumnLabel::simple("Close"), ColumnLabel::simple("Adj Close")],
    )
    .with_records(vec![RawRecord::new(
        "2024-01-02",
        vec![RawCell::Number(185.6), RawCell::Number(184.9)],
    )]);

    let series = normalize(&frame, PriceField::AdjClose).expect("usable");
    assert_eq!(series.first().value, 184.9);
}

#[test]
fn when_the_value_column_is_absent_the_caller_gets_missing_column() {
    let frame = close_frame(&[("2024-01-02", RawCell::Number(1.0))]);
    let err = normalize(&frame, PriceField::Open).expect_err("must fail");
    assert!(matches!(err, NormalizeError::MissingColumn { field: PriceField::Open, .. }));
}

// =============================================================================
// Emptiness and idempotence
// =============================================================================

#[test]
fn when_every_row_is_invalid_no_usable_data_is_raised() {
    // Given: only invalid rows
    let frame = close_frame(&[
        ("2024-01-02", RawCell::Number(f64::NAN)),
        ("garbage", RawCell::Number(1.0)),
        ("2024-01-04", RawCell::Missing),
    ]);

    // When / Then: an explicit error, never an empty series
    let err = normalize(&frame, PriceField::Close).expect_err("must fail");
    assert_eq!(
        err,
        NormalizeError::NoUsableData {
            symbol: aapl(),
            field: PriceField::Close,
            rows_seen: 3,
        }
    );
}

#[test]
fn when_the_frame_has_no_rows_no_usable_data_is_raised() {
    let frame = close_frame(&[]);
    let err = normalize(&frame, PriceField::Close).expect_err("must fail");
    assert!(matches!(err, NormalizeError::NoUsableData { rows_seen: 0, .. }));
}

#[test]
fn when_a_normalized_series_is_normalized_again_it_is_unchanged() {
    // Given: a series already normalized from messy input
    let messy = close_frame(&[
        ("2024-01-04", RawCell::Number(102.0)),
        ("2024-01-02", RawCell::Number(100.0)),
        ("2024-01-03", RawCell::text("NaN")),
        ("2024-01-02", RawCell::Number(99.0)),
    ]);
    let once = normalize(&messy, PriceField::Close).expect("usable");

    // When: it is fed back through the normalizer
    let twice = normalize(&RawFrame::from_series(&once, PriceField::Close), PriceField::Close)
        .expect("usable");

    // Then: nothing changes
    assert_eq!(once, twice);
}

#[test]
fn any_input_with_a_valid_row_yields_a_sorted_unique_series() {
    // Deterministic sweep over shuffled, partially corrupted inputs.
    let base = date("2024-01-01");
    for seed in 1_u64..40 {
        let mut state = seed;
        let mut rows = Vec::new();
        for _ in 0..25 {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let day = (state >> 33) % 15;
            let kind = (state >> 20) % 5;
            let value = match kind {
                0 => RawCell::Number(f64::NAN),
                1 => RawCell::text("oops"),
                _ => RawCell::Number((state % 1000) as f64 / 10.0),
            };
            let when = base.plus_days(day as i64).expect("in range").format_iso();
            rows.push(RawRecord::new(RawCell::text(when), vec![value]));
        }
        rows.push(RawRecord::new(
            "2024-02-01",
            vec![RawCell::Number(1.0)],
        ));

        let frame = RawFrame::new(aapl(), "Date", vec![ColumnLabel::simple("Close")])
            .with_records(rows);
        let series = normalize(&frame, PriceField::Close).expect("at least one valid row");

        assert!(!series.is_empty());
        assert_strictly_sorted(&series);
        assert!(series
            .points()
            .iter()
            .all(|point| PricePoint::new(point.date, point.value).is_ok()));
    }
}
