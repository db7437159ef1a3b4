//! Unit tests for the time series normalizer

use chrono::{FixedOffset, TimeZone, Timelike, Utc};
use mafafx::models::PriceSeries;
use mafafx::services::normalizer::{fixed_offset_hours, normalize, FieldMap, NormalizeError};
use serde_json::json;

use crate::support::{candles, wib};

#[test]
fn test_normalize_twelve_data_records_sorted_ascending() {
    let records = vec![
        json!({"datetime": "2024-03-04 08:30:00", "open": "2101", "high": "2105", "low": "2099", "close": "2102"}),
        json!({"datetime": "2024-03-04 08:15:00", "open": "2100", "high": "2104", "low": "2098", "close": "2101"}),
        json!({"datetime": "2024-03-04 08:00:00", "open": "2099", "high": "2103", "low": "2097", "close": "2100"}),
    ];
    let series = normalize(&records, &FieldMap::TWELVE_DATA, false, wib()).unwrap();

    assert_eq!(series.closes(), vec![2100.0, 2101.0, 2102.0]);
    assert!(!series.is_inverse());
    let first = &series.candles()[0];
    assert_eq!(first.timestamp.offset(), &wib());
    assert_eq!(first.timestamp.hour(), 15);
}

#[test]
fn test_normalize_empty_payload() {
    assert_eq!(
        normalize(&[], &FieldMap::TWELVE_DATA, false, wib()),
        Err(NormalizeError::Empty)
    );
}

#[test]
fn test_normalize_missing_close() {
    let records = vec![
        json!({"datetime": "2024-03-04 08:00:00", "open": "1"}),
        json!({"datetime": "2024-03-04 08:15:00", "close": "1"}),
    ];
    let err = normalize(&records, &FieldMap::TWELVE_DATA, false, wib()).unwrap_err();
    assert_eq!(
        err,
        NormalizeError::MissingField {
            index: 0,
            field: "close"
        }
    );
}

#[test]
fn test_normalize_non_numeric_close() {
    let records = vec![
        json!({"datetime": "2024-03-04 08:00:00", "close": "1.5"}),
        json!({"datetime": "2024-03-04 08:15:00", "close": "n/a"}),
    ];
    let err = normalize(&records, &FieldMap::TWELVE_DATA, false, wib()).unwrap_err();
    assert!(matches!(err, NormalizeError::InvalidNumber { index: 1, field: "close", .. }));
}

#[test]
fn test_normalize_bad_timestamp() {
    let records = vec![
        json!({"datetime": "yesterday", "close": "1.5"}),
        json!({"datetime": "2024-03-04 08:15:00", "close": "1.6"}),
    ];
    let err = normalize(&records, &FieldMap::TWELVE_DATA, false, wib()).unwrap_err();
    assert!(matches!(err, NormalizeError::InvalidTimestamp { index: 0, .. }));
}

#[test]
fn test_normalize_extreme_epoch_is_invalid_timestamp() {
    for epoch in [i64::MIN, i64::MAX, i64::MIN + 1] {
        let records = vec![
            json!({"timestamp": epoch, "close": 1.0}),
            json!({"timestamp": 1, "close": 2.0}),
        ];
        let err = normalize(&records, &FieldMap::CANONICAL, false, wib()).unwrap_err();
        assert!(
            matches!(err, NormalizeError::InvalidTimestamp { index: 0, .. }),
            "epoch {} gave {:?}",
            epoch,
            err
        );

        let records = vec![
            json!({"timestamp": epoch.to_string(), "close": 1.0}),
            json!({"timestamp": 1, "close": 2.0}),
        ];
        let err = normalize(&records, &FieldMap::CANONICAL, false, wib()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidTimestamp { index: 0, .. }));
    }
}

#[test]
fn test_normalize_non_object_record() {
    let records = vec![json!([1, 2, 3])];
    let err = normalize(&records, &FieldMap::TWELVE_DATA, false, wib()).unwrap_err();
    assert_eq!(err, NormalizeError::NotAnObject { index: 0 });
}

#[test]
fn test_normalize_single_candle_is_insufficient() {
    let records = vec![json!({"datetime": "2024-03-04 08:00:00", "close": "1.5"})];
    let err = normalize(&records, &FieldMap::TWELVE_DATA, false, wib()).unwrap_err();
    assert_eq!(err, NormalizeError::InsufficientCandles(1));
}

#[test]
fn test_normalize_duplicate_timestamps_last_wins() {
    let records = vec![
        json!({"datetime": "2024-03-04 08:00:00", "close": "1.0"}),
        json!({"datetime": "2024-03-04 08:00:00", "close": "2.0"}),
        json!({"datetime": "2024-03-04 08:15:00", "close": "3.0"}),
    ];
    let series = normalize(&records, &FieldMap::TWELVE_DATA, false, wib()).unwrap();
    assert_eq!(series.closes(), vec![2.0, 3.0]);
}

#[test]
fn test_normalize_duplicates_collapsing_to_one_candle() {
    let records = vec![
        json!({"datetime": "2024-03-04 08:00:00", "close": "1.0"}),
        json!({"datetime": "2024-03-04 08:00:00", "close": "2.0"}),
    ];
    let err = normalize(&records, &FieldMap::TWELVE_DATA, false, wib()).unwrap_err();
    assert_eq!(err, NormalizeError::InsufficientCandles(1));
}

#[test]
fn test_normalize_epoch_numbers_and_partial_ohlc() {
    let records = vec![
        json!({"timestamp": 1709539200, "close": 4.21, "high": null}),
        json!({"timestamp": 1709540100_000_i64, "close": 4.25, "open": 4.22}),
    ];
    let series = normalize(&records, &FieldMap::CANONICAL, false, FixedOffset::east_opt(0).unwrap())
        .unwrap();

    let first = &series.candles()[0];
    assert_eq!(first.open, 4.21);
    assert_eq!(first.high, 4.21);
    assert_eq!(first.timestamp, Utc.timestamp_opt(1709539200, 0).unwrap());
    let second = &series.candles()[1];
    assert_eq!(second.timestamp, Utc.timestamp_opt(1709540100, 0).unwrap());
    assert!(second.low <= second.open && second.open <= second.high);
}

#[test]
fn test_normalize_rfc3339_keeps_instant() {
    let records = vec![
        json!({"datetime": "2024-03-04T08:00:00-05:00", "close": "1"}),
        json!({"datetime": "2024-03-04T14:00:00Z", "close": "2"}),
    ];
    let series = normalize(&records, &FieldMap::TWELVE_DATA, true, wib()).unwrap();
    assert!(series.is_inverse());
    assert_eq!(series.candles()[0].timestamp, Utc.with_ymd_and_hms(2024, 3, 4, 13, 0, 0).unwrap());
}

#[test]
fn test_candle_invariant_widened() {
    let series = PriceSeries::new(candles(&[1.0, 2.0]), false).unwrap();
    for candle in series.candles() {
        assert!(candle.low <= candle.open.min(candle.close));
        assert!(candle.high >= candle.open.max(candle.close));
    }
}

#[test]
fn test_fixed_offset_out_of_range_falls_back_to_utc() {
    assert_eq!(fixed_offset_hours(7).local_minus_utc(), 7 * 3600);
    assert_eq!(fixed_offset_hours(48).local_minus_utc(), 0);
}
