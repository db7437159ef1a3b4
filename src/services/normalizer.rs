//! Canonical parsing of upstream OHLC records into a [`PriceSeries`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::models::{Candle, PriceSeries};

/// Why a payload could not be turned into a price series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("upstream returned no records")]
    Empty,

    #[error("record {index} is not an object")]
    NotAnObject { index: usize },

    #[error("record {index} is missing field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index} has unparsable timestamp '{value}'")]
    InvalidTimestamp { index: usize, value: String },

    #[error("record {index} has non-numeric {field} '{value}'")]
    InvalidNumber {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("only {0} distinct candle(s), need at least 2")]
    InsufficientCandles(usize),
}

/// Field names a source uses for each OHLC component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub timestamp: &'static str,
    pub open: &'static str,
    pub high: &'static str,
    pub low: &'static str,
    pub close: &'static str,
}

impl FieldMap {
    /// Twelve Data `time_series` values.
    pub const TWELVE_DATA: FieldMap = FieldMap {
        timestamp: "datetime",
        open: "open",
        high: "high",
        low: "low",
        close: "close",
    };

    /// Records assembled by our own clients from columnar payloads.
    pub const CANONICAL: FieldMap = FieldMap {
        timestamp: "timestamp",
        open: "open",
        high: "high",
        low: "low",
        close: "close",
    };
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Fixed offset of `hours` east of UTC, falling back to UTC when out of range.
pub fn fixed_offset_hours(hours: i32) -> FixedOffset {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Normalize raw upstream records.
///
/// Naive timestamps are read as UTC and every timestamp is expressed in
/// `offset`. Only `close` is mandatory; a missing or unusable open/high/low
/// falls back to the close.
pub fn normalize(
    records: &[Value],
    fields: &FieldMap,
    inverse: bool,
    offset: FixedOffset,
) -> Result<PriceSeries, NormalizeError> {
    if records.is_empty() {
        return Err(NormalizeError::Empty);
    }

    let candles = records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_record(index, record, fields, offset))
        .collect::<Result<Vec<_>, _>>()?;

    PriceSeries::new(candles, inverse)
}

fn parse_record(
    index: usize,
    record: &Value,
    fields: &FieldMap,
    offset: FixedOffset,
) -> Result<Candle, NormalizeError> {
    let object = record
        .as_object()
        .ok_or(NormalizeError::NotAnObject { index })?;

    let raw_timestamp = object
        .get(fields.timestamp)
        .filter(|v| !v.is_null())
        .ok_or(NormalizeError::MissingField {
            index,
            field: fields.timestamp,
        })?;
    let timestamp = parse_timestamp(raw_timestamp, offset).ok_or_else(|| {
        NormalizeError::InvalidTimestamp {
            index,
            value: display_value(raw_timestamp),
        }
    })?;

    let raw_close = object
        .get(fields.close)
        .filter(|v| !v.is_null())
        .ok_or(NormalizeError::MissingField {
            index,
            field: "close",
        })?;
    let close = parse_number(raw_close).ok_or_else(|| NormalizeError::InvalidNumber {
        index,
        field: "close",
        value: display_value(raw_close),
    })?;

    let optional = |name: &str| object.get(name).and_then(parse_number).unwrap_or(close);

    Ok(Candle::new(
        optional(fields.open),
        optional(fields.high),
        optional(fields.low),
        close,
        timestamp,
    ))
}

fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn parse_timestamp(value: &Value, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::Number(n) => from_epoch(n.as_i64()?, offset),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(epoch) = s.parse::<i64>() {
                return from_epoch(epoch, offset);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&offset));
            }
            let naive = NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })?;
            Some(Utc.from_utc_datetime(&naive).with_timezone(&offset))
        }
        _ => None,
    }
}

fn from_epoch(epoch: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    // Values this large can only be milliseconds.
    let (secs, millis) = if epoch.unsigned_abs() > 100_000_000_000 {
        (epoch.div_euclid(1000), epoch.rem_euclid(1000))
    } else {
        (epoch, 0)
    };
    DateTime::from_timestamp(secs, (millis * 1_000_000) as u32).map(|dt| dt.with_timezone(&offset))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
