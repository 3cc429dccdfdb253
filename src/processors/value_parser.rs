//! Per-cell coercions used by the join and the cleaner.
//!
//! Each function answers with a value or `None`; deciding what to do with an
//! absent value is left to the caller.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::CellValue;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Canonical text form of a key or code cell.
///
/// Integers and integral floats print the same way, so `42`, `42.0` and
/// `"42"` compare equal once canonicalised.
pub fn canonical_text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Null => None,
        CellValue::Text(text) => Some(text.clone()),
        CellValue::Bytes(bytes) => {
            let (decoded, _, _) = encoding_rs::UTF_8.decode(bytes);
            Some(decoded.into_owned())
        }
        CellValue::Int(v) => Some(v.to_string()),
        CellValue::Float(v) if !v.is_finite() => None,
        CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
            Some(format!("{}", *v as i64))
        }
        CellValue::Float(v) => Some(v.to_string()),
        CellValue::Bool(v) => Some(v.to_string()),
        CellValue::Date(v) => Some(v.to_string()),
        CellValue::Timestamp(v) => Some(v.to_string()),
    }
}

/// Numeric price, or `None` when the cell is not a finite number.
pub fn parse_price(value: &CellValue) -> Option<f64> {
    let price = match value {
        CellValue::Int(v) => *v as f64,
        CellValue::Float(v) => *v,
        CellValue::Text(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    price.is_finite().then_some(price)
}

/// Calendar date of a sale, or `None` when the cell is not a recognisable date.
pub fn parse_sale_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(date) => Some(*date),
        CellValue::Timestamp(ts) => Some(ts.date()),
        CellValue::Text(text) => parse_date_text(text.trim()),
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ts.date());
        }
    }

    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|ts| ts.date_naive())
}
