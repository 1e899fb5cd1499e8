//! Listing data model: the raw input table, the cleaned [`Listing`] record,
//! the condition/transmission vocabularies, and field coercion helpers.

use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::RecordError;

pub const MODEL: &str = "model";
pub const MODEL_YEAR: &str = "model_year";
pub const ODOMETER: &str = "odometer";
pub const IS_4WD: &str = "is_4wd";
pub const PRICE: &str = "price";
pub const PAINT_COLOR: &str = "paint_color";
pub const BODY_TYPE: &str = "type";
pub const TRANSMISSION: &str = "transmission";
pub const CONDITION: &str = "condition";
pub const DATE_POSTED: &str = "date_posted";
pub const DAYS_LISTED: &str = "days_listed";
pub const MANUFACTURER: &str = "manufacturer";
pub const YEAR_POSTED: &str = "year_posted";
pub const AGE: &str = "age";

/// Columns computed by cleaning; when present in the input they are recomputed.
pub const DERIVED_COLUMNS: [&str; 3] = [MANUFACTURER, YEAR_POSTED, AGE];

pub const UNKNOWN_PAINT_COLOR: &str = "unknown";

/// Text that pandas-style CSV readers treat as an absent value.
const MISSING_MARKERS: &[&str] = &["", "na", "n/a", "nan", "null", "none", "#n/a"];

/// Raw rows exactly as read from the input file.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn layout(&self) -> Result<ColumnLayout> {
        ColumnLayout::resolve(&self.headers)
    }
}

/// Positions of the known listing columns within a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub width: usize,
    pub model: usize,
    pub model_year: Option<usize>,
    pub odometer: Option<usize>,
    pub is_4wd: Option<usize>,
    pub price: usize,
    pub paint_color: Option<usize>,
    pub body_type: Option<usize>,
    pub transmission: Option<usize>,
    pub condition: Option<usize>,
    pub date_posted: usize,
    pub days_listed: Option<usize>,
    /// Columns outside the known set, carried through untouched.
    pub extras: Vec<usize>,
    /// Previously derived columns found in the input.
    pub derived: Vec<usize>,
}

impl ColumnLayout {
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| anyhow!("Input is missing required column '{name}'"))
        };

        const KNOWN: &[&str] = &[
            MODEL,
            MODEL_YEAR,
            ODOMETER,
            IS_4WD,
            PRICE,
            PAINT_COLOR,
            BODY_TYPE,
            TRANSMISSION,
            CONDITION,
            DATE_POSTED,
            DAYS_LISTED,
        ];
        let extras = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !KNOWN.contains(&h.trim()) && !DERIVED_COLUMNS.contains(&h.trim()))
            .map(|(idx, _)| idx)
            .collect();
        let derived = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| DERIVED_COLUMNS.contains(&h.trim()))
            .map(|(idx, _)| idx)
            .collect();

        Ok(Self {
            width: headers.len(),
            model: require(MODEL)?,
            model_year: find(MODEL_YEAR),
            odometer: find(ODOMETER),
            is_4wd: find(IS_4WD),
            price: require(PRICE)?,
            paint_color: find(PAINT_COLOR),
            body_type: find(BODY_TYPE),
            transmission: find(TRANSMISSION),
            condition: find(CONDITION),
            date_posted: require(DATE_POSTED)?,
            days_listed: find(DAYS_LISTED),
            extras,
            derived,
        })
    }

    /// Column indices that decide whether two rows are the same listing.
    pub fn identity_columns(&self) -> Vec<usize> {
        (0..self.width)
            .filter(|idx| *idx != self.date_posted && Some(*idx) != self.days_listed)
            .filter(|idx| !self.derived.contains(idx))
            .collect()
    }
}

/// Fetches a cell, treating absent columns and short rows as empty.
pub fn cell(row: &[String], index: Option<usize>) -> &str {
    index
        .and_then(|idx| row.get(idx))
        .map(|s| s.trim())
        .unwrap_or("")
}

/// Vehicle condition; the derived ordering runs from worst to best.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Condition {
    Salvage,
    Fair,
    Good,
    Excellent,
    LikeNew,
    New,
    Other(String),
}

impl Condition {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "salvage" => Condition::Salvage,
            "fair" => Condition::Fair,
            "good" => Condition::Good,
            "excellent" => Condition::Excellent,
            "like new" => Condition::LikeNew,
            "new" => Condition::New,
            _ => Condition::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Condition::Salvage => "salvage",
            Condition::Fair => "fair",
            Condition::Good => "good",
            Condition::Excellent => "excellent",
            Condition::LikeNew => "like new",
            Condition::New => "new",
            Condition::Other(text) => text,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Condition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Transmission {
    Automatic,
    Manual,
    Other(String),
}

impl Transmission {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "automatic" => Transmission::Automatic,
            "manual" => Transmission::Manual,
            _ => Transmission::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Transmission::Automatic => "automatic",
            Transmission::Manual => "manual",
            Transmission::Other(text) => text,
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Transmission {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One cleaned vehicle listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    /// 1-based position of the record in the input data.
    pub row: usize,
    pub model: String,
    pub manufacturer: String,
    pub model_year: i64,
    pub odometer: i64,
    pub is_4wd: bool,
    pub price: i64,
    pub paint_color: String,
    #[serde(rename = "type")]
    pub body_type: String,
    pub transmission: Transmission,
    pub condition: Condition,
    pub date_posted: NaiveDate,
    pub days_listed: String,
    pub year_posted: i32,
    pub age: i64,
    #[serde(skip)]
    pub extras: Vec<String>,
}

pub fn is_missing(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    MISSING_MARKERS.contains(&lowered.as_str())
}

/// First whitespace-delimited token of the model text.
pub fn manufacturer_of(model: &str) -> Result<&str, RecordError> {
    model
        .split_whitespace()
        .next()
        .ok_or(RecordError::EmptyModel)
}

/// Parses integer or decimal text, truncating decimals toward zero.
pub fn parse_integer(column: &'static str, value: &str) -> Result<Option<i64>, RecordError> {
    if is_missing(value) {
        return Ok(None);
    }
    let trimmed = value.trim();
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Ok(Some(parsed));
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(Some(parsed.trunc() as i64)),
        _ => Err(RecordError::InvalidNumber {
            column,
            value: trimmed.to_string(),
        }),
    }
}

/// Reads the 4WD flag from words or numbers; any non-zero number is true.
pub fn parse_flag(column: &'static str, value: &str) -> Result<Option<bool>, RecordError> {
    if is_missing(value) {
        return Ok(None);
    }
    let lowered = value.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "true" | "t" | "yes" | "y" => Ok(Some(true)),
        "false" | "f" | "no" | "n" => Ok(Some(false)),
        _ => parse_integer(column, &lowered).map(|parsed| parsed.map(|v| v != 0)),
    }
}

pub fn parse_listing_date(value: &str) -> Result<NaiveDate, RecordError> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    let trimmed = value.trim();
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(parsed);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(parsed.date());
        }
    }
    Err(RecordError::InvalidDate {
        value: trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn layout_requires_model_price_and_date() {
        let err = ColumnLayout::resolve(&headers(&["model", "price"])).unwrap_err();
        assert!(err.to_string().contains("date_posted"));

        let layout =
            ColumnLayout::resolve(&headers(&["price", "model", "fuel", "date_posted"])).unwrap();
        assert_eq!(layout.model, 1);
        assert_eq!(layout.price, 0);
        assert_eq!(layout.model_year, None);
        assert_eq!(layout.extras, vec![2]);
    }

    #[test]
    fn identity_columns_skip_posting_fields() {
        let layout = ColumnLayout::resolve(&headers(&[
            "price",
            "model",
            "date_posted",
            "days_listed",
            "fuel",
        ]))
        .unwrap();
        assert_eq!(layout.identity_columns(), vec![0, 1, 4]);
    }

    #[test]
    fn derived_columns_are_neither_extras_nor_identity() {
        let layout = ColumnLayout::resolve(&headers(&[
            "price",
            "model",
            "date_posted",
            "manufacturer",
            "age",
        ]))
        .unwrap();
        assert!(layout.extras.is_empty());
        assert_eq!(layout.derived, vec![3, 4]);
        assert_eq!(layout.identity_columns(), vec![0, 1]);
    }

    #[test]
    fn manufacturer_is_first_token() {
        assert_eq!(manufacturer_of("ford f-150").unwrap(), "ford");
        assert_eq!(manufacturer_of("  chevrolet   silverado 1500").unwrap(), "chevrolet");
        assert_eq!(manufacturer_of("   "), Err(RecordError::EmptyModel));
    }

    #[test]
    fn parse_integer_accepts_decimal_text() {
        assert_eq!(parse_integer(MODEL_YEAR, "2011.0").unwrap(), Some(2011));
        assert_eq!(parse_integer(ODOMETER, " 145000 ").unwrap(), Some(145000));
        assert_eq!(parse_integer(ODOMETER, "NaN").unwrap(), None);
        assert_eq!(parse_integer(ODOMETER, "").unwrap(), None);
        assert!(matches!(
            parse_integer(PRICE, "cheap"),
            Err(RecordError::InvalidNumber { column: PRICE, .. })
        ));
    }

    #[test]
    fn parse_flag_handles_numeric_and_words() {
        assert_eq!(parse_flag(IS_4WD, "1.0").unwrap(), Some(true));
        assert_eq!(parse_flag(IS_4WD, "0").unwrap(), Some(false));
        assert_eq!(parse_flag(IS_4WD, "2").unwrap(), Some(true));
        assert_eq!(parse_flag(IS_4WD, "Yes").unwrap(), Some(true));
        assert_eq!(parse_flag(IS_4WD, "").unwrap(), None);
        assert!(parse_flag(IS_4WD, "maybe").is_err());
    }

    #[test]
    fn parse_listing_date_supports_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2019, 3, 1).unwrap();
        assert_eq!(parse_listing_date("2019-03-01").unwrap(), expected);
        assert_eq!(parse_listing_date("03/01/2019").unwrap(), expected);
        assert_eq!(parse_listing_date("2019-03-01T08:15:00").unwrap(), expected);
        assert!(matches!(
            parse_listing_date("last tuesday"),
            Err(RecordError::InvalidDate { .. })
        ));
    }

    #[test]
    fn condition_orders_from_salvage_to_new() {
        let mut conditions = vec![
            Condition::parse("new"),
            Condition::parse("Like New"),
            Condition::parse("salvage"),
            Condition::parse("good"),
        ];
        conditions.sort();
        let names: Vec<&str> = conditions.iter().map(Condition::as_str).collect();
        assert_eq!(names, vec!["salvage", "good", "like new", "new"]);
        assert!(Condition::parse("mint") > Condition::New);
    }

    #[test]
    fn transmission_keeps_unknown_text() {
        assert_eq!(Transmission::parse("Automatic"), Transmission::Automatic);
        assert_eq!(
            Transmission::parse("other"),
            Transmission::Other("other".to_string())
        );
    }
}
