//! The cleaning pipeline.
//!
//! [`clean()`] turns a [`RawTable`] into [`Listing`] records in one ordered
//! pass:
//!
//! 1. drop duplicates judged on every column except `date_posted` and
//!    `days_listed` (first occurrence wins),
//! 2. derive `manufacturer` from the model text,
//! 3. fill and coerce `model_year` and `odometer`,
//! 4. fill and coerce `is_4wd`,
//! 5. drop rows outside the model-year, odometer and price ranges,
//! 6. parse `date_posted`,
//! 7. derive `year_posted` and `age`,
//! 8. default `paint_color` and lowercase the body type.
//!
//! Malformed records are dropped and counted; they never abort the run.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashSet},
};

use anyhow::{Context, Result};
use chrono::Datelike;
use log::{debug, info};
use serde::Serialize;

use crate::{
    cli::{CleanArgs, InputArgs, MissingNumeric},
    error::RecordError,
    io_utils,
    listing::{
        self, ColumnLayout, Condition, DERIVED_COLUMNS, Listing, RawTable, Transmission,
        UNKNOWN_PAINT_COLOR, cell,
    },
    table::{self, Tabular},
};

pub const MIN_MODEL_YEAR: i64 = 1950;
pub const MAX_ODOMETER: i64 = 600_000;
pub const MAX_PRICE: i64 = 79_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanOptions {
    pub missing_numeric: MissingNumeric,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub rows_read: usize,
    pub duplicates_removed: usize,
    /// Rejected records keyed by [`RecordError::reason`].
    pub rejected: BTreeMap<&'static str, usize>,
    pub out_of_range: usize,
    pub rows_kept: usize,
}

impl CleanSummary {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

impl Tabular for CleanSummary {
    fn headers(&self) -> Vec<String> {
        vec!["stage".to_string(), "rows".to_string()]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let mut rows = vec![
            vec!["read".to_string(), self.rows_read.to_string()],
            vec!["duplicates".to_string(), self.duplicates_removed.to_string()],
        ];
        for (reason, count) in &self.rejected {
            rows.push(vec![format!("rejected: {reason}"), count.to_string()]);
        }
        rows.push(vec!["out of range".to_string(), self.out_of_range.to_string()]);
        rows.push(vec!["kept".to_string(), self.rows_kept.to_string()]);
        rows
    }
}

#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    pub listings: Vec<Listing>,
    pub summary: CleanSummary,
}

impl From<&InputArgs> for CleanOptions {
    fn from(args: &InputArgs) -> Self {
        Self {
            missing_numeric: args.missing_numeric,
        }
    }
}

/// Loads the input named by `args` and cleans it.
pub fn load_and_clean(args: &InputArgs) -> Result<(RawTable, CleanOutcome)> {
    let table = io_utils::load_raw_table(
        &args.input,
        args.delimiter,
        args.input_encoding.as_deref(),
    )?;
    let outcome = clean(&table, &CleanOptions::from(args))
        .with_context(|| format!("Cleaning listings from {:?}", args.input))?;
    Ok((table, outcome))
}

pub fn clean(table: &RawTable, options: &CleanOptions) -> Result<CleanOutcome> {
    let layout = table.layout()?;
    let mut summary = CleanSummary {
        rows_read: table.rows.len(),
        ..CleanSummary::default()
    };

    let unique = deduplicate(&table.rows, &layout);
    summary.duplicates_removed = table.rows.len() - unique.len();

    let mut listings = Vec::with_capacity(unique.len());
    for (row_idx, raw) in unique {
        let row_number = row_idx + 1;
        match clean_record(row_number, raw, &layout, options) {
            Ok(Some(listing)) => listings.push(listing),
            Ok(None) => summary.out_of_range += 1,
            Err(err) => {
                debug!("Dropping row {row_number}: {err}");
                *summary.rejected.entry(err.reason()).or_default() += 1;
            }
        }
    }
    summary.rows_kept = listings.len();

    info!(
        "Cleaned {} row(s): {} duplicate(s), {} rejected, {} out of range, {} kept",
        summary.rows_read,
        summary.duplicates_removed,
        summary.rejected_total(),
        summary.out_of_range,
        summary.rows_kept
    );
    Ok(CleanOutcome { listings, summary })
}

/// Keeps the first row of every identity group, preserving input order.
fn deduplicate<'a>(rows: &'a [Vec<String>], layout: &ColumnLayout) -> Vec<(usize, &'a [String])> {
    let identity = layout.identity_columns();
    let numeric = [layout.model_year, layout.odometer, layout.is_4wd, Some(layout.price)];
    let mut seen: HashSet<Vec<Option<Cow<'a, str>>>> = HashSet::with_capacity(rows.len());
    let mut unique = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let key = identity
            .iter()
            .map(|column| {
                identity_token(cell(row, Some(*column)), numeric.contains(&Some(*column)))
            })
            .collect::<Vec<_>>();
        if seen.insert(key) {
            unique.push((idx, row.as_slice()));
        }
    }
    unique
}

/// Comparable form of one identity cell. Every missing marker maps to `None`
/// and numeric cells compare by value, so `2015` matches `2015.0`.
fn identity_token(value: &str, numeric: bool) -> Option<Cow<'_, str>> {
    if listing::is_missing(value) {
        return None;
    }
    match value.parse::<f64>() {
        Ok(parsed) if numeric => Some(Cow::Owned(parsed.to_string())),
        _ => Some(Cow::Borrowed(value)),
    }
}

/// Runs steps 2–8 on one deduplicated row. `Ok(None)` means a range filter
/// dropped it.
fn clean_record(
    row_number: usize,
    raw: &[String],
    layout: &ColumnLayout,
    options: &CleanOptions,
) -> Result<Option<Listing>, RecordError> {
    let model = cell(raw, Some(layout.model));
    let manufacturer = listing::manufacturer_of(model)?;

    let model_year = fill_numeric(
        listing::MODEL_YEAR,
        cell(raw, layout.model_year),
        options.missing_numeric,
    )?;
    let odometer = fill_numeric(
        listing::ODOMETER,
        cell(raw, layout.odometer),
        options.missing_numeric,
    )?;
    let is_4wd = listing::parse_flag(listing::IS_4WD, cell(raw, layout.is_4wd))?.unwrap_or(false);
    let price = listing::parse_integer(listing::PRICE, cell(raw, Some(layout.price)))?
        .ok_or(RecordError::MissingValue {
            column: listing::PRICE,
        })?;

    if model_year < MIN_MODEL_YEAR || odometer > MAX_ODOMETER || price > MAX_PRICE {
        debug!(
            "Filtering row {row_number}: model_year={model_year} odometer={odometer} price={price}"
        );
        return Ok(None);
    }

    let date_posted = listing::parse_listing_date(cell(raw, Some(layout.date_posted)))?;
    let year_posted = date_posted.year();
    let age = i64::from(year_posted) - model_year;

    let paint_color = match cell(raw, layout.paint_color) {
        value if listing::is_missing(value) => UNKNOWN_PAINT_COLOR.to_string(),
        value => value.to_string(),
    };

    Ok(Some(Listing {
        row: row_number,
        model: model.to_string(),
        manufacturer: manufacturer.to_string(),
        model_year,
        odometer,
        is_4wd,
        price,
        paint_color,
        body_type: cell(raw, layout.body_type).to_lowercase(),
        transmission: Transmission::parse(cell(raw, layout.transmission)),
        condition: Condition::parse(cell(raw, layout.condition)),
        date_posted,
        days_listed: cell(raw, layout.days_listed).to_string(),
        year_posted,
        age,
        extras: layout
            .extras
            .iter()
            .map(|idx| cell(raw, Some(*idx)).to_string())
            .collect(),
    }))
}

fn fill_numeric(
    column: &'static str,
    value: &str,
    policy: MissingNumeric,
) -> Result<i64, RecordError> {
    match (listing::parse_integer(column, value)?, policy) {
        (Some(parsed), _) => Ok(parsed),
        (None, MissingNumeric::Zero) => Ok(0),
        (None, MissingNumeric::Reject) => Err(RecordError::MissingValue { column }),
    }
}

/// Input headers (minus stale derived columns) followed by the derived ones.
pub fn output_headers(headers: &[String], layout: &ColumnLayout) -> Vec<String> {
    headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| !layout.derived.contains(idx))
        .map(|(_, h)| h.clone())
        .chain(DERIVED_COLUMNS.iter().map(|name| name.to_string()))
        .collect()
}

/// Renders a listing in the column order of [`output_headers`].
pub fn output_record(listing: &Listing, layout: &ColumnLayout) -> Vec<String> {
    let mut values = vec![String::new(); layout.width];
    values[layout.model] = listing.model.clone();
    values[layout.price] = listing.price.to_string();
    values[layout.date_posted] = listing.date_posted.format("%Y-%m-%d").to_string();
    let optional = [
        (layout.model_year, listing.model_year.to_string()),
        (layout.odometer, listing.odometer.to_string()),
        (layout.is_4wd, u8::from(listing.is_4wd).to_string()),
        (layout.paint_color, listing.paint_color.clone()),
        (layout.body_type, listing.body_type.clone()),
        (layout.transmission, listing.transmission.to_string()),
        (layout.condition, listing.condition.to_string()),
        (layout.days_listed, listing.days_listed.clone()),
    ];
    for (index, value) in optional {
        if let Some(idx) = index {
            values[idx] = value;
        }
    }
    for (idx, value) in layout.extras.iter().zip(&listing.extras) {
        values[*idx] = value.clone();
    }

    let mut record = values
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !layout.derived.contains(idx))
        .map(|(_, value)| value)
        .collect::<Vec<_>>();
    record.push(listing.manufacturer.clone());
    record.push(listing.year_posted.to_string());
    record.push(listing.age.to_string());
    record
}

pub fn execute(args: &CleanArgs) -> Result<()> {
    let (table, outcome) = load_and_clean(&args.input)?;
    let layout = table.layout()?;

    let mut writer = io_utils::open_csv_writer(args.output.as_deref())?;
    writer
        .write_record(output_headers(&table.headers, &layout))
        .context("Writing output headers")?;
    for listing in &outcome.listings {
        writer
            .write_record(output_record(listing, &layout))
            .with_context(|| format!("Writing cleaned row {}", listing.row))?;
    }
    writer.flush().context("Flushing output writer")?;

    if let Some(path) = args.output.as_deref().filter(|p| !io_utils::is_dash(p)) {
        table::print_table(&outcome.summary);
        info!(
            "Wrote {} cleaned row(s) with {} -> {:?}",
            outcome.listings.len(),
            DERIVED_COLUMNS.join(", "),
            path
        );
    }
    Ok(())
}
