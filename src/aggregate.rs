//! Summary tables derived from cleaned listings.
//!
//! Every table is a pure function of the cleaned slice. Grouping goes through
//! a `BTreeMap` from group key to a running [`PriceTally`], so output rows come
//! back ordered by key regardless of input order.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{
    listing::Listing,
    table::{self, TableRow},
};

/// Model/year groups with fewer listings are left out of [`model_year_price_stats`].
pub const MIN_MODEL_YEAR_LISTINGS: usize = 5;
/// Minimum 4WD plus non-4WD listings for a model to enter the drive comparison.
pub const MIN_COMBINED_DRIVE_LISTINGS: usize = 10;
/// Minimum 4WD listings for a model to enter the drive comparison.
pub const MIN_4WD_LISTINGS: usize = 3;

const PRESERVED_MANUFACTURER: &str = "GMC";

/// Running price sum and count. The sum is widened so that any number of
/// `i64` prices can be added without overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceTally {
    pub total: i128,
    pub count: usize,
}

impl PriceTally {
    pub fn add(&mut self, price: i64) {
        self.total += i128::from(price);
        self.count += 1;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }

    /// Mean truncated toward zero.
    pub fn mean_truncated(&self) -> i64 {
        if self.count == 0 {
            0
        } else {
            // The mean of i64 values always fits back into i64.
            (self.total / self.count as i128) as i64
        }
    }
}

pub fn tally_by<'a, K, F>(listings: &'a [Listing], key: F) -> BTreeMap<K, PriceTally>
where
    K: Ord,
    F: Fn(&'a Listing) -> K,
{
    let mut groups: BTreeMap<K, PriceTally> = BTreeMap::new();
    for listing in listings {
        groups.entry(key(listing)).or_default().add(listing.price);
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelYearPriceStats {
    pub model: String,
    pub model_year: i64,
    pub average_price: i64,
    pub car_count: usize,
}

pub fn model_year_price_stats(listings: &[Listing]) -> Vec<ModelYearPriceStats> {
    tally_by(listings, |l| (l.model.as_str(), l.model_year))
        .into_iter()
        .filter(|(_, tally)| tally.count >= MIN_MODEL_YEAR_LISTINGS)
        .map(|((model, model_year), tally)| ModelYearPriceStats {
            model: model.to_string(),
            model_year,
            average_price: tally.mean_truncated(),
            car_count: tally.count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintColorStats {
    pub paint_color: String,
    pub car_count: usize,
    pub average_price: f64,
}

pub fn paint_color_stats(listings: &[Listing]) -> Vec<PaintColorStats> {
    tally_by(listings, |l| l.paint_color.as_str())
        .into_iter()
        .map(|(paint_color, tally)| PaintColorStats {
            paint_color: paint_color.to_string(),
            car_count: tally.count,
            average_price: tally.mean(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveTypeComparison {
    pub model: String,
    pub car_count_4wd: usize,
    pub average_price_4wd: f64,
    pub car_count_no_4wd: usize,
    pub average_price_no_4wd: f64,
    pub price_difference: f64,
}

/// Joins per-model 4WD and non-4WD tallies and keeps models with enough of both.
pub fn drive_type_comparison(listings: &[Listing]) -> Vec<DriveTypeComparison> {
    let groups = tally_by(listings, |l| (l.model.as_str(), l.is_4wd));
    let without_4wd: HashMap<&str, PriceTally> = groups
        .iter()
        .filter(|((_, is_4wd), _)| !is_4wd)
        .map(|((model, _), tally)| (*model, *tally))
        .collect();

    groups
        .iter()
        .filter(|((_, is_4wd), _)| *is_4wd)
        .filter_map(|((model, _), with)| {
            without_4wd
                .get(model)
                .map(|without| (*model, *with, *without))
        })
        .filter(|(_, with, without)| {
            with.count + without.count >= MIN_COMBINED_DRIVE_LISTINGS
                && with.count >= MIN_4WD_LISTINGS
        })
        .map(|(model, with, without)| DriveTypeComparison {
            model: model.to_string(),
            car_count_4wd: with.count,
            average_price_4wd: with.mean(),
            car_count_no_4wd: without.count,
            average_price_no_4wd: without.mean(),
            price_difference: with.mean() - without.mean(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManufacturerYearStats {
    pub manufacturer: String,
    pub model_year: i64,
    pub mean: f64,
    pub count: usize,
}

/// Groups on the raw manufacturer token; display names are applied afterwards,
/// so tokens differing only in case remain separate rows.
pub fn manufacturer_year_stats(listings: &[Listing]) -> Vec<ManufacturerYearStats> {
    tally_by(listings, |l| (l.manufacturer.as_str(), l.model_year))
        .into_iter()
        .map(|((manufacturer, model_year), tally)| ManufacturerYearStats {
            manufacturer: manufacturer_display_name(manufacturer),
            model_year,
            mean: tally.mean(),
            count: tally.count,
        })
        .collect()
}

pub fn manufacturer_display_name(raw: &str) -> String {
    if raw == PRESERVED_MANUFACTURER {
        PRESERVED_MANUFACTURER.to_string()
    } else {
        title_case(raw)
    }
}

/// Uppercases the first cased character of every run of cased characters and
/// lowercases the rest. Digits, punctuation and uncased letters (CJK, for
/// instance) all end a run.
pub fn title_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut in_word = false;
    for ch in value.chars() {
        if ch.is_uppercase() || ch.is_lowercase() {
            if in_word {
                output.extend(ch.to_lowercase());
            } else {
                output.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            output.push(ch);
            in_word = false;
        }
    }
    output
}

/// All four summary tables computed from one cleaned set.
#[derive(Debug, Clone, PartialEq)]
pub struct Summaries {
    pub model_year: Vec<ModelYearPriceStats>,
    pub paint_color: Vec<PaintColorStats>,
    pub drive_type: Vec<DriveTypeComparison>,
    pub manufacturer_year: Vec<ManufacturerYearStats>,
}

pub fn summarize(listings: &[Listing]) -> Summaries {
    Summaries {
        model_year: model_year_price_stats(listings),
        paint_color: paint_color_stats(listings),
        drive_type: drive_type_comparison(listings),
        manufacturer_year: manufacturer_year_stats(listings),
    }
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl TableRow for ModelYearPriceStats {
    fn headers() -> Vec<String> {
        headers(&["model", "model_year", "average_price", "car_count"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.model.clone(),
            self.model_year.to_string(),
            self.average_price.to_string(),
            self.car_count.to_string(),
        ]
    }
}

impl TableRow for PaintColorStats {
    fn headers() -> Vec<String> {
        headers(&["paint_color", "car_count", "average_price"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.paint_color.clone(),
            self.car_count.to_string(),
            table::format_price(self.average_price),
        ]
    }
}

impl TableRow for DriveTypeComparison {
    fn headers() -> Vec<String> {
        headers(&[
            "model",
            "car_count_4wd",
            "average_price_4wd",
            "car_count_no_4wd",
            "average_price_no_4wd",
            "price_difference",
        ])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.model.clone(),
            self.car_count_4wd.to_string(),
            table::format_price(self.average_price_4wd),
            self.car_count_no_4wd.to_string(),
            table::format_price(self.average_price_no_4wd),
            table::format_price(self.price_difference),
        ]
    }
}

impl TableRow for ManufacturerYearStats {
    fn headers() -> Vec<String> {
        headers(&["manufacturer", "model_year", "mean", "count"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.manufacturer.clone(),
            self.model_year.to_string(),
            table::format_price(self.mean),
            self.count.to_string(),
        ]
    }
}
