//! Chart-ready subsets of the summary tables and the transmission price
//! histogram.

use itertools::Itertools;
use serde::Serialize;

use crate::{
    aggregate::{ManufacturerYearStats, ModelYearPriceStats, PaintColorStats},
    cli::ManufacturerWindow,
    listing::Listing,
    table::{self, TableRow},
};

pub const DEFAULT_TOP_MODELS: usize = 100;
pub const DEFAULT_PRICE_BINS: u16 = 20;
pub const MODERN_AFTER_MODEL_YEAR: i64 = 1999;
pub const MANUFACTURER_PRICE_CEILING: f64 = 40_000.0;

pub const PAINT_COLOR_ORDER: [&str; 13] = [
    "red", "blue", "green", "yellow", "orange", "brown", "purple", "black", "white", "silver",
    "grey", "custom", "unknown",
];

/// The `n` model/year groups with the highest average price, most expensive first.
pub fn most_expensive(stats: &[ModelYearPriceStats], n: usize) -> Vec<ModelYearPriceStats> {
    stats
        .iter()
        .sorted_by(|a, b| b.average_price.cmp(&a.average_price))
        .take(n)
        .cloned()
        .collect()
}

pub fn modern(stats: &[ModelYearPriceStats]) -> Vec<ModelYearPriceStats> {
    stats
        .iter()
        .filter(|row| row.model_year > MODERN_AFTER_MODEL_YEAR)
        .cloned()
        .collect()
}

pub fn manufacturer_window(
    stats: &[ManufacturerYearStats],
    window: ManufacturerWindow,
) -> Vec<ManufacturerYearStats> {
    stats
        .iter()
        .filter(|row| match window {
            ManufacturerWindow::All => true,
            ManufacturerWindow::Since1990 => {
                row.model_year >= 1990 && row.mean <= MANUFACTURER_PRICE_CEILING
            }
            ManufacturerWindow::Since2010 => row.model_year >= 2010,
        })
        .cloned()
        .collect()
}

/// Paint colours in display order; colours outside the palette follow alphabetically.
pub fn paint_color_display_order(stats: &[PaintColorStats]) -> Vec<PaintColorStats> {
    stats
        .iter()
        .sorted_by_key(|row| {
            let rank = PAINT_COLOR_ORDER
                .iter()
                .position(|color| *color == row.paint_color)
                .unwrap_or(PAINT_COLOR_ORDER.len());
            (rank, row.paint_color.clone())
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBin {
    pub transmission: String,
    pub bin_start: f64,
    pub bin_end: f64,
    pub car_count: usize,
}

/// Counts listings per transmission in `bins` equal-width price bins spanning
/// the cleaned price range. The top edge falls into the last bin.
pub fn price_histogram(listings: &[Listing], bins: u16) -> Vec<PriceBin> {
    let bins = usize::from(bins.max(1));
    let Some((min, max)) = listings
        .iter()
        .map(|l| l.price)
        .minmax()
        .into_option()
    else {
        return Vec::new();
    };
    let (low, high) = (min as f64, max as f64);
    let width = if high > low {
        (high - low) / bins as f64
    } else {
        1.0
    };

    let groups = listings.iter().into_group_map_by(|l| l.transmission.clone());
    groups
        .into_iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .flat_map(|(transmission, members)| {
            let mut counts = vec![0usize; bins];
            for listing in members {
                let slot = ((listing.price as f64 - low) / width).floor() as usize;
                counts[slot.min(bins - 1)] += 1;
            }
            counts
                .into_iter()
                .enumerate()
                .map(move |(idx, car_count)| PriceBin {
                    transmission: transmission.to_string(),
                    bin_start: low + width * idx as f64,
                    bin_end: low + width * (idx + 1) as f64,
                    car_count,
                })
        })
        .collect()
}

impl TableRow for PriceBin {
    fn headers() -> Vec<String> {
        ["transmission", "bin_start", "bin_end", "car_count"]
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.transmission.clone(),
            table::format_price(self.bin_start),
            table::format_price(self.bin_end),
            self.car_count.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(model: &str, model_year: i64, average_price: i64) -> ModelYearPriceStats {
        ModelYearPriceStats {
            model: model.to_string(),
            model_year,
            average_price,
            car_count: 5,
        }
    }

    #[test]
    fn most_expensive_sorts_descending_and_truncates() {
        let rows = vec![
            stats("kia soul", 2015, 9000),
            stats("ram 3500", 2018, 45000),
            stats("ford f-150", 2016, 21000),
        ];
        let top = most_expensive(&rows, 2);
        let models: Vec<&str> = top.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(models, vec!["ram 3500", "ford f-150"]);
    }

    #[test]
    fn modern_keeps_twenty_first_century() {
        let rows = vec![stats("jeep wrangler", 1999, 8000), stats("jeep wrangler", 2000, 9000)];
        let kept = modern(&rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].model_year, 2000);
    }

    #[test]
    fn manufacturer_windows_apply_year_and_price_limits() {
        let row = |model_year, mean| ManufacturerYearStats {
            manufacturer: "Ford".to_string(),
            model_year,
            mean,
            count: 1,
        };
        let rows = vec![row(1985, 5000.0), row(1995, 45000.0), row(2005, 9000.0), row(2012, 52000.0)];
        let since_1990 = manufacturer_window(&rows, ManufacturerWindow::Since1990);
        assert_eq!(since_1990.iter().map(|r| r.model_year).collect::<Vec<_>>(), vec![2005]);
        let since_2010 = manufacturer_window(&rows, ManufacturerWindow::Since2010);
        assert_eq!(since_2010.iter().map(|r| r.model_year).collect::<Vec<_>>(), vec![2012]);
        assert_eq!(manufacturer_window(&rows, ManufacturerWindow::All).len(), 4);
    }

    #[test]
    fn paint_colors_follow_palette_then_alphabet() {
        let row = |color: &str| PaintColorStats {
            paint_color: color.to_string(),
            car_count: 1,
            average_price: 1.0,
        };
        let rows = vec![row("unknown"), row("teal"), row("black"), row("red"), row("beige")];
        let ordered = paint_color_display_order(&rows);
        let colors: Vec<&str> = ordered.iter().map(|r| r.paint_color.as_str()).collect();
        assert_eq!(colors, vec!["red", "black", "unknown", "beige", "teal"]);
    }
}
