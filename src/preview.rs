use anyhow::Result;
use log::info;

use crate::{
    clean,
    cli::PreviewArgs,
    listing::Listing,
    table::{self, TableRow},
};

impl TableRow for Listing {
    fn headers() -> Vec<String> {
        [
            "row",
            "model",
            "manufacturer",
            "model_year",
            "odometer",
            "is_4wd",
            "price",
            "paint_color",
            "type",
            "transmission",
            "condition",
            "date_posted",
            "age",
        ]
        .iter()
        .map(|name| name.to_string())
        .collect()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.row.to_string(),
            self.model.clone(),
            self.manufacturer.clone(),
            self.model_year.to_string(),
            self.odometer.to_string(),
            u8::from(self.is_4wd).to_string(),
            self.price.to_string(),
            self.paint_color.clone(),
            self.body_type.clone(),
            self.transmission.to_string(),
            self.condition.to_string(),
            self.date_posted.format("%Y-%m-%d").to_string(),
            self.age.to_string(),
        ]
    }
}

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let (_, outcome) = clean::load_and_clean(&args.input)?;
    let shown = &outcome.listings[..args.rows.min(outcome.listings.len())];
    table::print_table(shown);
    info!(
        "Displayed {} of {} cleaned row(s) from {:?}",
        shown.len(),
        outcome.listings.len(),
        args.input.input
    );
    Ok(())
}
