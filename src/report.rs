//! The `report` subcommand: compute one summary table and write it as an
//! aligned text table, CSV, or JSON.

use std::io::Write;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    aggregate::{
        self, DriveTypeComparison, ManufacturerYearStats, ModelYearPriceStats, PaintColorStats,
    },
    clean,
    cli::{ManufacturerWindow, OutputFormat, ReportArgs, ReportKind},
    io_utils,
    listing::Listing,
    table::{self, TableRow},
    views::{self, PriceBin},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub window: ManufacturerWindow,
    pub top: usize,
    pub bins: u16,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            window: ManufacturerWindow::All,
            top: views::DEFAULT_TOP_MODELS,
            bins: views::DEFAULT_PRICE_BINS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    ModelYear(Vec<ModelYearPriceStats>),
    PaintColor(Vec<PaintColorStats>),
    DriveType(Vec<DriveTypeComparison>),
    ManufacturerYear(Vec<ManufacturerYearStats>),
    PriceHistogram(Vec<PriceBin>),
}

impl Report {
    pub fn len(&self) -> usize {
        match self {
            Report::ModelYear(rows) => rows.len(),
            Report::PaintColor(rows) => rows.len(),
            Report::DriveType(rows) => rows.len(),
            Report::ManufacturerYear(rows) => rows.len(),
            Report::PriceHistogram(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn build_report(kind: ReportKind, listings: &[Listing], options: &ReportOptions) -> Report {
    match kind {
        ReportKind::ModelYear => Report::ModelYear(aggregate::model_year_price_stats(listings)),
        ReportKind::Expensive => Report::ModelYear(views::most_expensive(
            &aggregate::model_year_price_stats(listings),
            options.top,
        )),
        ReportKind::Modern => Report::ModelYear(views::modern(&views::most_expensive(
            &aggregate::model_year_price_stats(listings),
            options.top,
        ))),
        ReportKind::PaintColor => Report::PaintColor(views::paint_color_display_order(
            &aggregate::paint_color_stats(listings),
        )),
        ReportKind::DriveType => Report::DriveType(aggregate::drive_type_comparison(listings)),
        ReportKind::ManufacturerYear => Report::ManufacturerYear(views::manufacturer_window(
            &aggregate::manufacturer_year_stats(listings),
            options.window,
        )),
        ReportKind::PriceHistogram => {
            Report::PriceHistogram(views::price_histogram(listings, options.bins))
        }
    }
}

pub fn write_report<W: Write>(report: &Report, format: OutputFormat, writer: W) -> Result<()> {
    match report {
        Report::ModelYear(rows) => write_rows(rows, format, writer),
        Report::PaintColor(rows) => write_rows(rows, format, writer),
        Report::DriveType(rows) => write_rows(rows, format, writer),
        Report::ManufacturerYear(rows) => write_rows(rows, format, writer),
        Report::PriceHistogram(rows) => write_rows(rows, format, writer),
    }
}

/// CSV output always carries a header row, even when the table is empty.
fn write_rows<T, W>(rows: &[T], format: OutputFormat, mut writer: W) -> Result<()>
where
    T: TableRow + Serialize,
    W: Write,
{
    match format {
        OutputFormat::Table => {
            writer
                .write_all(table::render(rows).as_bytes())
                .context("Writing table output")?;
            writer.flush().context("Flushing table output")?;
        }
        OutputFormat::Csv => {
            let mut csv_writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer);
            csv_writer
                .write_record(T::headers())
                .context("Writing CSV headers")?;
            for (idx, row) in rows.iter().enumerate() {
                csv_writer
                    .serialize(row)
                    .with_context(|| format!("Writing CSV row {}", idx + 1))?;
            }
            csv_writer.flush().context("Flushing CSV output")?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, rows).context("Writing JSON output")?;
            writeln!(writer).context("Writing JSON output")?;
            writer.flush().context("Flushing JSON output")?;
        }
    }
    Ok(())
}

pub fn execute(args: &ReportArgs) -> Result<()> {
    let (_, outcome) = clean::load_and_clean(&args.input)?;
    let options = ReportOptions {
        window: args.window,
        top: args.top,
        bins: args.bins,
    };
    let report = build_report(args.kind, &outcome.listings, &options);
    let writer = io_utils::open_writer(args.output.as_deref())?;
    write_report(&report, args.format, writer)?;

    let destination = args
        .output
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!(
        "Report {:?}: {} row(s) from {} listing(s) -> {}",
        args.kind,
        report.len(),
        outcome.listings.len(),
        destination
    );
    Ok(())
}
