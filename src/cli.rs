use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Clean vehicle listings and derive price reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean a listing file and write the surviving rows with derived columns
    Clean(CleanArgs),
    /// Compute a single summary table from the cleaned listings
    Report(ReportArgs),
    /// Write every summary table into a directory
    Export(ExportArgs),
    /// Show the first cleaned listings in a formatted table
    Preview(PreviewArgs),
}

/// Input options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Listing CSV file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// How to treat listings with no model year or odometer reading
    #[arg(long = "missing-numeric", value_enum, default_value = "zero")]
    pub missing_numeric: MissingNumeric,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum MissingNumeric {
    /// Fill with 0 and let the range filters decide
    #[default]
    Zero,
    /// Reject the listing as malformed
    Reject,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ReportKind {
    /// Average price and count per model and model year (groups of 5+)
    ModelYear,
    /// Most expensive model/year groups
    Expensive,
    /// Most expensive model/year groups from model year 2000 on
    Modern,
    /// Count and average price per paint colour
    PaintColor,
    /// 4WD versus non-4WD price difference per model
    DriveType,
    /// Average price per manufacturer and model year
    ManufacturerYear,
    /// Price histogram split by transmission
    PriceHistogram,
}

impl ReportKind {
    pub fn file_stem(self) -> &'static str {
        match self {
            ReportKind::ModelYear => "model_year_prices",
            ReportKind::Expensive => "expensive_models",
            ReportKind::Modern => "modern_expensive_models",
            ReportKind::PaintColor => "paint_colors",
            ReportKind::DriveType => "drive_type_comparison",
            ReportKind::ManufacturerYear => "manufacturer_year_prices",
            ReportKind::PriceHistogram => "price_histogram",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ManufacturerWindow {
    #[default]
    All,
    /// Model years 1990+ with an average price of at most 40000
    #[value(name = "since-1990")]
    Since1990,
    /// Model years 2010+
    #[value(name = "since-2010")]
    Since2010,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Table => "txt",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Which table to compute
    #[arg(short = 'k', long = "kind", value_enum)]
    pub kind: ReportKind,
    /// Model-year window for the manufacturer-year report
    #[arg(long, value_enum, default_value = "all")]
    pub window: ManufacturerWindow,
    /// Number of rows kept by the expensive and modern reports
    #[arg(long, default_value_t = 100)]
    pub top: usize,
    /// Number of equal-width bins in the price histogram
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..))]
    pub bins: u16,
    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Directory receiving one file per table
    #[arg(long = "out-dir")]
    pub out_dir: PathBuf,
    /// File format for the exported tables
    #[arg(short = 'f', long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Number of cleaned rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
