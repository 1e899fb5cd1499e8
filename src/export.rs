use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use crate::{
    clean,
    cli::{ExportArgs, ManufacturerWindow, ReportKind},
    io_utils,
    report::{self, ReportOptions},
    table,
};

/// Every table written by `export`, with the manufacturer windows split out.
const EXPORTS: &[(ReportKind, ManufacturerWindow, &str)] = &[
    (ReportKind::ModelYear, ManufacturerWindow::All, ""),
    (ReportKind::Expensive, ManufacturerWindow::All, ""),
    (ReportKind::Modern, ManufacturerWindow::All, ""),
    (ReportKind::PaintColor, ManufacturerWindow::All, ""),
    (ReportKind::DriveType, ManufacturerWindow::All, ""),
    (ReportKind::ManufacturerYear, ManufacturerWindow::All, ""),
    (ReportKind::ManufacturerYear, ManufacturerWindow::Since1990, "_since_1990"),
    (ReportKind::ManufacturerYear, ManufacturerWindow::Since2010, "_since_2010"),
    (ReportKind::PriceHistogram, ManufacturerWindow::All, ""),
];

pub fn execute(args: &ExportArgs) -> Result<()> {
    let (_, outcome) = clean::load_and_clean(&args.input)?;
    io_utils::ensure_directory(&args.out_dir)?;

    let mut written = Vec::with_capacity(EXPORTS.len());
    for (kind, window, suffix) in EXPORTS {
        let options = ReportOptions {
            window: *window,
            ..ReportOptions::default()
        };
        let report = report::build_report(*kind, &outcome.listings, &options);
        let path: PathBuf = args.out_dir.join(format!(
            "{}{}.{}",
            kind.file_stem(),
            suffix,
            args.format.extension()
        ));
        let writer = io_utils::open_writer(Some(path.as_path()))?;
        report::write_report(&report, args.format, writer)
            .with_context(|| format!("Exporting {path:?}"))?;
        written.push(vec![path.display().to_string(), report.len().to_string()]);
    }

    table::print_table(&outcome.summary);
    println!();
    print!(
        "{}",
        table::render_table(&["file".to_string(), "rows".to_string()], &written)
    );
    info!(
        "Exported {} table(s) from {} cleaned listing(s) into {:?}",
        written.len(),
        outcome.listings.len(),
        args.out_dir
    );
    Ok(())
}
