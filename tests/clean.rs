mod common;

use common::{SAMPLE, TestWorkspace, clean_sample, fixture_path};
use vehicle_listings::{
    clean::{self, CleanOptions, MAX_ODOMETER, MAX_PRICE, MIN_MODEL_YEAR},
    cli::MissingNumeric,
    io_utils,
    listing::{Condition, RawTable, Transmission},
};

#[test]
fn sample_summary_accounts_for_every_row() {
    let outcome = clean_sample();
    let summary = &outcome.summary;
    assert_eq!(summary.rows_read, 39);
    assert_eq!(summary.duplicates_removed, 1);
    assert_eq!(summary.rejected.get("empty model"), Some(&1));
    assert_eq!(summary.rejected.get("invalid date"), Some(&1));
    assert_eq!(summary.out_of_range, 4);
    assert_eq!(summary.rows_kept, 32);
    assert_eq!(
        summary.rows_read,
        summary.duplicates_removed
            + summary.rejected_total()
            + summary.out_of_range
            + summary.rows_kept
    );
}

#[test]
fn cleaned_rows_satisfy_range_invariants() {
    for listing in clean_sample().listings {
        assert!(listing.model_year >= MIN_MODEL_YEAR, "{listing:?}");
        assert!(listing.odometer <= MAX_ODOMETER, "{listing:?}");
        assert!(listing.price <= MAX_PRICE, "{listing:?}");
        assert!(!listing.paint_color.is_empty());
        assert_eq!(
            Some(listing.manufacturer.as_str()),
            listing.model.split_whitespace().next()
        );
    }
}

#[test]
fn missing_model_year_listing_is_absent() {
    let outcome = clean_sample();
    assert!(outcome.listings.iter().all(|l| l.model != "ford f150"));
}

#[test]
fn first_duplicate_wins_and_keeps_its_posting_fields() {
    let outcome = clean_sample();
    let first_camry = outcome
        .listings
        .iter()
        .filter(|l| l.odometer == 101111)
        .collect::<Vec<_>>();
    assert_eq!(first_camry.len(), 1);
    assert_eq!(first_camry[0].days_listed, "10");
    assert_eq!(first_camry[0].row, 1);
}

#[test]
fn derived_columns_are_filled() {
    let outcome = clean_sample();
    let jeep = outcome
        .listings
        .iter()
        .find(|l| l.model == "jeep grand cherokee" && l.is_4wd)
        .expect("4wd jeep");
    assert_eq!(jeep.manufacturer, "jeep");
    assert_eq!(jeep.year_posted, 2018);
    assert_eq!(jeep.age, 4);
    assert_eq!(jeep.body_type, "suv");
    assert_eq!(jeep.condition, Condition::LikeNew);

    let camry_without_paint = outcome
        .listings
        .iter()
        .find(|l| l.odometer == 104444)
        .expect("camry with no paint colour");
    assert_eq!(camry_without_paint.paint_color, "unknown");
    assert_eq!(camry_without_paint.model_year, 2015);

    let gmc = outcome
        .listings
        .iter()
        .find(|l| l.manufacturer == "gmc")
        .expect("gmc listing");
    assert_eq!(gmc.transmission, Transmission::Manual);
    assert_eq!(gmc.extras, vec!["8.0".to_string(), "diesel".to_string()]);
}

#[test]
fn cleaning_cleaned_output_removes_nothing_more() {
    let table = io_utils::load_raw_table(&fixture_path(SAMPLE), None, None).unwrap();
    let layout = table.layout().unwrap();
    let first = clean::clean(&table, &CleanOptions::default()).unwrap();

    let headers = clean::output_headers(&table.headers, &layout);
    let rows = first
        .listings
        .iter()
        .map(|listing| clean::output_record(listing, &layout))
        .collect();
    let second = clean::clean(&RawTable::new(headers, rows), &CleanOptions::default()).unwrap();

    assert_eq!(second.summary.duplicates_removed, 0);
    assert_eq!(second.listings.len(), first.listings.len());
    assert_eq!(second.listings[0].manufacturer, first.listings[0].manufacturer);
}

#[test]
fn reject_policy_turns_missing_year_into_rejection() {
    let table = io_utils::load_raw_table(&fixture_path(SAMPLE), None, None).unwrap();
    let options = CleanOptions {
        missing_numeric: MissingNumeric::Reject,
    };
    let outcome = clean::clean(&table, &options).unwrap();
    assert_eq!(outcome.summary.rejected.get("missing value"), Some(&1));
    assert_eq!(outcome.summary.out_of_range, 3);
    assert_eq!(outcome.listings.len(), 32);
}

#[test]
fn semicolon_delimited_input_with_missing_optional_columns() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "minimal.txt",
        "model;price;date_posted;model_year\nnissan altima 2.5;7200;2018-10-10;2012\n",
    );
    let table = io_utils::load_raw_table(&path, Some(b';'), None).unwrap();
    let outcome = clean::clean(&table, &CleanOptions::default()).unwrap();
    assert_eq!(outcome.listings.len(), 1);
    let listing = &outcome.listings[0];
    assert_eq!(listing.manufacturer, "nissan");
    assert_eq!(listing.odometer, 0);
    assert_eq!(listing.paint_color, "unknown");
    assert_eq!(listing.body_type, "");
}

#[test]
fn missing_required_column_is_an_error() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("no_price.csv", "model,date_posted\nford focus,2019-01-01\n");
    let table = io_utils::load_raw_table(&path, None, None).unwrap();
    let err = clean::clean(&table, &CleanOptions::default()).unwrap_err();
    assert!(err.to_string().contains("price"));
}

#[test]
fn missing_input_file_fails_with_path() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("absent.csv");
    let err = io_utils::load_raw_table(&path, None, None).unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}
