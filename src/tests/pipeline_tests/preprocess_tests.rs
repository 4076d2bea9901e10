// src/tests/pipeline_tests/preprocess_tests.rs

use std::fs;

use crate::domain::table::{cell, has_column, read_csv, Cell};
use crate::errors::PipelineError;
use crate::pipeline::run_preprocess;
use crate::tests::utils::temp_settings;

const TWO_RECORDS: &str = r#"[
  {
    "url": "https://ly.opensooq.com/en/search/1",
    "price": "450,000 LYD",
    "location": "https://www.google.com/maps?q=32.8872,13.1913",
    "attributes": {
      "Category": "Property For Sale",
      "City": "Tripoli",
      "Bedrooms": "3 Bedrooms",
      "Surface Area": "140 meter square"
    }
  },
  {
    "url": "https://ly.opensooq.com/en/search/2",
    "price": "Call for price",
    "location": "N/A",
    "attributes": {
      "Category": "Property For Sale",
      "City": "Benghazi",
      "Bedrooms": "2 Bedrooms",
      "Surface Area": "90 meter square"
    }
  }
]"#;

#[test]
fn malformed_price_is_dropped_and_valid_one_kept() {
    let (settings, _dir) = temp_settings("preprocess_e2e");
    fs::write(&settings.records_file, TWO_RECORDS).unwrap();

    let df = run_preprocess(&settings).unwrap();
    assert_eq!(df.height(), 1);
    assert_eq!(cell(&df, "price", 0), Cell::Number(450_000.0));
    assert_eq!(cell(&df, "city", 0), Cell::text("Tripoli"));

    // both outputs are on disk, the unclean one untouched
    let unclean = read_csv(&settings.unclean_csv).unwrap();
    assert_eq!(unclean.height(), 2);
    assert!(has_column(&unclean, "attributes"));

    let processed = read_csv(&settings.processed_csv).unwrap();
    assert!(processed.equals_missing(&df));
    assert!(!has_column(&processed, "url"));
}

#[test]
fn missing_and_corrupt_inputs_are_reportable() {
    let (settings, _dir) = temp_settings("preprocess_bad");

    let err = run_preprocess(&settings).unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput(_)));
    assert!(err.is_reportable());

    fs::write(&settings.records_file, "{not json").unwrap();
    let err = run_preprocess(&settings).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidJson { .. }));
    assert!(err.is_reportable());
}
