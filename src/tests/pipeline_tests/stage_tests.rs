// src/tests/pipeline_tests/stage_tests.rs

use std::fs;

use crate::domain::table::{cell, column_cells, has_column, numbers, read_csv, Cell};
use crate::errors::PipelineError;
use crate::pipeline;
use crate::scraper::models::ListingRecord;
use crate::store;
use crate::tests::utils::temp_settings;

const PROCESSED: &str = "\
price,category,city,neighborhood,subcategory,bedrooms,bathrooms,furnished?,property_mortgaged?,lister_type,surface_area,building_age,reference_id
450000,Property For Sale,tarabulus,ein zara,Apartment,3 Bedrooms,2 Bathrooms,Furnished,No,Owner,140 meter square,5 years,A1
480000,Property For Sale,Tripoli,Ain Zara,Apartment,2 Bedrooms,One Bathroom,,,,120 meter square,,A2
470000,Property For Sale,Tripoli,Gargaresh,Apartment,3 Bedrooms,2 Bathrooms,Unfurnished,Yes,Agent,130 meter square,10 years,A3
465000,Property For Sale,Tripoli,Gargaresh,Apartment,3 Bedrooms,2 Bathrooms,Unfurnished,No,Agent,135 meter square,,A4
9900000,Property For Sale,Tripoli,Gargaresh,Apartment,3 Bedrooms,2 Bathrooms,Unfurnished,No,Agent,150 meter square,,A5
90000,Property For Sale,Benghazi,Al Sabri,Villa,5 Bedrooms,3 Bathrooms,Unfurnished,No,Owner,400 meter square,,A6
1200000,Property For Sale,Benghazi,Al Sabri,Villa,5 Bedrooms,3 Bathrooms,Unfurnished,No,Owner,30 meter square,,A7
";

#[test]
fn prepare_chains_clean_transform_and_outliers() {
    let (settings, _dir) = temp_settings("prepare");
    fs::write(&settings.processed_csv, PROCESSED).unwrap();

    let df = pipeline::run_prepare(&settings).unwrap();

    // cheap villa, tiny villa and the overpriced apartment are all gone
    assert_eq!(numbers(&df, "price"), vec![450000.0, 480000.0, 470000.0, 465000.0]);
    assert!(!has_column(&df, "category"));
    assert!(!has_column(&df, "reference_id"));
    assert!(column_cells(&df, "city")
        .unwrap()
        .iter()
        .all(|c| c == &Cell::text("Tripoli")));

    assert_eq!(cell(&df, "neighborhood", 1), Cell::text("Ain Zara"));
    assert_eq!(cell(&df, "furnished?", 1), Cell::Bool(false));
    assert_eq!(cell(&df, "building_age", 1), Cell::Number(5.0));
    assert_eq!(cell(&df, "bathrooms", 1), Cell::Number(1.0));

    let on_disk = read_csv(&settings.cleaned_csv).unwrap();
    assert!(on_disk.equals_missing(&df));
}

#[test]
fn separate_stages_match_prepare() {
    let (settings, _dir) = temp_settings("stages");
    fs::write(&settings.processed_csv, PROCESSED).unwrap();

    pipeline::run_clean(&settings).unwrap();
    pipeline::run_transform(&settings).unwrap();
    let staged = pipeline::run_outliers(&settings).unwrap();
    let prepared = pipeline::run_prepare(&settings).unwrap();
    assert!(staged.equals_missing(&prepared));
}

#[test]
fn report_export_and_unique_write_their_outputs() {
    let (settings, _dir) = temp_settings("outputs");

    let mut rec = ListingRecord::new("https://ly.opensooq.com/en/search/1");
    rec.price = Some("450,000 LYD".into());
    rec.attributes.insert("City", "Tripoli");
    store::save_records(&settings.records_file, &[rec]).unwrap();

    pipeline::run_report(&settings).unwrap();
    let html = fs::read_to_string(&settings.report_html).unwrap();
    assert!(html.contains("450,000.00 LYD"));
    assert!(html.contains("Tripoli: 1"));

    fs::write(&settings.cleaned_csv, PROCESSED).unwrap();
    pipeline::run_export(&settings.cleaned_csv, &settings.export_xlsx).unwrap();
    assert!(fs::read(&settings.export_xlsx).unwrap().starts_with(b"PK"));

    pipeline::run_unique(&settings.cleaned_csv, "city").unwrap();
    let err = pipeline::run_unique(&settings.cleaned_csv, "no_such_column").unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumn { .. }));

    let report = pipeline::run_eda(&settings.cleaned_csv).unwrap();
    assert_eq!(report.shape, (7, 13));
}
