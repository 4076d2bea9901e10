// inspect.rs
use std::fmt::Write as _;

use polars::prelude::*;

use crate::domain::table::{column_cells, require_column, Cell};
use crate::errors::PipelineResult;
use crate::scraper::models::{ListingRecord, NOT_AVAILABLE};

/// Human-readable dump of scraped records, one block per property.
pub fn render_records(records: &[ListingRecord]) -> String {
    let mut out = String::new();
    for (i, rec) in records.iter().enumerate() {
        let _ = writeln!(out, "--- Property {} ---", i + 1);
        let _ = writeln!(out, "URL: {}", rec.url);
        let _ = writeln!(out, "Price: {}", rec.price.as_deref().unwrap_or(NOT_AVAILABLE));
        let _ = writeln!(out, "Location: {}", rec.location.as_deref().unwrap_or(NOT_AVAILABLE));
        if !rec.attributes.is_empty() {
            let _ = writeln!(out, "Attributes:");
            for (key, value) in rec.attributes.iter() {
                let _ = writeln!(out, "  {key}: {value}");
            }
        }
        let _ = writeln!(out, "{}", "-".repeat(20));
    }
    out
}

/// Distinct values of a column in first-seen order, Missing included.
pub fn unique_values(df: &DataFrame, column: &str) -> PipelineResult<Vec<Cell>> {
    require_column(df, column)?;
    let distinct = df
        .clone()
        .lazy()
        .select([col(column).unique_stable()])
        .collect()?;
    Ok(column_cells(&distinct, column).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::parse_csv;
    use crate::errors::PipelineError;

    #[test]
    fn records_render_with_attributes() {
        let mut rec = ListingRecord::new("https://x.test/1");
        rec.attributes.insert("City", "Tripoli");
        let text = render_records(&[rec, ListingRecord::new("https://x.test/2")]);

        assert!(text.starts_with("--- Property 1 ---\nURL: https://x.test/1\nPrice: N/A\n"));
        assert!(text.contains("Attributes:\n  City: Tripoli\n"));
        assert_eq!(text.matches("Attributes:").count(), 1);
        assert!(text.contains("--- Property 2 ---"));
    }

    #[test]
    fn unique_keeps_first_seen_order() {
        let t = parse_csv("city,price\nTripoli,1\nBenghazi,2\nTripoli,3\n,4\n").unwrap();
        assert_eq!(
            unique_values(&t, "city").unwrap(),
            vec![Cell::text("Tripoli"), Cell::text("Benghazi"), Cell::Missing]
        );
    }

    #[test]
    fn unknown_column_lists_what_exists() {
        let t = parse_csv("city,price\nTripoli,1\n").unwrap();
        match unique_values(&t, "category") {
            Err(PipelineError::MissingColumn { available, .. }) => assert_eq!(available, "city, price"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
