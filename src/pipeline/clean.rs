// clean.rs
use polars::prelude::*;
use tracing::{info, warn};

use crate::domain::coerce::{coerce_cell, coerce_number, room_count};
use crate::domain::normalize::normalize_place_name;
use crate::domain::table::{
    drop_columns, fill_missing, filter_rows, has_column, map_column, mode, Cell,
};
use crate::errors::PipelineResult;
use crate::pipeline::log_overview;

/// Columns with no analytical use once a listing is in the table.
const DROPPED_COLUMNS: &[&str] = &[
    "category",
    "reference_id",
    "payment_method",
    "main_amenities",
    "nearby",
    "additional_amenities",
    "property_status",
];

fn fill_with_mode(df: DataFrame, column: &str) -> PipelineResult<DataFrame> {
    match mode(&df, column)? {
        Some(value) => Ok(fill_missing(df, column, &value)?.0),
        None => {
            warn!("Column '{column}' missing or empty; no mode to fill with");
            Ok(df)
        }
    }
}

fn fill_with(df: DataFrame, column: &str, value: &str) -> PipelineResult<DataFrame> {
    let (df, present) = fill_missing(df, column, &Cell::text(value))?;
    if !present {
        warn!("Column '{column}' missing; fill skipped");
    }
    Ok(df)
}

fn normalize_places(df: &mut DataFrame, column: &str) -> PipelineResult<()> {
    let present = map_column(df, column, |cell| match cell {
        Cell::Text(s) => Cell::Text(normalize_place_name(&s)),
        other => other,
    })?;
    if !present {
        warn!("Column '{column}' missing; name normalization skipped");
    }
    Ok(())
}

/// Fills, standardizes and coerces the processed table.
pub fn clean(mut df: DataFrame) -> PipelineResult<DataFrame> {
    log_overview("clean (input)", &df);

    drop_columns(&mut df, DROPPED_COLUMNS);

    let df = fill_with_mode(df, "bedrooms")?;
    let df = fill_with_mode(df, "bathrooms")?;
    let df = fill_with(df, "furnished?", "Unfurnished")?;
    let df = fill_with(df, "property_mortgaged?", "No")?;
    let mut df = fill_with_mode(df, "lister_type")?;

    normalize_places(&mut df, "city")?;
    normalize_places(&mut df, "neighborhood")?;

    let required = ["surface_area", "land_area"]
        .into_iter()
        .filter(|c| has_column(&df, c))
        .map(|c| col(c).is_not_null())
        .reduce(|a, b| a.and(b));
    let mut df = match required {
        Some(predicate) => {
            let before = df.height();
            let kept = filter_rows(df, predicate)?;
            info!("Dropped {} rows without an area", before - kept.height());
            kept
        }
        None => {
            warn!("No 'surface_area' column; row filter skipped");
            df
        }
    };

    map_column(&mut df, "bedrooms", |c| coerce_cell(&c, room_count))?;
    map_column(&mut df, "bathrooms", |c| coerce_cell(&c, room_count))?;
    map_column(&mut df, "surface_area", |c| coerce_cell(&c, coerce_number))?;
    map_column(&mut df, "land_area", |c| coerce_cell(&c, coerce_number))?;

    log_overview("clean", &df);
    Ok(df)
}
