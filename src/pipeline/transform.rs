// transform.rs
use polars::prelude::*;
use tracing::{info, warn};

use crate::config::Settings;
use crate::domain::coerce::{coerce_cell, extract_integer, strict_number};
use crate::domain::table::{
    drop_empty_columns, filter_rows, has_column, map_column, Cell,
};
use crate::errors::PipelineResult;
use crate::pipeline::log_overview;

/// `true` only for the exact label; Missing and anything else are `false`.
/// Values that are already boolean pass through.
fn to_flag(df: &mut DataFrame, column: &str, truthy: &str) -> PipelineResult<()> {
    let present = map_column(df, column, |cell| match cell {
        Cell::Bool(b) => Cell::Bool(b),
        Cell::Text(s) => Cell::Bool(s == truthy),
        _ => Cell::Bool(false),
    })?;
    if !present {
        warn!("Column '{column}' missing; boolean conversion skipped");
    }
    Ok(())
}

/// Fills missing `value` entries with the median of their `group`. Groups
/// with no known value, and rows with no group, stay missing.
pub fn impute_by_group_median(
    df: DataFrame,
    group: &str,
    value: &str,
) -> PipelineResult<DataFrame> {
    if !has_column(&df, group) || !has_column(&df, value) {
        warn!("Columns '{group}'/'{value}' missing; imputation skipped");
        return Ok(df);
    }

    let before = df.column(value)?.null_count();
    let group_median = col(value).cast(DataType::Float64).median().over([col(group)]);
    let imputed = df
        .lazy()
        .with_column(
            when(col(group).is_not_null())
                .then(col(value).cast(DataType::Float64).fill_null(group_median))
                .otherwise(col(value).cast(DataType::Float64))
                .alias(value),
        )
        .collect()?;

    let filled = before - imputed.column(value)?.null_count();
    info!("Imputed {filled} missing '{value}' values from '{group}' medians");
    Ok(imputed)
}

/// Keeps rows whose `column` lies in `[lo, hi]`; missing values fail.
fn keep_within(df: DataFrame, column: &str, lo: f64, hi: f64) -> PipelineResult<DataFrame> {
    if !has_column(&df, column) {
        warn!("No '{column}' column; plausibility window skipped");
        return Ok(df);
    }
    let v = || col(column).cast(DataType::Float64);
    filter_rows(df, v().gt_eq(lit(lo)).and(v().lt_eq(lit(hi))))
}

/// Booleans, numeric coercion, building-age imputation, then the price and
/// surface plausibility window.
pub fn transform(mut df: DataFrame, settings: &Settings) -> PipelineResult<DataFrame> {
    log_overview("transform (input)", &df);

    to_flag(&mut df, "furnished?", "Furnished")?;
    to_flag(&mut df, "property_mortgaged?", "Yes")?;

    map_column(&mut df, "number_of_floors", |c| coerce_cell(&c, strict_number))?;
    map_column(&mut df, "building_age", |c| coerce_cell(&c, extract_integer))?;
    let mut df = impute_by_group_median(df, "neighborhood", "building_age")?;

    drop_empty_columns(&mut df);

    let before = df.height();
    let df = keep_within(df, "price", settings.min_price, settings.max_price)?;
    let df = keep_within(df, "surface_area", settings.min_surface, settings.max_surface)?;
    info!("Dropped {} implausible rows", before - df.height());

    log_overview("transform", &df);
    Ok(df)
}
