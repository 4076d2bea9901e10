// src/domain/outliers.rs

use polars::prelude::*;
use tracing::{debug, info};

use crate::domain::table::{filter_rows, require_column};
use crate::errors::PipelineResult;

/// `q`-quantile of `value` within each `group` partition, linearly
/// interpolated between the closest ranks.
fn group_quantile(value: &str, group: &str, q: f64) -> Expr {
    col(value)
        .cast(DataType::Float64)
        .quantile(lit(q), QuantileMethod::Linear)
        .over([col(group)])
}

/// Removes rows whose `value` lies outside the inclusive
/// `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]` fence of their `group`.
///
/// Rows with a missing group or a non-numeric value never survive. Row
/// order is preserved.
pub fn remove_outliers_by_group(
    df: &DataFrame,
    group: &str,
    value: &str,
) -> PipelineResult<DataFrame> {
    require_column(df, group)?;
    require_column(df, value)?;

    let numeric = || col(value).cast(DataType::Float64);
    let candidates = filter_rows(
        df.clone(),
        col(group).is_not_null().and(numeric().is_not_null()),
    )?;
    debug!(
        dropped = df.height() - candidates.height(),
        "rows without a group or a numeric {value}"
    );

    let q1 = group_quantile(value, group, 0.25);
    let q3 = group_quantile(value, group, 0.75);
    let iqr = q3.clone() - q1.clone();
    let lower = q1 - lit(1.5) * iqr.clone();
    let upper = q3 + lit(1.5) * iqr;

    let filtered = filter_rows(candidates, numeric().gt_eq(lower).and(numeric().lt_eq(upper)))?;
    info!(
        before = df.height(),
        after = filtered.height(),
        group,
        value,
        "removed outliers"
    );
    Ok(filtered)
}
