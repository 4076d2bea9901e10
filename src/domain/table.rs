// src/domain/table.rs

use std::cmp::Ordering;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use polars::io::csv::read::{CsvParseOptions, CsvReadOptions, NullValues};
use polars::prelude::*;

use crate::errors::{PipelineError, PipelineResult};

/// Fields read back as null, including the scraper's "N/A" sentinel.
const NA_VALUES: &[&str] = &[
    "", "N/A", "n/a", "NA", "<NA>", "#N/A", "NaN", "nan", "-nan", "null", "NULL", "None",
];

const TALLY: &str = "n_rows";

/// One value of a frame, for the per-value parsers and the exporters.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Type inference for a raw scraped field.
    pub fn infer(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if NA_VALUES.contains(&trimmed) {
            return Cell::Missing;
        }
        match trimmed {
            "True" | "true" | "TRUE" => return Cell::Bool(true),
            "False" | "false" | "FALSE" => return Cell::Bool(false),
            _ => {}
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn text(s: impl Into<String>) -> Cell {
        Cell::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Plain rendering; Missing is the empty string.
    pub fn render(&self) -> String {
        match self {
            Cell::Missing => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Numbers, then bools, then text, Missing last.
    pub fn total_cmp(&self, other: &Cell) -> Ordering {
        fn rank(c: &Cell) -> u8 {
            match c {
                Cell::Number(_) => 0,
                Cell::Bool(_) => 1,
                Cell::Text(_) => 2,
                Cell::Missing => 3,
            }
        }
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a.total_cmp(b),
            (Cell::Bool(a), Cell::Bool(b)) => a.cmp(b),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }

    fn lit(&self) -> Expr {
        match self {
            Cell::Missing => lit(NULL),
            Cell::Number(n) => lit(*n),
            Cell::Bool(b) => lit(*b),
            Cell::Text(s) => lit(s.clone()),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Missing => write!(f, "NaN"),
            other => write!(f, "{}", other.render()),
        }
    }
}

impl From<AnyValue<'_>> for Cell {
    fn from(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Cell::Missing,
            AnyValue::Boolean(b) => Cell::Bool(b),
            AnyValue::String(s) => Cell::Text(s.to_string()),
            AnyValue::StringOwned(s) => Cell::Text(s.to_string()),
            other => match other.extract::<f64>() {
                Some(n) if n.is_finite() => Cell::Number(n),
                Some(_) => Cell::Missing,
                None => Cell::Text(other.to_string()),
            },
        }
    }
}

fn csv_options() -> CsvReadOptions {
    let nulls = NullValues::AllColumns(NA_VALUES.iter().map(|s| (*s).into()).collect());
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_null_values(Some(nulls)))
}

pub fn read_csv(path: &Path) -> PipelineResult<DataFrame> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(csv_options().into_reader_with_file_handle(file).finish()?)
}

pub fn parse_csv(text: &str) -> PipelineResult<DataFrame> {
    let cursor = Cursor::new(text.as_bytes().to_vec());
    Ok(csv_options().into_reader_with_file_handle(cursor).finish()?)
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> PipelineResult<()> {
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    CsvWriter::new(file).include_header(true).finish(df)?;
    Ok(())
}

pub fn csv_string(df: &mut DataFrame) -> PipelineResult<String> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf).include_header(true).finish(df)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|n| n.to_string()).collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

pub fn require_column(df: &DataFrame, name: &str) -> PipelineResult<()> {
    if has_column(df, name) {
        return Ok(());
    }
    Err(PipelineError::MissingColumn {
        column: name.to_string(),
        available: column_names(df).join(", "),
    })
}

/// Every value of a column in row order; `None` when the column is absent.
pub fn column_cells(df: &DataFrame, name: &str) -> Option<Vec<Cell>> {
    let series = df.column(name).ok()?.as_materialized_series().rechunk();
    Some(series.iter().map(Cell::from).collect())
}

/// Single value; Missing for an unknown column or row.
pub fn cell(df: &DataFrame, name: &str, row: usize) -> Cell {
    df.column(name)
        .ok()
        .and_then(|c| c.as_materialized_series().get(row).ok())
        .map_or(Cell::Missing, Cell::from)
}

/// Non-null values of a column cast to f64, in row order.
pub fn numbers(df: &DataFrame, name: &str) -> Vec<f64> {
    let Some(series) = df
        .column(name)
        .ok()
        .and_then(|c| c.as_materialized_series().cast(&DataType::Float64).ok())
    else {
        return Vec::new();
    };
    series
        .f64()
        .map(|ca| ca.into_iter().flatten().collect())
        .unwrap_or_default()
}

/// Narrowest series holding the cells: f64 when every present value is a
/// number, bool when every one is a bool, text otherwise.
pub fn cells_to_series(name: &str, cells: &[Cell]) -> Series {
    let present = || cells.iter().filter(|c| !c.is_missing());
    if present().all(|c| matches!(c, Cell::Number(_))) {
        let values: Vec<Option<f64>> = cells.iter().map(Cell::as_f64).collect();
        Series::new(name.into(), values)
    } else if present().all(|c| matches!(c, Cell::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                Cell::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|c| (!c.is_missing()).then(|| c.render()))
            .collect();
        Series::new(name.into(), values)
    }
}

/// Replaces every value of a column through `f`. Returns whether the column
/// was present.
pub fn map_column<F>(df: &mut DataFrame, name: &str, f: F) -> PipelineResult<bool>
where
    F: FnMut(Cell) -> Cell,
{
    let Some(cells) = column_cells(df, name) else {
        return Ok(false);
    };
    let mapped: Vec<Cell> = cells.into_iter().map(f).collect();
    df.with_column(cells_to_series(name, &mapped))?;
    Ok(true)
}

pub fn fill_missing(df: DataFrame, name: &str, value: &Cell) -> PipelineResult<(DataFrame, bool)> {
    if !has_column(&df, name) {
        return Ok((df, false));
    }
    let filled = df
        .lazy()
        .with_column(col(name).fill_null(value.lit()).alias(name))
        .collect()?;
    Ok((filled, true))
}

/// Rows where `predicate` holds; nulls count as false.
pub fn filter_rows(df: DataFrame, predicate: Expr) -> PipelineResult<DataFrame> {
    Ok(df.lazy().filter(predicate).collect()?)
}

/// Drops the named columns that exist; unknown names are ignored.
pub fn drop_columns(df: &mut DataFrame, names: &[&str]) {
    for name in names {
        let _ = df.drop_in_place(name);
    }
}

/// Drops every column with no non-null value.
pub fn drop_empty_columns(df: &mut DataFrame) {
    let empty: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| c.null_count() == c.len())
        .map(|c| c.name().to_string())
        .collect();
    for name in &empty {
        let _ = df.drop_in_place(name);
    }
}

pub fn rename_columns<F: Fn(&str) -> String>(df: &mut DataFrame, f: F) -> PipelineResult<()> {
    for old in column_names(df) {
        let new = f(&old);
        if new != old {
            df.rename(&old, new.into())?;
        }
    }
    Ok(())
}

/// Most frequent non-null value; ties go to the smallest value.
pub fn mode(df: &DataFrame, name: &str) -> PipelineResult<Option<Cell>> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let tally = df
        .clone()
        .lazy()
        .filter(col(name).is_not_null())
        .group_by([col(name)])
        .agg([len().alias(TALLY)])
        .collect()?;

    let values = column_cells(&tally, name).unwrap_or_default();
    let counts = numbers(&tally, TALLY);
    Ok(values
        .into_iter()
        .zip(counts)
        .max_by(|(a, na), (b, nb)| na.total_cmp(nb).then_with(|| b.total_cmp(a)))
        .map(|(value, _)| value))
}

/// Non-null value counts in first-seen order.
pub fn value_tally(df: &DataFrame, name: &str) -> PipelineResult<Option<Vec<(Cell, usize)>>> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let tally = df
        .clone()
        .lazy()
        .filter(col(name).is_not_null())
        .group_by_stable([col(name)])
        .agg([len().alias(TALLY)])
        .collect()?;

    let values = column_cells(&tally, name).unwrap_or_default();
    let counts = numbers(&tally, TALLY);
    Ok(Some(
        values
            .into_iter()
            .zip(counts)
            .map(|(v, n)| (v, n as usize))
            .collect(),
    ))
}

/// First occurrence of every identical row, in row order.
pub fn unique_rows(df: &DataFrame) -> PipelineResult<DataFrame> {
    Ok(df
        .clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?)
}

/// Rows that repeat an earlier row exactly.
pub fn duplicate_count(df: &DataFrame) -> PipelineResult<usize> {
    Ok(df.height() - unique_rows(df)?.height())
}

/// Row-at-a-time assembly for frames built from scraped records. Columns
/// appear in first-seen order; cells never set stay Missing.
#[derive(Debug, Default)]
pub struct FrameBuilder {
    columns: Vec<(String, Vec<Cell>)>,
    rows: usize,
}

impl FrameBuilder {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| (c.to_string(), Vec::new())).collect(),
            rows: 0,
        }
    }

    pub fn push_row(&mut self) {
        self.rows += 1;
        for (_, cells) in &mut self.columns {
            cells.push(Cell::Missing);
        }
    }

    /// Sets `column` on the last pushed row, adding the column if needed.
    pub fn set(&mut self, column: &str, value: Cell) {
        let Some(last) = self.rows.checked_sub(1) else {
            return;
        };
        let idx = match self.columns.iter().position(|(name, _)| name == column) {
            Some(i) => i,
            None => {
                self.columns
                    .push((column.to_string(), vec![Cell::Missing; self.rows]));
                self.columns.len() - 1
            }
        };
        self.columns[idx].1[last] = value;
    }

    pub fn finish(self) -> PipelineResult<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|(name, cells)| cells_to_series(name, cells).into())
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}
