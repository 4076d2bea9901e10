// eda.rs
use std::fmt;

use polars::prelude::*;

use crate::domain::table::{column_names, duplicate_count, numbers, value_tally};
use crate::errors::PipelineResult;

/// Columns whose value counts are always worth a look.
const COUNTED_COLUMNS: &[&str] = &["facade", "lister_type", "subcategory"];

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_missing: usize,
    pub dtype: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdaReport {
    pub shape: (usize, usize),
    pub columns: Vec<ColumnInfo>,
    pub describe: Vec<Describe>,
    pub duplicates: usize,
    pub value_counts: Vec<(String, Vec<(String, usize)>)>,
    /// Numeric column names and the pairwise Pearson matrix over them.
    pub correlation: (Vec<String>, Vec<Vec<Option<f64>>>),
}

fn is_number(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int32
            | DataType::Int64
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

pub fn column_info(df: &DataFrame) -> Vec<ColumnInfo> {
    df.get_columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name().to_string(),
            non_missing: c.len() - c.null_count(),
            dtype: c.dtype().to_string(),
        })
        .collect()
}

fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_number(c.dtype()))
        .map(|c| c.name().to_string())
        .collect()
}

pub fn describe(df: &DataFrame) -> PipelineResult<Vec<Describe>> {
    let mut out = Vec::new();
    for column in numeric_columns(df) {
        let series = df
            .column(&column)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let ca = series.f64()?;
        let count = ca.len() - ca.null_count();
        let (Some(mean), Some(min), Some(max)) = (ca.mean(), ca.min(), ca.max()) else {
            continue;
        };
        let quartile = |q: f64| -> PipelineResult<f64> {
            Ok(ca.quantile(q, QuantileMethod::Linear)?.unwrap_or(f64::NAN))
        };
        out.push(Describe {
            count,
            mean,
            std: if count < 2 { None } else { ca.std(1) },
            min,
            q25: quartile(0.25)?,
            q50: quartile(0.5)?,
            q75: quartile(0.75)?,
            max,
            column,
        });
    }
    Ok(out)
}

/// Non-missing value counts, most frequent first; ties keep first-seen order.
pub fn value_counts(df: &DataFrame, column: &str) -> PipelineResult<Option<Vec<(String, usize)>>> {
    let Some(tally) = value_tally(df, column)? else {
        return Ok(None);
    };
    let mut counts: Vec<(String, usize)> =
        tally.into_iter().map(|(v, n)| (v.render(), n)).collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(Some(counts))
}

/// Pearson correlation over rows where both columns are present.
pub fn pearson(df: &DataFrame, a: &str, b: &str) -> PipelineResult<Option<f64>> {
    let pairs = df
        .clone()
        .lazy()
        .select([
            col(a).cast(DataType::Float64).alias("x"),
            col(b).cast(DataType::Float64).alias("y"),
        ])
        .filter(col("x").is_not_null().and(col("y").is_not_null()))
        .collect()?;
    if pairs.height() < 2 {
        return Ok(None);
    }

    let dx = || col("x") - col("x").mean();
    let dy = || col("y") - col("y").mean();
    let sums = pairs
        .lazy()
        .select([
            (dx() * dy()).sum().alias("cov"),
            (dx() * dx()).sum().alias("vx"),
            (dy() * dy()).sum().alias("vy"),
        ])
        .collect()?;

    let scalar = |name: &str| numbers(&sums, name).first().copied();
    let (Some(cov), Some(vx), Some(vy)) = (scalar("cov"), scalar("vx"), scalar("vy")) else {
        return Ok(None);
    };
    if vx == 0.0 || vy == 0.0 {
        return Ok(None);
    }
    Ok(Some(cov / (vx.sqrt() * vy.sqrt())))
}

pub fn correlation_matrix(df: &DataFrame) -> PipelineResult<(Vec<String>, Vec<Vec<Option<f64>>>)> {
    let names = numeric_columns(df);
    let mut matrix = Vec::with_capacity(names.len());
    for a in &names {
        let mut row = Vec::with_capacity(names.len());
        for b in &names {
            row.push(pearson(df, a, b)?);
        }
        matrix.push(row);
    }
    Ok((names, matrix))
}

pub fn eda(df: &DataFrame) -> PipelineResult<EdaReport> {
    let mut value_counts_out = Vec::new();
    for column in COUNTED_COLUMNS {
        if let Some(counts) = value_counts(df, column)? {
            value_counts_out.push((column.to_string(), counts));
        }
    }
    Ok(EdaReport {
        shape: (df.height(), column_names(df).len()),
        columns: column_info(df),
        describe: describe(df)?,
        duplicates: duplicate_count(df)?,
        value_counts: value_counts_out,
        correlation: correlation_matrix(df)?,
    })
}

fn opt(v: Option<f64>) -> String {
    v.map_or_else(|| "NaN".to_string(), |x| format!("{x:.2}"))
}

impl fmt::Display for EdaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\nShape of the table:")?;
        writeln!(f, "({}, {})", self.shape.0, self.shape.1)?;

        writeln!(f, "\nColumns:")?;
        writeln!(f, "{:<28} {:>10}  {}", "Column", "Non-Null", "Type")?;
        for c in &self.columns {
            writeln!(f, "{:<28} {:>10}  {}", c.name, c.non_missing, c.dtype)?;
        }

        writeln!(f, "\nSummary Statistics:")?;
        writeln!(
            f,
            "{:<20} {:>6} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
            "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for d in &self.describe {
            writeln!(
                f,
                "{:<20} {:>6} {:>14.2} {:>14} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
                d.column,
                d.count,
                d.mean,
                opt(d.std),
                d.min,
                d.q25,
                d.q50,
                d.q75,
                d.max
            )?;
        }

        writeln!(f, "\nMissing values per column:")?;
        for c in &self.columns {
            writeln!(f, "{:<28} {}", c.name, self.shape.0 - c.non_missing)?;
        }

        writeln!(f, "\nNumber of duplicates")?;
        writeln!(f, "{}", self.duplicates)?;

        for (column, counts) in &self.value_counts {
            writeln!(f, "\nCount of each value in '{column}' column")?;
            for (value, n) in counts {
                writeln!(f, "{value:<28} {n}")?;
            }
        }

        let (names, matrix) = &self.correlation;
        if names.len() > 1 {
            writeln!(f, "\nCorrelation matrix:")?;
            write!(f, "{:<20}", "")?;
            for n in names {
                write!(f, " {n:>14}")?;
            }
            writeln!(f)?;
            for (n, row) in names.iter().zip(matrix) {
                write!(f, "{n:<20}")?;
                for v in row {
                    write!(f, " {:>14}", opt(*v))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::parse_csv;

    fn table() -> DataFrame {
        parse_csv(
            "price,surface_area,facade,furnished?\n\
             100,10,North,true\n\
             200,20,South,false\n\
             300,30,North,\n\
             300,30,North,\n",
        )
        .unwrap()
    }

    #[test]
    fn info_and_describe() {
        let t = table();
        let info = column_info(&t);
        assert_eq!(info[0].dtype, DataType::Int64.to_string());
        assert_eq!(info[3].dtype, DataType::Boolean.to_string());
        assert_eq!(info[3].non_missing, 2);

        let d = describe(&t).unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].column, "price");
        assert_eq!(d[0].count, 4);
        assert_eq!(d[0].mean, 225.0);
        assert_eq!(d[0].q50, 250.0);
        assert_eq!(d[0].q25, 175.0);
        assert_eq!(d[0].max, 300.0);
        assert!((d[0].std.unwrap() - 95.742710775633810).abs() < 1e-9);
    }

    #[test]
    fn counts_duplicates_and_correlation() {
        let report = eda(&table()).unwrap();
        assert_eq!(report.duplicates, 1);
        assert_eq!(
            report.value_counts,
            vec![(
                "facade".to_string(),
                vec![("North".to_string(), 3), ("South".to_string(), 1)]
            )]
        );
        let (names, m) = &report.correlation;
        assert_eq!(names, &["price", "surface_area"]);
        assert!((m[0][1].unwrap() - 1.0).abs() < 1e-12);

        let printed = report.to_string();
        assert!(printed.contains("Count of each value in 'facade' column"));
    }

    #[test]
    fn constant_or_short_columns_have_no_correlation() {
        let t = parse_csv("a,b\n1,5\n2,5\n3,5\n").unwrap();
        assert_eq!(pearson(&t, "a", "b").unwrap(), None);
        let t = parse_csv("a,b\n1,\n2,7\n").unwrap();
        assert_eq!(pearson(&t, "a", "b").unwrap(), None);
    }
}
