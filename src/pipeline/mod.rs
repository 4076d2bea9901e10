pub mod clean;
pub mod eda;
pub mod inspect;
pub mod preprocess;
pub mod transform;

use std::fs;
use std::path::Path;

use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::domain::outliers::remove_outliers_by_group;
use crate::domain::table::{read_csv, write_csv};
use crate::errors::{PipelineError, PipelineResult};
use crate::spreadsheets::export_table_xlsx;
use crate::store;
use crate::templates::{report_page, ReportVm};

pub use clean::clean;
pub use preprocess::run_preprocess;
pub use transform::transform;

/// Shape plus per-column fill at debug level; used before and after the
/// stages that reshape the table.
pub(crate) fn log_overview(stage: &str, df: &DataFrame) {
    let (rows, cols) = df.shape();
    info!(stage, rows, cols, "table shape");
    for col in eda::column_info(df) {
        debug!(
            stage,
            column = %col.name,
            non_missing = col.non_missing,
            dtype = %col.dtype,
            "column"
        );
    }
}

pub fn run_clean(settings: &Settings) -> PipelineResult<DataFrame> {
    let df = read_csv(&settings.processed_csv)?;
    let mut cleaned = clean(df)?;
    write_csv(&mut cleaned, &settings.cleaned_csv)?;
    info!("Cleaned data saved to {}", settings.cleaned_csv.display());
    Ok(cleaned)
}

pub fn run_transform(settings: &Settings) -> PipelineResult<DataFrame> {
    let df = read_csv(&settings.cleaned_csv)?;
    let mut transformed = transform(df, settings)?;
    write_csv(&mut transformed, &settings.cleaned_csv)?;
    info!("Transformed data saved to {}", settings.cleaned_csv.display());
    Ok(transformed)
}

pub fn run_outliers(settings: &Settings) -> PipelineResult<DataFrame> {
    let df = read_csv(&settings.cleaned_csv)?;
    let mut filtered =
        remove_outliers_by_group(&df, &settings.outlier_group, &settings.outlier_value)?;
    write_csv(&mut filtered, &settings.cleaned_csv)?;
    info!("Outlier removal complete. Cleaned data saved to {}", settings.cleaned_csv.display());
    Ok(filtered)
}

/// clean → transform → outliers in one go, writing only the final table.
pub fn run_prepare(settings: &Settings) -> PipelineResult<DataFrame> {
    let df = read_csv(&settings.processed_csv)?;
    let df = transform(clean(df)?, settings)?;
    let mut df = remove_outliers_by_group(&df, &settings.outlier_group, &settings.outlier_value)?;
    write_csv(&mut df, &settings.cleaned_csv)?;
    log_overview("prepare", &df);
    info!("Prepared data saved to {}", settings.cleaned_csv.display());
    Ok(df)
}

pub fn run_eda(path: &Path) -> PipelineResult<eda::EdaReport> {
    let df = read_csv(path)?;
    if df.height() == 0 {
        warn!("{} has no rows", path.display());
    }
    let report = eda::eda(&df)?;
    println!("{report}");
    Ok(report)
}

/// Static HTML summary of the raw scraped records.
pub fn run_report(settings: &Settings) -> PipelineResult<()> {
    let records = store::load_records(&settings.records_file)?;
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    let page = report_page(&ReportVm::from_records(&records, generated_at));

    fs::write(&settings.report_html, page.into_string())
        .map_err(|e| PipelineError::io(&settings.report_html, e))?;
    info!("Successfully generated {}", settings.report_html.display());
    Ok(())
}

pub fn run_export(input: &Path, output: &Path) -> PipelineResult<()> {
    let df = read_csv(input)?;
    export_table_xlsx(&df, output)
}

pub fn run_view(settings: &Settings) -> PipelineResult<()> {
    let records = store::load_records(&settings.records_file)?;
    print!("{}", inspect::render_records(&records));
    Ok(())
}

pub fn run_unique(path: &Path, column: &str) -> PipelineResult<()> {
    let df = read_csv(path)?;
    let values = inspect::unique_values(&df, column)?;
    println!("Unique values in column '{column}':");
    for value in values {
        println!("{value}");
    }
    Ok(())
}
