use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::info;

use polars::prelude::DataFrame;

use crate::domain::table::{column_cells, column_names, Cell};
use crate::errors::PipelineResult;

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), XlsxError> {
    match cell {
        Cell::Missing => {}
        Cell::Number(n) => {
            sheet.write_number(row, col, *n)?;
        }
        Cell::Bool(b) => {
            sheet.write_string(row, col, if *b { "Yes" } else { "No" })?;
        }
        Cell::Text(s) => {
            sheet.write_string(row, col, s)?;
        }
    }
    Ok(())
}

/// Header row, then one sheet row per frame row. Missing cells stay blank.
pub fn table_workbook(df: &DataFrame) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet().set_name("listings")?;

    for (col, name) in column_names(df).iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, name, &header)?;
        for (i, cell) in column_cells(df, name).unwrap_or_default().iter().enumerate() {
            write_cell(worksheet, (i + 1) as u32, col, cell)?;
        }
    }

    worksheet.autofit();
    Ok(workbook)
}

pub fn export_table_xlsx(df: &DataFrame, path: &Path) -> PipelineResult<()> {
    let mut workbook = table_workbook(df)?;
    workbook.save(path)?;
    info!("Exported {} rows to {}", df.height(), path.display());
    Ok(())
}
