// preprocess.rs
use polars::prelude::*;
use tracing::{info, warn};

use crate::config::Settings;
use crate::domain::coerce::coerce_price;
use crate::domain::geo::coordinates_from_map_link;
use crate::domain::table::{
    cells_to_series, column_cells, drop_columns, drop_empty_columns, has_column, rename_columns,
    unique_rows, write_csv, Cell, FrameBuilder,
};
use crate::errors::PipelineResult;
use crate::pipeline::log_overview;
use crate::scraper::models::{ListingRecord, NOT_AVAILABLE};
use crate::store;

const BASE_COLUMNS: &[&str] = &["url", "price", "location"];

/// JSON records → unclean CSV + processed CSV. Returns the processed table.
pub fn run_preprocess(settings: &Settings) -> PipelineResult<DataFrame> {
    let records = store::load_records(&settings.records_file)?;
    info!("Loaded {} records from {}", records.len(), settings.records_file.display());

    write_csv(&mut unclean_table(&records)?, &settings.unclean_csv)?;

    let mut df = preprocess(&records, settings)?;
    write_csv(&mut df, &settings.processed_csv)?;
    info!("Processed data saved to {}", settings.processed_csv.display());
    Ok(df)
}

fn text_or_missing(value: Option<&str>) -> Cell {
    value.map_or(Cell::Missing, Cell::text)
}

/// Records as scraped, one row each, attributes kept as a JSON object string.
pub fn unclean_table(records: &[ListingRecord]) -> PipelineResult<DataFrame> {
    let with_description = records.iter().any(|r| r.description.is_some());
    let mut frame = FrameBuilder::new(BASE_COLUMNS);
    for rec in records {
        frame.push_row();
        frame.set("url", Cell::text(rec.url.as_str()));
        frame.set("price", text_or_missing(rec.price.as_deref()));
        frame.set("location", text_or_missing(rec.location.as_deref()));
        if with_description {
            frame.set("description", text_or_missing(rec.description.as_deref()));
        }
        frame.set(
            "attributes",
            Cell::Text(serde_json::to_string(&rec.attributes).unwrap_or_default()),
        );
    }
    frame.finish()
}

fn attribute_cell(value: &str) -> Cell {
    if value.trim() == NOT_AVAILABLE {
        Cell::Missing
    } else {
        Cell::infer(value)
    }
}

/// `Surface Area ` → `surface_area`.
pub fn standard_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Flattens scraped records into the processed table.
///
/// Rows without a usable price are dropped, identical rows collapse to one,
/// every attribute becomes a column (first-seen order), map links fill in
/// missing `latitude`/`longitude`, and only the configured category survives.
pub fn preprocess(records: &[ListingRecord], settings: &Settings) -> PipelineResult<DataFrame> {
    log_overview("preprocess (raw)", &unclean_table(records)?);

    let mut frame = FrameBuilder::new(BASE_COLUMNS);
    for rec in records {
        let Some(raw) = rec.price.as_deref() else {
            continue;
        };
        let Some(price) = coerce_price(raw) else {
            warn!(url = %rec.url, price = raw, "dropping record with malformed price");
            continue;
        };

        frame.push_row();
        frame.set("url", Cell::text(rec.url.as_str()));
        frame.set("price", Cell::Number(price));
        let location = match rec.location.as_deref() {
            Some(link) if link.starts_with("http") => Cell::text(link),
            _ => Cell::Missing,
        };
        frame.set("location", location);
        if let Some(desc) = rec.description.as_deref() {
            frame.set("description", Cell::text(desc));
        }
        for (key, value) in rec.attributes.iter() {
            frame.set(key, attribute_cell(value));
        }
    }
    let df = frame.finish()?;
    if df.height() < records.len() {
        info!("Dropped {} rows without a usable price", records.len() - df.height());
    }

    let priced = df.height();
    let mut df = unique_rows(&df)?;
    if df.height() < priced {
        info!("Dropped {} duplicate rows", priced - df.height());
    }

    if !settings.keep_url {
        drop_columns(&mut df, &["url"]);
    }

    rename_columns(&mut df, standard_column_name)?;
    fill_coordinates(&mut df)?;

    let mut df = match (&settings.category_filter, has_column(&df, "category")) {
        (Some(category), true) => {
            let mask: BooleanChunked = column_cells(&df, "category")
                .unwrap_or_default()
                .iter()
                .map(|c| c.as_str().is_some_and(|s| s.trim() == category.as_str()))
                .collect();
            let kept = df.filter(&mask)?;
            info!("Kept {} rows in category '{category}'", kept.height());
            kept
        }
        (Some(_), false) => {
            warn!("No 'category' column; category filter skipped");
            df
        }
        (None, _) => df,
    };

    drop_empty_columns(&mut df);
    log_overview("preprocess", &df);
    Ok(df)
}

/// Fills `latitude`/`longitude` from the row's map link wherever either is
/// missing. Values already present are kept.
fn fill_coordinates(df: &mut DataFrame) -> PipelineResult<()> {
    let Some(locations) = column_cells(df, "location") else {
        return Ok(());
    };
    let coords: Vec<Option<(f64, f64)>> = locations
        .iter()
        .map(|c| c.as_str().and_then(coordinates_from_map_link))
        .collect();
    let has_existing = has_column(df, "latitude") || has_column(df, "longitude");
    if !has_existing && coords.iter().all(Option::is_none) {
        return Ok(());
    }

    let blank = || vec![Cell::Missing; df.height()];
    let mut lat = column_cells(df, "latitude").unwrap_or_else(blank);
    let mut lon = column_cells(df, "longitude").unwrap_or_else(blank);
    let mut filled = 0usize;
    for (i, pair) in coords.into_iter().enumerate() {
        let Some((la, lo)) = pair else {
            continue;
        };
        if lat[i].as_f64().is_none() || lon[i].as_f64().is_none() {
            lat[i] = Cell::Number(la);
            lon[i] = Cell::Number(lo);
            filled += 1;
        }
    }
    if filled > 0 {
        info!("Derived coordinates for {filled} rows from map links");
    }

    df.with_column(cells_to_series("latitude", &lat))?;
    df.with_column(cells_to_series("longitude", &lon))?;
    Ok(())
}
