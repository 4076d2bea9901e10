use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::config::Settings;
use crate::errors::PipelineResult;
use crate::scraper::Site;

mod config;
mod domain;
mod errors;
mod pipeline;
mod scraper;
mod spreadsheets;
mod store;
mod templates;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "property_pipeline")]
#[command(about = "Scrape, clean and report on real-estate listings")]
struct Cli {
    /// Settings file (defaults to ./pipeline.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect listing links from the site's index pages
    Harvest {
        #[arg(long, value_enum)]
        site: Option<Site>,
        #[arg(long)]
        start_page: Option<u32>,
        #[arg(long)]
        max_pages: Option<u32>,
        /// Links file to append to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Scrape listing details for a slice of the links file
    Scrape {
        #[arg(long, value_enum)]
        site: Option<Site>,
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        start: Option<usize>,
        #[arg(long)]
        end: Option<usize>,
        #[arg(long)]
        checkpoint_every: Option<usize>,
    },
    /// Flatten scraped records into the processed CSV
    Preprocess {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(long)]
        unclean: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fill, normalize and coerce the processed CSV
    Clean {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Booleans, imputation and plausibility filters (in place)
    Transform {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Per-group IQR price filter (in place)
    Outliers {
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(long)]
        group: Option<String>,
        #[arg(long)]
        value: Option<String>,
    },
    /// clean, transform and outliers in sequence
    Prepare {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a summary of a CSV table
    Eda {
        /// Defaults to the cleaned CSV
        file: Option<PathBuf>,
    },
    /// Write the static HTML report
    Report {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a CSV table to an XLSX workbook
    Export {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print scraped records
    View {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Print the distinct values of one column
    Unique {
        #[arg(value_name = "COLUMN")]
        column: String,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn run(command: Commands, mut settings: Settings) -> PipelineResult<()> {
    match command {
        Commands::Harvest {
            site,
            start_page,
            max_pages,
            output,
        } => {
            set(&mut settings.site, site);
            set(&mut settings.start_page, start_page);
            set(&mut settings.max_pages, max_pages);
            set(&mut settings.links_file, output);
            scraper::harvester::run_harvest(&settings).map(|_| ())
        }
        Commands::Scrape {
            site,
            input,
            output,
            start,
            end,
            checkpoint_every,
        } => {
            set(&mut settings.site, site);
            set(&mut settings.links_file, input);
            set(&mut settings.records_file, output);
            set(&mut settings.start_index, start);
            set(&mut settings.end_index, end);
            set(&mut settings.checkpoint_every, checkpoint_every);
            scraper::details::run_scrape(&settings).map(|_| ())
        }
        Commands::Preprocess {
            input,
            unclean,
            output,
        } => {
            set(&mut settings.records_file, input);
            set(&mut settings.unclean_csv, unclean);
            set(&mut settings.processed_csv, output);
            pipeline::run_preprocess(&settings).map(|_| ())
        }
        Commands::Clean { input, output } => {
            set(&mut settings.processed_csv, input);
            set(&mut settings.cleaned_csv, output);
            pipeline::run_clean(&settings).map(|_| ())
        }
        Commands::Transform { file } => {
            set(&mut settings.cleaned_csv, file);
            pipeline::run_transform(&settings).map(|_| ())
        }
        Commands::Outliers { file, group, value } => {
            set(&mut settings.cleaned_csv, file);
            set(&mut settings.outlier_group, group);
            set(&mut settings.outlier_value, value);
            pipeline::run_outliers(&settings).map(|_| ())
        }
        Commands::Prepare { input, output } => {
            set(&mut settings.processed_csv, input);
            set(&mut settings.cleaned_csv, output);
            pipeline::run_prepare(&settings).map(|_| ())
        }
        Commands::Eda { file } => {
            let path = file.unwrap_or(settings.cleaned_csv);
            pipeline::run_eda(&path).map(|_| ())
        }
        Commands::Report { input, output } => {
            set(&mut settings.records_file, input);
            set(&mut settings.report_html, output);
            pipeline::run_report(&settings)
        }
        Commands::Export { input, output } => {
            let input = input.unwrap_or(settings.cleaned_csv);
            let output = output.unwrap_or(settings.export_xlsx);
            pipeline::run_export(&input, &output)
        }
        Commands::View { input } => {
            set(&mut settings.records_file, input);
            pipeline::run_view(&settings)
        }
        Commands::Unique { column, file } => {
            let path = file.unwrap_or(settings.processed_csv);
            pipeline::run_unique(&path, &column)
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    info!(site = %settings.site, "settings loaded");

    match run(cli.command, settings) {
        Ok(()) => Ok(()),
        Err(e) if e.is_reportable() => {
            error!("Error: {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
