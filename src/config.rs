// config.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::errors::PipelineResult;
use crate::scraper::Site;

const DEFAULT_CONFIG_FILE: &str = "pipeline.toml";
const ENV_PREFIX: &str = "PIPELINE";

/// Every knob the stages read. Defaults are the values the pipeline was
/// last run with; `pipeline.toml` and `PIPELINE_*` variables override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub site: Site,
    /// Overrides the site's own index URL (everything before the page number).
    pub base_url: Option<String>,
    pub page_suffix: Option<String>,
    pub start_page: u32,
    pub max_pages: u32,

    pub links_file: PathBuf,
    pub records_file: PathBuf,
    pub unclean_csv: PathBuf,
    pub processed_csv: PathBuf,
    pub cleaned_csv: PathBuf,
    pub report_html: PathBuf,
    pub export_xlsx: PathBuf,

    /// Slice of the links file to scrape, `[start_index, end_index)`.
    pub start_index: usize,
    pub end_index: usize,
    pub checkpoint_every: usize,
    pub request_timeout_secs: u64,
    pub page_delay_secs: (f64, f64),
    pub detail_delay_secs: (f64, f64),

    pub category_filter: Option<String>,
    pub keep_url: bool,

    pub min_price: f64,
    pub max_price: f64,
    pub min_surface: f64,
    pub max_surface: f64,
    pub outlier_group: String,
    pub outlier_value: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site: Site::OpenSooq,
            base_url: None,
            page_suffix: None,
            start_page: 1,
            max_pages: 25,
            links_file: PathBuf::from("all_listings_links.txt"),
            records_file: PathBuf::from("property_data.json"),
            unclean_csv: PathBuf::from("unclean_data.csv"),
            processed_csv: PathBuf::from("processed_data.csv"),
            cleaned_csv: PathBuf::from("cleaned_data.csv"),
            report_html: PathBuf::from("index.html"),
            export_xlsx: PathBuf::from("cleaned_data.xlsx"),
            start_index: 1,
            end_index: 6200,
            checkpoint_every: 5,
            request_timeout_secs: 15,
            page_delay_secs: (3.0, 6.0),
            detail_delay_secs: (2.0, 4.0),
            category_filter: Some("Property For Sale".to_string()),
            keep_url: false,
            min_price: 150_000.0,
            max_price: 90_000_000.0,
            min_surface: 60.0,
            max_surface: 260_000.0,
            outlier_group: "subcategory".to_string(),
            outlier_value: "price".to_string(),
        }
    }
}

impl Settings {
    /// Defaults, then the config file (optional unless given explicitly),
    /// then `PIPELINE_*` environment variables.
    pub fn load(path: Option<&Path>) -> PipelineResult<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    pub fn index_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.site.default_index_url())
    }

    pub fn index_page_suffix(&self) -> &str {
        self.page_suffix
            .as_deref()
            .unwrap_or_else(|| self.site.default_page_suffix())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
