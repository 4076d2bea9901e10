// harvester.rs
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::config::Settings;
use crate::errors::PipelineResult;
use crate::scraper::polite_pause;
use crate::scraper::{ListingScraper, ScraperError, Site};
use crate::store;

pub struct HarvestStats {
    pub pages: u32,
    pub links: usize,
}

/// Listing links found on one index page, made absolute against the site
/// origin. Duplicates within a page are kept; dedup happens at scrape time.
pub fn extract_card_links(html: &str, site: Site) -> Result<Vec<String>, ScraperError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(site.card_selector())
        .map_err(|e| ScraperError::HtmlParse(e.to_string()))?;

    let base = Url::parse(site.origin()).map_err(|e| ScraperError::HtmlParse(e.to_string()))?;

    Ok(document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
        .filter_map(|href| absolutize(&base, href.trim()))
        .collect())
}

fn absolutize(base: &Url, href: &str) -> Option<String> {
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    base.join(href).ok().map(String::from)
}

/// Index page `page` of the configured site.
pub fn index_page_url(settings: &Settings, page: u32) -> String {
    format!(
        "{}{}{}",
        settings.index_base_url(),
        page,
        settings.index_page_suffix()
    )
}

/// Walk index pages from `start_page` to `max_pages`, handing each page's
/// links to `on_page` before moving on. Stops at the first page that fails
/// or comes back without cards (blocked, or past the end).
pub fn harvest_links<F, S>(settings: &Settings, mut fetch: F, mut on_page: S) -> HarvestStats
where
    F: FnMut(&str) -> Result<String, ScraperError>,
    S: FnMut(&[String]) -> Result<(), ScraperError>,
{
    let mut stats = HarvestStats { pages: 0, links: 0 };

    for page in settings.start_page..=settings.max_pages {
        let page_url = index_page_url(settings, page);
        info!("Scraping page {page}: {page_url}");

        let fetched = fetch(&page_url).and_then(|html| extract_card_links(&html, settings.site));
        let links = match fetched {
            Ok(links) => links,
            Err(e) => {
                warn!("Page {page} failed, stopping: {e}");
                break;
            }
        };

        if links.is_empty() {
            info!("No listings found on page {page}, end of results reached");
            break;
        }

        if let Err(e) = on_page(&links) {
            warn!("Could not save links from page {page}, stopping: {e}");
            break;
        }

        stats.pages += 1;
        stats.links += links.len();
        info!("Saved {} links. Total so far: {}", links.len(), stats.links);

        polite_pause(settings.page_delay_secs);
    }

    stats
}

/// Harvest into the configured links file, appending page by page.
pub fn run_link_harvest<F>(settings: &Settings, fetch: F) -> HarvestStats
where
    F: FnMut(&str) -> Result<String, ScraperError>,
{
    let stats = harvest_links(settings, fetch, |links| {
        store::append_links(&settings.links_file, links)
            .map_err(|e| ScraperError::IoError(e.to_string()))
    });

    info!(
        "--- Harvest complete! {} links from {} pages in {} ---",
        stats.links,
        stats.pages,
        settings.links_file.display()
    );
    stats
}

/// Link harvest over the network with the configured site and pacing.
pub fn run_harvest(settings: &Settings) -> PipelineResult<HarvestStats> {
    let scraper = ListingScraper::new(settings)?;
    info!("--- Starting link harvest on {} ---", scraper.site());
    Ok(run_link_harvest(settings, |url| scraper.fetch_html(url)))
}
