// details.rs
use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::config::Settings;
use crate::errors::PipelineResult;
use crate::scraper::models::{Attributes, ListingRecord, NOT_AVAILABLE};
use crate::scraper::polite_pause;
use crate::scraper::{ListingScraper, ScraperError, Site};
use crate::store;

#[derive(Debug, Default, PartialEq)]
pub struct ScrapeStats {
    pub in_file: usize,
    pub targeted: usize,
    pub already_scraped: usize,
    pub scraped: usize,
    pub failed: usize,
}

/// Parse one listing page according to the site's DOM contract.
pub fn parse_listing(site: Site, url: &str, html: &str) -> ListingRecord {
    match site {
        Site::OpenSooq => parse_opensooq(url, html),
        Site::Bahu => parse_bahu(url, html),
    }
}

fn sel(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("static selector"))
}

/// Text of an element with every text node trimmed and joined by `sep`.
fn element_text(el: ElementRef, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn first_text(scope: ElementRef, selector: &Selector, sep: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| element_text(el, sep))
}

pub fn parse_opensooq(url: &str, html: &str) -> ListingRecord {
    static PRICE: OnceLock<Selector> = OnceLock::new();
    static ANCHOR: OnceLock<Selector> = OnceLock::new();
    static INFO_ITEMS: OnceLock<Selector> = OnceLock::new();
    static KEY: OnceLock<Selector> = OnceLock::new();
    static VALUE_A: OnceLock<Selector> = OnceLock::new();
    static VALUE_SPAN: OnceLock<Selector> = OnceLock::new();

    let document = Html::parse_document(html);
    let root = document.root_element();
    let mut record = ListingRecord::new(url);

    if let Some(price) = first_text(root, sel(&PRICE, "div.priceColor"), " ") {
        record.price = Some(price);
    }

    let map_link = root
        .select(sel(&ANCHOR, "a[href]"))
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains("google.com/maps") || href.contains("googleusercontent.com"));
    if let Some(href) = map_link {
        record.location = Some(href.to_string());
    }

    let items = sel(
        &INFO_ITEMS,
        r#"section#PostViewInformation li[data-id^="singeInfoField"]"#,
    );
    for item in root.select(items) {
        let Some(key) = first_text(item, sel(&KEY, "p"), "") else {
            continue;
        };
        let value = first_text(item, sel(&VALUE_A, "a"), "")
            .or_else(|| first_text(item, sel(&VALUE_SPAN, "span"), ""))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        record.attributes.insert(key, value);
    }

    record
}

pub fn parse_bahu(url: &str, html: &str) -> ListingRecord {
    static PRICE: OnceLock<Selector> = OnceLock::new();
    static DESCRIPTION: OnceLock<Selector> = OnceLock::new();
    static LOCATION: OnceLock<Selector> = OnceLock::new();
    static ATTR_BLOCK: OnceLock<Selector> = OnceLock::new();
    static ATTR_VALUE: OnceLock<Selector> = OnceLock::new();
    static LOC_RE: OnceLock<Regex> = OnceLock::new();

    let document = Html::parse_document(html);
    let root = document.root_element();
    let mut record = ListingRecord::new(url);
    let attrs = &mut record.attributes;

    attrs.insert("Category", "Property For Sale");
    for key in ["City", "Neighborhood", "Subcategory", "Bedrooms", "Bathrooms", "Surface Area"] {
        attrs.insert(key, NOT_AVAILABLE);
    }

    if let Some(price) = first_text(root, sel(&PRICE, "h5.price"), " ") {
        record.price = Some(price);
    }

    let description = first_text(root, sel(&DESCRIPTION, ".description-content"), "\n");
    if let Some(desc) = &description {
        for (k, v) in hidden_features(desc).iter() {
            attrs.insert(k, v);
        }
    }
    record.description = description;

    // "Ghut Shaal (Tripoli)"
    let loc_re = LOC_RE.get_or_init(|| Regex::new(r"(.*)\((.*)\)").expect("static regex"));
    let heading = first_text(
        root,
        sel(&LOCATION, "div.d-flex.flex-column.align-items-center h6"),
        " ",
    );
    if let Some(caps) = heading.as_deref().and_then(|h| loc_re.captures(h)) {
        attrs.insert("Neighborhood", caps[1].trim());
        attrs.insert("City", caps[2].trim());
    }

    for block in root.select(sel(&ATTR_BLOCK, "div.w-50")) {
        let label = element_text(block, " ").to_lowercase();
        let Some(value) = first_text(block, sel(&ATTR_VALUE, ".value"), " ") else {
            continue;
        };
        let key = if label.contains("type") {
            "Subcategory"
        } else if label.contains("bed") {
            "Bedrooms"
        } else if label.contains("bath") {
            "Bathrooms"
        } else if label.contains("area") {
            "Surface Area"
        } else {
            continue;
        };
        attrs.insert(key, value);
    }

    if let Some((lat, lon)) = crate::domain::geo::coordinates_in_text(html) {
        attrs.insert("Latitude", lat.to_string());
        attrs.insert("Longitude", lon.to_string());
    }

    record
}

/// Attributes Bahu never shows as fields but that the description usually
/// gives away, in English or Arabic.
pub fn hidden_features(description: &str) -> Attributes {
    static AGE_RE: OnceLock<Regex> = OnceLock::new();

    let desc = description.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| desc.contains(w));

    let mut age = if has_any(&["جديد", "حديث", "new", "modern", "إنشاء"]) {
        "0".to_string()
    } else {
        NOT_AVAILABLE.to_string()
    };
    let age_re =
        AGE_RE.get_or_init(|| Regex::new(r"(\d+)\s*(سنة|سنين|years)").expect("static regex"));
    if let Some(caps) = age_re.captures(&desc) {
        age = caps[1].to_string();
    }

    let facade = if desc.contains("شمال") {
        "North"
    } else if desc.contains("جنوب") {
        "South"
    } else if desc.contains("شرق") {
        "East"
    } else if desc.contains("غرب") {
        "West"
    } else {
        NOT_AVAILABLE
    };

    let mut attrs = Attributes::default();
    attrs.insert(
        "Furnished?",
        if has_any(&["unfurnished", "غير مفروش"]) {
            "Unfurnished"
        } else if has_any(&["furnished", "مفروش", "أثاث"]) {
            "Furnished"
        } else {
            "Unfurnished"
        },
    );
    attrs.insert(
        "Property Mortgaged?",
        if has_any(&["mortgage", "رهن", "مرهون", "مصرف"]) { "Yes" } else { "No" },
    );
    attrs.insert(
        "Lister Type",
        if has_any(&["شركة", "مكتب", "agency", "office"]) { "Agent" } else { "Owner" },
    );
    attrs.insert("Facade", facade);
    attrs.insert("Building Age", age);
    attrs
}

/// Scrape every not-yet-seen link in the configured slice of the links file.
///
/// `fetch` returns a page body or an error; errors skip the link. Results
/// accumulate on top of whatever the output file already holds and are
/// flushed every `checkpoint_every` new records and once at the end.
pub fn run_detail_scrape<F>(settings: &Settings, mut fetch: F) -> PipelineResult<ScrapeStats>
where
    F: FnMut(&str) -> Result<String, ScraperError>,
{
    let all_links = store::read_links(&settings.links_file)?;
    let end = settings.end_index.min(all_links.len());
    let start = settings.start_index.min(end);
    let subset = &all_links[start..end];

    let mut results = store::load_records_or_empty(&settings.records_file);
    let mut seen: HashSet<String> = results.iter().map(|r| r.url.clone()).collect();

    let mut stats = ScrapeStats {
        in_file: all_links.len(),
        targeted: subset.len(),
        ..Default::default()
    };

    let to_process: Vec<&String> = subset
        .iter()
        .filter(|url| {
            let fresh = seen.insert((*url).clone());
            if !fresh {
                stats.already_scraped += 1;
            }
            fresh
        })
        .collect();

    info!("File contains {} links.", stats.in_file);
    info!("Targeting range [{start}:{end}]. ({} links).", stats.targeted);
    info!("After checking for duplicates, {} links left to scrape.", to_process.len());

    let checkpoint_every = settings.checkpoint_every.max(1);

    for (i, url) in to_process.iter().enumerate() {
        info!("Processing {}/{}: {}", i + 1, to_process.len(), url);

        match fetch(url) {
            Ok(html) => {
                results.push(parse_listing(settings.site, url, &html));
                stats.scraped += 1;

                if (i + 1) % checkpoint_every == 0 {
                    store::save_records(&settings.records_file, &results)?;
                }
            }
            Err(e) => {
                warn!("Error scraping {url}: {e}");
                stats.failed += 1;
            }
        }

        polite_pause(settings.detail_delay_secs);
    }

    store::save_records(&settings.records_file, &results)?;
    info!("✅ Done! {} records in {}", results.len(), settings.records_file.display());

    Ok(stats)
}

/// Detail scrape over the network with the configured site and pacing.
pub fn run_scrape(settings: &Settings) -> PipelineResult<ScrapeStats> {
    let scraper = ListingScraper::new(settings)?;
    let stats = run_detail_scrape(settings, |url| scraper.fetch_html(url))?;
    info!(
        "Scraped {} new, {} failed, {} already present",
        stats.scraped, stats.failed, stats.already_scraped
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPENSOOQ_PAGE: &str = r#"
        <html><body>
          <div class="priceColor"> 1,250,000 <span>LYD</span></div>
          <a href="https://example.com/other">other</a>
          <a href="https://www.google.com/maps?q=32.8872,13.1913">Map</a>
          <section id="PostViewInformation">
            <ul>
              <li data-id="singeInfoField_1"><p>City</p><a href="/c">Tripoli</a></li>
              <li data-id="singeInfoField_2"><p>Bedrooms</p><span>3 Bedrooms</span></li>
              <li data-id="singeInfoField_3"><p>Neighborhood</p></li>
              <li data-id="somethingElse"><p>Ignored</p><span>x</span></li>
            </ul>
          </section>
        </body></html>"#;

    #[test]
    fn opensooq_page_fills_price_location_and_attributes() {
        let rec = parse_opensooq("https://ly.opensooq.com/en/search/1", OPENSOOQ_PAGE);

        assert_eq!(rec.price.as_deref(), Some("1,250,000 LYD"));
        assert_eq!(
            rec.location.as_deref(),
            Some("https://www.google.com/maps?q=32.8872,13.1913")
        );
        assert_eq!(rec.attribute("City"), Some("Tripoli"));
        assert_eq!(rec.attribute("Bedrooms"), Some("3 Bedrooms"));
        assert_eq!(rec.attribute("Neighborhood"), Some("N/A"));
        assert_eq!(rec.attribute("Ignored"), None);
    }

    #[test]
    fn markup_change_degrades_to_sentinels() {
        let rec = parse_opensooq("https://x.test/1", "<html><body><h1>new layout</h1></body></html>");
        assert_eq!(rec.price.as_deref(), Some("N/A"));
        assert_eq!(rec.location.as_deref(), Some("N/A"));
        assert!(rec.attributes.is_empty());
    }

    #[test]
    fn bahu_page_maps_fields_and_description_features() {
        let html = r#"
            <html><body>
              <h5 class="price">350,000 LYD</h5>
              <div class="description-content">Furnished apartment, 5 years old, north facing شمال</div>
              <div class="d-flex flex-column align-items-center"><h6>Ghut Shaal (Tripoli)</h6></div>
              <div class="w-50">Property Type <span class="value">Apartment</span></div>
              <div class="w-50">Bedrooms <span class="value">3</span></div>
              <div class="w-50">Bathrooms <span class="value">2</span></div>
              <div class="w-50">Area <span class="value">140</span></div>
              <script>var pin = "32.8508622, 13.0904353";</script>
            </body></html>"#;

        let rec = parse_bahu("https://bahu.ly/en/offer/1", html);
        assert_eq!(rec.price.as_deref(), Some("350,000 LYD"));
        assert_eq!(rec.attribute("Neighborhood"), Some("Ghut Shaal"));
        assert_eq!(rec.attribute("City"), Some("Tripoli"));
        assert_eq!(rec.attribute("Subcategory"), Some("Apartment"));
        assert_eq!(rec.attribute("Bedrooms"), Some("3"));
        assert_eq!(rec.attribute("Bathrooms"), Some("2"));
        assert_eq!(rec.attribute("Surface Area"), Some("140"));
        assert_eq!(rec.attribute("Furnished?"), Some("Furnished"));
        assert_eq!(rec.attribute("Building Age"), Some("5"));
        assert_eq!(rec.attribute("Facade"), Some("North"));
        assert_eq!(rec.attribute("Latitude"), Some("32.8508622"));
        assert_eq!(rec.attribute("Longitude"), Some("13.0904353"));
        assert_eq!(rec.attribute("Category"), Some("Property For Sale"));
    }

    #[test]
    fn hidden_features_default_when_description_is_silent() {
        let attrs = hidden_features("Nice place near the sea");
        assert_eq!(attrs.get("Furnished?"), Some("Unfurnished"));
        assert_eq!(attrs.get("Property Mortgaged?"), Some("No"));
        assert_eq!(attrs.get("Lister Type"), Some("Owner"));
        assert_eq!(attrs.get("Facade"), Some("N/A"));
        assert_eq!(attrs.get("Building Age"), Some("N/A"));

        assert_eq!(hidden_features("Unfurnished flat").get("Furnished?"), Some("Unfurnished"));

        let attrs = hidden_features("بيت جديد عن طريق مكتب");
        assert_eq!(attrs.get("Building Age"), Some("0"));
        assert_eq!(attrs.get("Lister Type"), Some("Agent"));
    }
}
