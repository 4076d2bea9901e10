pub mod details;
pub mod harvester;
pub mod models;
mod scraper;
mod scraper_error;
pub mod sites;

pub use self::scraper::{polite_pause, ListingScraper};
pub use scraper_error::ScraperError;
pub use sites::Site;
