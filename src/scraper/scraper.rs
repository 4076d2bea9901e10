// scraper.rs
use std::time::Duration;

use rand::Rng;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::scraper::{ScraperError, Site};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Blocking HTTP client shared by the link harvester and the detail scraper.
pub struct ListingScraper {
    client: Client,
    site: Site,
}

impl ListingScraper {
    pub fn new(settings: &Settings) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self {
            client,
            site: settings.site,
        })
    }

    pub fn site(&self) -> Site {
        self.site
    }

    /// Fetch a page body. Transport failures are retried with a short
    /// jittered backoff; a non-200 answer is returned as-is so the caller can
    /// skip the page.
    pub fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        const MAX_ATTEMPTS: u64 = 3;
        const MAX_BACKOFF_SECS: u64 = 6;
        const JITTER_MAX_SECS: u64 = 2;

        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let start = std::time::Instant::now();

            match self.try_fetch_html(url) {
                Ok(html) => {
                    debug!(url, attempt, elapsed = ?start.elapsed(), "fetched page");
                    return Ok(html);
                }
                Err(e @ ScraperError::Status { .. }) => return Err(e),
                Err(e) => {
                    warn!("Fetch attempt {attempt} for {url} failed in {:?}: {e}", start.elapsed());
                    last_err = Some(e);

                    if attempt < MAX_ATTEMPTS {
                        let base = std::cmp::min(2 * attempt, MAX_BACKOFF_SECS);
                        let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_SECS);
                        std::thread::sleep(Duration::from_secs(base + jitter));
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ScraperError::Network("fetch retry loop failed".into())))
    }

    fn try_fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ScraperError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().map_err(|e| ScraperError::Network(e.to_string()))
    }
}

/// Sleep for a random duration inside `range` (seconds). Keeps request
/// pacing irregular enough not to trip the sites' rate limits.
pub fn polite_pause(range: (f64, f64)) {
    let (lo, hi) = range;
    if hi <= 0.0 {
        return;
    }
    let secs = if hi > lo {
        rand::thread_rng().gen_range(lo..hi)
    } else {
        hi
    };
    std::thread::sleep(Duration::from_secs_f64(secs.max(0.0)));
}
