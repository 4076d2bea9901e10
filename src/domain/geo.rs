// src/domain/geo.rs

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

const COORD_PARAMS: &[&str] = &["q", "query", "ll", "center", "destination", "daddr"];

fn valid(lat: f64, lon: f64) -> Option<(f64, f64)> {
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
}

fn parse_pair(s: &str) -> Option<(f64, f64)> {
    let (lat, lon) = s.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    valid(lat, lon)
}

/// Latitude/longitude carried by a Google Maps link, if any.
///
/// Handles `/@lat,lon,zoom`, `?q=lat,lon` (and the other query keys maps
/// links use), and the `!3dlat!4dlon` data segment.
pub fn coordinates_from_map_link(link: &str) -> Option<(f64, f64)> {
    static AT_RE: OnceLock<Regex> = OnceLock::new();
    static DATA_RE: OnceLock<Regex> = OnceLock::new();

    let at_re = AT_RE.get_or_init(|| {
        Regex::new(r"@(-?[0-9]+(?:\.[0-9]+)?),(-?[0-9]+(?:\.[0-9]+)?)").expect("static regex")
    });
    if let Some(caps) = at_re.captures(link) {
        if let Some(pair) = parse_pair(&format!("{},{}", &caps[1], &caps[2])) {
            return Some(pair);
        }
    }

    if let Ok(url) = Url::parse(link) {
        for (key, value) in url.query_pairs() {
            if COORD_PARAMS.contains(&key.as_ref()) {
                if let Some(pair) = parse_pair(&value) {
                    return Some(pair);
                }
            }
        }
    }

    let data_re = DATA_RE.get_or_init(|| {
        Regex::new(r"!3d(-?[0-9]+(?:\.[0-9]+)?)!4d(-?[0-9]+(?:\.[0-9]+)?)").expect("static regex")
    });
    data_re
        .captures(link)
        .and_then(|caps| parse_pair(&format!("{},{}", &caps[1], &caps[2])))
}

/// First high-precision `lat, lon` pair in free text such as a page source
/// (`32.8508622, 13.0904353`).
pub fn coordinates_in_text(text: &str) -> Option<(f64, f64)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"([0-9]{2}\.[0-9]{6,}),\s*([0-9]{2}\.[0-9]{6,})").expect("static regex")
    });
    re.captures_iter(text)
        .find_map(|caps| parse_pair(&format!("{},{}", &caps[1], &caps[2])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parameter_links() {
        assert_eq!(
            coordinates_from_map_link("https://www.google.com/maps?q=32.8872,13.1913"),
            Some((32.8872, 13.1913))
        );
        assert_eq!(
            coordinates_from_map_link(
                "https://www.google.com/maps/search/?api=1&query=32.1167%2C20.0667"
            ),
            Some((32.1167, 20.0667))
        );
    }

    #[test]
    fn at_and_data_segment_links() {
        assert_eq!(
            coordinates_from_map_link("https://www.google.com/maps/place/x/@32.89,13.18,15z"),
            Some((32.89, 13.18))
        );
        assert_eq!(
            coordinates_from_map_link("https://maps.googleusercontent.com/x/data=!3d32.5!4d13.25"),
            Some((32.5, 13.25))
        );
    }

    #[test]
    fn links_without_coordinates_or_out_of_range() {
        assert_eq!(coordinates_from_map_link("https://www.google.com/maps?q=Tripoli"), None);
        assert_eq!(coordinates_from_map_link("N/A"), None);
        assert_eq!(coordinates_from_map_link("https://www.google.com/maps?q=132.5,13.0"), None);
    }

    #[test]
    fn page_source_pairs() {
        let src = r#"<b>32.8508622, 13.0904353</b> and later 1.5, 2.5"#;
        assert_eq!(coordinates_in_text(src), Some((32.8508622, 13.0904353)));
        assert_eq!(coordinates_in_text("no pin here"), None);
    }
}
