// templates/pages/report.rs

use std::collections::HashMap;

use maud::{html, Markup};

use crate::domain::coerce::coerce_price;
use crate::scraper::models::{ListingRecord, NOT_AVAILABLE};
use crate::templates::{card, count_list, desktop_layout};

pub struct PropertyRow {
    pub price: String,
    pub city: String,
    pub neighborhood: String,
    pub bedrooms: String,
    pub surface_area: String,
    pub url: String,
}

pub struct ReportVm {
    pub total: usize,
    pub average_price: f64,
    pub by_city: Vec<(String, usize)>,
    pub by_bedrooms: Vec<(String, usize)>,
    pub furnished: Vec<(String, usize)>,
    pub rows: Vec<PropertyRow>,
    pub generated_at: String,
}

/// Counts of the non-empty values, in first-seen order.
fn tally<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();
    for v in values.flatten().filter(|v| !v.is_empty()) {
        match slot.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(v, counts.len());
                counts.push((v.to_string(), 1));
            }
        }
    }
    counts
}

fn most_common(mut counts: Vec<(String, usize)>) -> Vec<(String, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Two decimals with comma thousands separators.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

impl ReportVm {
    pub fn from_records(records: &[ListingRecord], generated_at: impl Into<String>) -> Self {
        let prices: Vec<f64> = records
            .iter()
            .filter_map(|r| r.price.as_deref().and_then(coerce_price))
            .collect();
        let average_price = if prices.is_empty() {
            0.0
        } else {
            prices.iter().sum::<f64>() / prices.len() as f64
        };

        let attr = |key: &'static str| records.iter().map(move |r| r.attribute(key));
        let or_na = |r: &ListingRecord, key: &str| r.attribute(key).unwrap_or(NOT_AVAILABLE).to_string();

        Self {
            total: records.len(),
            average_price,
            by_city: most_common(tally(attr("City"))),
            by_bedrooms: most_common(tally(attr("Bedrooms"))),
            furnished: tally(attr("Furnished?")),
            rows: records
                .iter()
                .map(|r| PropertyRow {
                    price: r.price.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                    city: or_na(r, "City"),
                    neighborhood: or_na(r, "Neighborhood"),
                    bedrooms: or_na(r, "Bedrooms"),
                    surface_area: or_na(r, "Surface Area"),
                    url: r.url.clone(),
                })
                .collect(),
            generated_at: generated_at.into(),
        }
    }
}

pub fn report_page(vm: &ReportVm) -> Markup {
    desktop_layout(
        "Property Listings Report",
        html! {
            div class="stats-container" {
                (card("Total Properties", html! { p { (vm.total) } }))
                (card("Average Price", html! { p { (format_amount(vm.average_price)) " LYD" } }))
            }

            div class="stats-container" {
                (card("Properties by City", count_list(&vm.by_city)))
                (card("Properties by Bedrooms", count_list(&vm.by_bedrooms)))
                (card("Furnished vs. Unfurnished", count_list(&vm.furnished)))
            }

            h2 { "All Properties" }
            table {
                thead {
                    tr {
                        th { "Price" }
                        th { "City" }
                        th { "Neighborhood" }
                        th { "Bedrooms" }
                        th { "Surface Area" }
                        th { "URL" }
                    }
                }
                tbody {
                    @for row in &vm.rows {
                        tr {
                            td { (row.price) }
                            td { (row.city) }
                            td { (row.neighborhood) }
                            td { (row.bedrooms) }
                            td { (row.surface_area) }
                            td { a href=(row.url) { "Link" } }
                        }
                    }
                }
            }

            footer { "Generated " (vm.generated_at) }
        },
    )
}
