// sites.rs
use serde::{Deserialize, Serialize};

/// The two listing sites the pipeline knows how to read. Each carries its
/// hard-coded DOM contract; a markup change on the site degrades extraction
/// to "N/A" sentinels rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    #[value(name = "opensooq")]
    OpenSooq,
    Bahu,
}

impl Site {
    pub fn origin(&self) -> &'static str {
        match self {
            Site::OpenSooq => "https://ly.opensooq.com",
            Site::Bahu => "https://bahu.ly",
        }
    }

    pub fn default_index_url(&self) -> &'static str {
        match self {
            Site::OpenSooq => "https://ly.opensooq.com/en/find?sort_code=recent&page=",
            Site::Bahu => {
                "https://bahu.ly/en/offers/buy/search?category=Residential%20For%20Sale\
                 &type=Apartment&type=Studio&type=villa&type=dublex&type=house&page="
            }
        }
    }

    pub fn default_page_suffix(&self) -> &'static str {
        match self {
            Site::OpenSooq => "&vertical_link=Property/Buy/Buy+Residential",
            Site::Bahu => "",
        }
    }

    /// Anchors on an index page that lead to a single listing.
    pub fn card_selector(&self) -> &'static str {
        match self {
            Site::OpenSooq => "a.postListItemData",
            Site::Bahu => ".second-block a",
        }
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Site::OpenSooq => write!(f, "opensooq"),
            Site::Bahu => write!(f, "bahu"),
        }
    }
}
