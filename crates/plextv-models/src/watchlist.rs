use serde::{Deserialize, Serialize};

use crate::media::MediaType;

/// A fully enriched watchlist entry.
///
/// `tmdb_id` of 0 means the detail record carried no TMDB cross-reference;
/// such items are dropped before a page is returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistItem {
    pub rating_key: String,
    pub tmdb_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvdb_id: Option<u32>,
    pub title: String,
    pub media_type: MediaType,
}

/// One page of the account watchlist.
///
/// `offset` and `size` echo the requested window; `total_size` is the total
/// item count as last reported by the source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistPage {
    pub offset: u32,
    pub size: u32,
    pub total_size: u32,
    pub items: Vec<WatchlistItem>,
}
