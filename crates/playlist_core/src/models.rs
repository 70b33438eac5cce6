use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One playlist entry as the UI consumes it. Rebuilt from the raw API
/// element every time a page is merged; `is_favourite` is the only field
/// mutated in place afterwards (by the favourite toggle).
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub description: String,
    pub playlist_id: String,
    pub published_at: Option<DateTime<Utc>>,
    pub is_favourite: bool,
}

/// Raw `playlistItems` response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub results_per_page: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
}

// The live API omits snippet fields for private or deleted videos, so
// everything defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub playlist_id: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// One normalized page of results. Transient: consumed by the controller's
/// merge step and not retained.
#[derive(Debug, Clone)]
pub struct ResultPage {
    pub items: Vec<RawItem>,
    pub next_page_token: Option<String>,
    pub total_results: u64,
    pub results_per_page: u32,
}

impl PlaylistItemsResponse {
    pub fn into_page(self) -> ResultPage {
        ResultPage {
            items: self.items,
            next_page_token: self.next_page_token,
            total_results: self.page_info.total_results,
            results_per_page: self.page_info.results_per_page,
        }
    }
}

impl RawItem {
    pub fn into_list_item(self, is_favourite: bool) -> ListItem {
        ListItem {
            id: self.id,
            title: self.snippet.title,
            channel_title: self.snippet.channel_title,
            description: self.snippet.description,
            playlist_id: self.snippet.playlist_id,
            published_at: self.snippet.published_at,
            is_favourite,
        }
    }
}
