use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, warn};

use crate::errors::FetchError;
use crate::models::{PlaylistItemsResponse, ResultPage};

pub const LIST_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/playlistItems";
pub const LIST_PATH: &str = "/youtube/v3/playlistItems";

/// Playlist whose entries the application browses.
pub const DEFAULT_PLAYLIST_ID: &str = "PLidy2DocKWBOtRqkFSRcI4wdrt4wxWPm0";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_key: String,
    pub playlist_id: String,
    pub timeout: Duration,
    /// Overrides the Google endpoint host, used by tests to point the
    /// client at a local mock server.
    pub base_url: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            playlist_id: DEFAULT_PLAYLIST_ID.to_string(),
            timeout: Duration::from_secs(10),
            base_url: None,
        }
    }
}

/// Thin wrapper over the `playlistItems` endpoint. Stateless: every call is
/// an independent request, no caching and no in-flight dedup.
#[derive(Debug, Clone)]
pub struct PlaylistClient {
    client: Client,
    options: ClientOptions,
}

impl PlaylistClient {
    pub fn new(options: ClientOptions) -> Result<Self, FetchError> {
        if options.api_key.trim().is_empty() {
            return Err(FetchError::InvalidConfig("API key is empty".to_string()));
        }
        if options.playlist_id.trim().is_empty() {
            return Err(FetchError::InvalidConfig(
                "playlist id is empty".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self { client, options })
    }

    /// Fetches one page of the playlist. `page_token` is `None` for the
    /// first page, otherwise a cursor returned by a previous page. Any
    /// failure (transport, non-2xx, bad JSON) is retried exactly once; the
    /// second failure propagates.
    pub async fn fetch_page(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ResultPage, FetchError> {
        match self.fetch_once(page_size, page_token).await {
            Ok(page) => Ok(page),
            Err(first) => {
                warn!(error = %first, "page fetch failed, retrying once");
                self.fetch_once(page_size, page_token).await
            }
        }
    }

    async fn fetch_once(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ResultPage, FetchError> {
        let mut params: Vec<(&str, String)> = vec![
            ("key", self.options.api_key.clone()),
            ("part", "snippet".to_string()),
            ("order", "date".to_string()),
            ("maxResults", page_size.to_string()),
            ("playlistId", self.options.playlist_id.clone()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let mut req = self.client.get(self.endpoint());
        for (k, v) in &params {
            req = req.query(&[(k, v.as_str())]);
        }

        let response = req.send().await.map_err(FetchError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                message,
            });
        }
        let bytes = response.bytes().await.map_err(FetchError::Transport)?;
        let payload: PlaylistItemsResponse = serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::InvalidJson(err.to_string()))?;
        debug!(
            items = payload.items.len(),
            total = payload.page_info.total_results,
            "page received"
        );
        Ok(payload.into_page())
    }

    fn endpoint(&self) -> String {
        match &self.options.base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), LIST_PATH),
            None => LIST_ENDPOINT.to_string(),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }
}
