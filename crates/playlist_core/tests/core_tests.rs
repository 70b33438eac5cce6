use std::time::Duration;

use httpmock::prelude::*;
use playlist_core::{
    ClientOptions, FavouriteSet, FetchError, FileStore, KeyValueStore, MemoryStore,
    PlaylistClient, FAVOURITES_KEY,
};
use serde_json::json;
use tempfile::tempdir;

type TestResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn client_for(server: &MockServer) -> PlaylistClient {
    let options = ClientOptions {
        api_key: "test-key".to_string(),
        playlist_id: "PL123".to_string(),
        base_url: Some(server.base_url()),
        ..Default::default()
    };
    PlaylistClient::new(options).expect("client")
}

fn has_page_token(req: &HttpMockRequest) -> bool {
    req.query_params
        .as_ref()
        .map(|params| params.iter().any(|(key, _)| key == "pageToken"))
        .unwrap_or(false)
}

#[test]
fn client_rejects_empty_api_key() {
    let err = PlaylistClient::new(ClientOptions::default()).unwrap_err();
    assert!(matches!(err, FetchError::InvalidConfig(_)));
}

#[tokio::test]
async fn first_page_request_carries_no_token() -> TestResult<()> {
    let server = MockServer::start();

    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/youtube/v3/playlistItems")
            .query_param("key", "test-key")
            .query_param("part", "snippet")
            .query_param("order", "date")
            .query_param("maxResults", "2")
            .query_param("playlistId", "PL123")
            .matches(|req| !has_page_token(req));
        then.status(200).json_body(json!({
            "items": [
                {"id": "a", "snippet": {"title": "First", "channelTitle": "Chan"}},
                {"id": "b", "snippet": {"title": "Second", "channelTitle": "Chan"}}
            ],
            "nextPageToken": "T1",
            "pageInfo": {"totalResults": 4, "resultsPerPage": 2}
        }));
    });

    let page = client_for(&server).fetch_page(2, None).await?;
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.next_page_token.as_deref(), Some("T1"));
    assert_eq!(page.total_results, 4);
    assert_eq!(page.results_per_page, 2);
    first.assert();
    Ok(())
}

#[tokio::test]
async fn continuation_request_carries_token() -> TestResult<()> {
    let server = MockServer::start();

    let next = server.mock(|when, then| {
        when.method(GET)
            .path("/youtube/v3/playlistItems")
            .query_param("pageToken", "T1");
        then.status(200).json_body(json!({
            "items": [{"id": "c", "snippet": {"title": "Third"}}],
            "pageInfo": {"totalResults": 3, "resultsPerPage": 1}
        }));
    });

    let page = client_for(&server).fetch_page(2, Some("T1")).await?;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.next_page_token, None);
    next.assert();
    Ok(())
}

#[tokio::test]
async fn server_error_is_retried_exactly_once() {
    let server = MockServer::start();

    let failing = server.mock(|when, then| {
        when.method(GET).path("/youtube/v3/playlistItems");
        then.status(500).body("quota exceeded");
    });

    let err = client_for(&server).fetch_page(5, None).await.unwrap_err();
    match &err {
        FetchError::Server { status, message } => {
            assert_eq!(*status, 500);
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("expected server error, got {other}"),
    }
    assert!(err.to_string().contains("Error Code: 500"));
    failing.assert_hits(2);
}

#[tokio::test]
async fn malformed_body_is_an_invalid_json_error() {
    let server = MockServer::start();

    let garbled = server.mock(|when, then| {
        when.method(GET).path("/youtube/v3/playlistItems");
        then.status(200).body("<html>not json</html>");
    });

    let err = client_for(&server).fetch_page(5, None).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidJson(_)));
    garbled.assert_hits(2);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let options = ClientOptions {
        api_key: "test-key".to_string(),
        playlist_id: "PL123".to_string(),
        base_url: Some("http://127.0.0.1:1".to_string()),
        timeout: Duration::from_secs(2),
    };
    let client = PlaylistClient::new(options).expect("client");
    let err = client.fetch_page(5, None).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}

#[test]
fn missing_store_file_reads_as_empty_set() -> TestResult<()> {
    let dir = tempdir()?;
    let store = FileStore::open(dir.path().join("favourites.json"))?;
    let favourites = FavouriteSet::load(&store)?;
    assert!(favourites.ids().is_empty());
    Ok(())
}

#[test]
fn favourites_survive_a_store_reopen() -> TestResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("favourites.json");

    let mut store = FileStore::open(&path)?;
    let mut favourites = FavouriteSet::load(&store)?;
    assert!(favourites.toggle("id-1", &mut store)?);
    assert!(favourites.toggle("id-2", &mut store)?);

    let reopened = FileStore::open(&path)?;
    let raw = reopened.get(FAVOURITES_KEY)?.expect("persisted key");
    assert_eq!(raw, r#"{"list":["id-1","id-2"]}"#);

    let restored = FavouriteSet::load(&reopened)?;
    assert!(restored.contains("id-1"));
    assert!(restored.contains("id-2"));
    Ok(())
}

#[test]
fn toggling_twice_restores_the_original_set() -> TestResult<()> {
    let mut store = MemoryStore::default();
    let mut favourites = FavouriteSet::load(&store)?;

    assert!(favourites.toggle("id-9", &mut store)?);
    assert!(favourites.contains("id-9"));

    assert!(!favourites.toggle("id-9", &mut store)?);
    assert!(!favourites.contains("id-9"));
    assert_eq!(store.get(FAVOURITES_KEY)?.as_deref(), Some(r#"{"list":[]}"#));
    Ok(())
}
