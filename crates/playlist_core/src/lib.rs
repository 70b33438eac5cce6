pub mod client;
pub mod controller;
pub mod errors;
pub mod models;
pub mod storage;

pub use client::{ClientOptions, PlaylistClient, DEFAULT_PLAYLIST_ID, LIST_ENDPOINT};
pub use controller::{
    ListController, ListObserver, QueryState, DEFAULT_PAGE_SIZE, FILTER_DEBOUNCE,
};
pub use errors::{FetchError, StoreError};
pub use models::{ListItem, PageInfo, PlaylistItemsResponse, RawItem, ResultPage, Snippet};
pub use storage::{FavouriteSet, FileStore, KeyValueStore, MemoryStore, FAVOURITES_KEY};
