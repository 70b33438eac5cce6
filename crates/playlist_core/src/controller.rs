use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::client::PlaylistClient;
use crate::errors::StoreError;
use crate::models::{ListItem, ResultPage};
use crate::storage::{FavouriteSet, KeyValueStore};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Typing pause before a title-filter change is applied to the view.
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(500);

/// Views interested in controller state. Notified synchronously after each
/// transition; all methods default to no-ops so a view implements only what
/// it renders.
pub trait ListObserver: Send + Sync {
    fn busy_changed(&self, _busy: bool) {}
    fn view_changed(&self, _items: &[ListItem]) {}
    fn favourites_changed(&self, _ids: &[String]) {}
    fn scroll_reset(&self) {}
}

/// Current query settings. `page_size` changes restart pagination;
/// `filter_title` and `only_favourites` only change the derived view.
#[derive(Debug, Clone)]
pub struct QueryState {
    pub filter_title: Option<String>,
    pub page_size: u32,
    pub only_favourites: bool,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            filter_title: None,
            page_size: DEFAULT_PAGE_SIZE,
            only_favourites: false,
        }
    }
}

/// Holds the latest submitted filter value until its debounce window has
/// elapsed. Driven by the caller's clock so tests stay deterministic.
#[derive(Debug)]
struct FilterDebouncer {
    pending: Option<Option<String>>,
    since: Instant,
    window: Duration,
}

impl FilterDebouncer {
    fn new(window: Duration) -> Self {
        Self {
            pending: None,
            since: Instant::now(),
            window,
        }
    }

    fn submit(&mut self, value: Option<String>, now: Instant) {
        self.pending = Some(value);
        self.since = now;
    }

    fn poll(&mut self, now: Instant) -> Option<Option<String>> {
        if self.pending.is_some() && now.duration_since(self.since) >= self.window {
            self.pending.take()
        } else {
            None
        }
    }

    fn clear(&mut self) {
        self.pending = None;
    }
}

/// Owns paginated result accumulation, favourite-state merge, scroll
/// triggered pagination and the derived (filtered) view.
pub struct ListController {
    client: PlaylistClient,
    store: Box<dyn KeyValueStore + Send>,
    favourites: FavouriteSet,
    query: QueryState,
    accumulated: Vec<ListItem>,
    next_page_token: Option<String>,
    total_results: u64,
    busy: bool,
    cancelled: bool,
    debouncer: FilterDebouncer,
    observers: Vec<Arc<dyn ListObserver>>,
}

impl ListController {
    /// Restores the favourite set from `store`; an empty store is a normal
    /// first run, a corrupt one is an error.
    pub fn new(
        client: PlaylistClient,
        store: Box<dyn KeyValueStore + Send>,
    ) -> Result<Self, StoreError> {
        let favourites = FavouriteSet::load(store.as_ref())?;
        Ok(Self {
            client,
            store,
            favourites,
            query: QueryState::default(),
            accumulated: Vec::new(),
            next_page_token: None,
            total_results: 0,
            busy: false,
            cancelled: false,
            debouncer: FilterDebouncer::new(FILTER_DEBOUNCE),
            observers: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, observer: Arc<dyn ListObserver>) {
        self.observers.push(observer);
    }

    /// Issues the initial first-page fetch.
    pub async fn start(&mut self) {
        self.fetch(None).await;
    }

    /// Full restart: accumulated results are dropped and pagination begins
    /// again from the first page at the new size.
    pub async fn set_page_size(&mut self, page_size: u32) {
        if page_size == 0 || page_size == self.query.page_size {
            return;
        }
        self.query.page_size = page_size;
        self.accumulated.clear();
        self.next_page_token = None;
        self.total_results = 0;
        self.notify_view();
        self.fetch(None).await;
    }

    /// Scroll notification from the rendering layer. `scrolled_index` is the
    /// index of the last visible row, `viewport_rows` how many rows the
    /// window shows. Fetches the next page when the window is within one
    /// viewport of the end, no title filter is active, more results exist
    /// upstream and no fetch is already in flight.
    pub async fn on_scroll(&mut self, scrolled_index: usize, viewport_rows: usize) {
        let near_end = self.accumulated.len() <= scrolled_index + viewport_rows;
        if !near_end
            || self.query.filter_title.is_some()
            || self.accumulated.len() as u64 >= self.total_results
            || self.busy
        {
            return;
        }
        let token = self.next_page_token.clone();
        self.fetch(token.as_deref()).await;
    }

    /// Records a filter change; the view recomputes once `poll_filter` sees
    /// the debounce window elapse. Never triggers a fetch. Blank input
    /// clears the filter.
    pub fn set_filter_title(&mut self, filter: Option<String>, now: Instant) {
        let filter = filter.filter(|f| !f.trim().is_empty());
        self.debouncer.submit(filter, now);
    }

    /// Applies a pending filter whose debounce window has elapsed. Returns
    /// true if the view changed.
    pub fn poll_filter(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(filter) => {
                self.query.filter_title = filter;
                self.notify_view();
                true
            }
            None => false,
        }
    }

    /// Switches the view between all accumulated items and favourites only.
    /// The two filter modes are mutually exclusive: entering either mode
    /// drops any pending or active title filter.
    pub fn set_only_favourites(&mut self, only: bool) {
        self.query.filter_title = None;
        self.debouncer.clear();
        self.query.only_favourites = only;
        self.notify_view();
    }

    /// Flips favourite membership for `id`, persists the set synchronously
    /// and updates the matching accumulated item in place.
    pub fn toggle_favourite(&mut self, id: &str) -> Result<(), StoreError> {
        let now_favourite = self.favourites.toggle(id, self.store.as_mut())?;
        if let Some(item) = self.accumulated.iter_mut().find(|item| item.id == id) {
            item.is_favourite = now_favourite;
        }
        for observer in &self.observers {
            observer.favourites_changed(self.favourites.ids());
        }
        self.notify_view();
        Ok(())
    }

    /// Tears the controller down: any fetch settling after this point is
    /// discarded without touching state or notifying observers.
    pub fn shutdown(&mut self) {
        self.cancelled = true;
    }

    /// The derived item stream the rendering layer consumes.
    pub fn view(&self) -> Vec<ListItem> {
        if self.query.only_favourites {
            self.accumulated
                .iter()
                .filter(|item| self.favourites.contains(&item.id))
                .cloned()
                .collect()
        } else if let Some(filter) = &self.query.filter_title {
            let needle = filter.to_lowercase();
            self.accumulated
                .iter()
                .filter(|item| item.title.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        } else {
            self.accumulated.clone()
        }
    }

    pub fn accumulated(&self) -> &[ListItem] {
        &self.accumulated
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn favourite_ids(&self) -> &[String] {
        self.favourites.ids()
    }

    pub fn total_results(&self) -> u64 {
        self.total_results
    }

    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    async fn fetch(&mut self, page_token: Option<&str>) {
        if self.cancelled {
            return;
        }
        self.set_busy(true);
        let result = self
            .client
            .fetch_page(self.query.page_size, page_token)
            .await;
        if self.cancelled {
            // Settled after teardown, drop the result.
            return;
        }
        self.set_busy(false);
        match result {
            Ok(page) => self.merge_page(page, page_token.is_some()),
            Err(err) => {
                // The view simply does not advance; accumulated results stay
                // as they are.
                warn!(error = %err, "page fetch failed, keeping current results");
            }
        }
    }

    fn merge_page(&mut self, page: ResultPage, continuation: bool) {
        self.next_page_token = page.next_page_token;
        self.total_results = page.total_results;

        let favourites = &self.favourites;
        let fresh: Vec<ListItem> = page
            .items
            .into_iter()
            .map(|raw| {
                let is_favourite = favourites.contains(&raw.id);
                raw.into_list_item(is_favourite)
            })
            .collect();

        if continuation {
            self.accumulated.extend(fresh);
        } else {
            self.accumulated = fresh;
        }
        debug!(
            accumulated = self.accumulated.len(),
            total = self.total_results,
            continuation,
            "page merged"
        );

        self.notify_view();
        if !continuation {
            for observer in &self.observers {
                observer.scroll_reset();
            }
        }
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        for observer in &self.observers {
            observer.busy_changed(busy);
        }
    }

    fn notify_view(&self) {
        let view = self.view();
        for observer in &self.observers {
            observer.view_changed(&view);
        }
    }
}
