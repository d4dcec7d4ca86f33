//! Application state and orchestration.
//!
//! [`App`] decides which source supplies the visible list — the category
//! cache while browsing, the company resolver while a company is focused —
//! and exposes a single `loading` flag for whichever operation is the
//! active one. Background completions are tagged with an operation sequence
//! number: a completion that has been superseded by a newer selection still
//! updates its cache entry (inside the spawned task) but never touches the
//! display.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::api::{ApiClient, TransportError};
use crate::config::Config;
use crate::news::{fetch_company_news, CacheState, CategoryCache, CategoryKey, NewsItem};
use crate::search::{search_companies, SuggestEngine};

/// How long a status line message stays visible.
const STATUS_DURATION: Duration = Duration::from_secs(4);

/// Which source currently supplies the visible news list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// Browsing a category tab; the cache supplies the list.
    Browsing(CategoryKey),
    /// A company is focused; its one-shot resolve supplies the list.
    CompanyFocus(String),
}

/// Completion events from spawned background tasks.
#[derive(Debug)]
pub enum AppEvent {
    /// A category fetch (cached or forced) finished. The cache entry is
    /// already written by the task; this event only drives the display.
    CategoryLoaded {
        key: CategoryKey,
        op: u64,
        items: Arc<Vec<NewsItem>>,
    },
    /// A company news resolve finished.
    CompanyLoaded { op: u64, items: Arc<Vec<NewsItem>> },
    /// A suggestion request finished; `generation` feeds the stale guard.
    SuggestionsLoaded {
        generation: u64,
        result: Result<Vec<String>, TransportError>,
    },
}

pub struct App {
    pub client: Arc<ApiClient>,
    pub cache: Arc<CategoryCache>,
    pub suggest: SuggestEngine,

    /// Category tabs in display order.
    pub tabs: Vec<CategoryKey>,
    pub selected_tab: usize,
    /// Cursor into the visible items list.
    pub selected_item: usize,

    mode: ViewMode,
    /// Category to return to when a company focus is cleared.
    last_category: CategoryKey,

    /// The currently displayed list.
    items: Arc<Vec<NewsItem>>,
    /// True while the active operation is outstanding.
    pub loading: bool,
    /// Identifies the active operation; bumped on every selection so
    /// superseded completions are recognized.
    op_seq: u64,

    /// Whether keystrokes go to the search box.
    pub search_active: bool,
    /// Cursor into the suggestion popup.
    pub selected_suggestion: usize,

    pub needs_redraw: bool,
    status: Option<(String, Instant)>,
}

impl App {
    pub fn new(client: ApiClient, config: &Config) -> Self {
        let tabs = config.categories();
        let first = tabs.first().copied().unwrap_or(CategoryKey::All);
        Self {
            client: Arc::new(client),
            cache: Arc::new(CategoryCache::new()),
            suggest: SuggestEngine::new(Duration::from_millis(config.debounce_ms)),
            tabs,
            selected_tab: 0,
            selected_item: 0,
            mode: ViewMode::Browsing(first),
            last_category: first,
            items: Arc::new(Vec::new()),
            loading: false,
            op_seq: 0,
            search_active: false,
            selected_suggestion: 0,
            needs_redraw: true,
            status: None,
        }
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    /// The currently displayed news list.
    pub fn items(&self) -> &Arc<Vec<NewsItem>> {
        &self.items
    }

    /// Switch to browsing `key`. A cached entry (even an empty one) is shown
    /// immediately without network access; otherwise a fetch is spawned and
    /// the loading flag raised.
    pub fn select_category(&mut self, key: CategoryKey, tx: &mpsc::Sender<AppEvent>) {
        self.mode = ViewMode::Browsing(key);
        self.last_category = key;
        if let Some(idx) = self.tabs.iter().position(|k| *k == key) {
            self.selected_tab = idx;
        }
        self.selected_item = 0;
        let op = self.next_op();

        match self.cache.state(key) {
            CacheState::Ready(items) => {
                self.items = items;
                self.loading = false;
            }
            CacheState::Empty | CacheState::Loading => {
                // An already in-flight fetch is joined, not duplicated:
                // get_or_fetch attaches to the pending entry init.
                self.loading = true;
                let client = Arc::clone(&self.client);
                let cache = Arc::clone(&self.cache);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let items = cache.get_or_fetch(&client, key).await;
                    let _ = tx.send(AppEvent::CategoryLoaded { key, op, items }).await;
                });
            }
        }
    }

    /// Focus a company: resolve its news with a one-shot, uncached fetch.
    /// Destroys the search session.
    pub fn select_company(&mut self, name: String, tx: &mpsc::Sender<AppEvent>) {
        self.suggest.clear();
        self.search_active = false;
        self.selected_suggestion = 0;
        self.selected_item = 0;
        self.mode = ViewMode::CompanyFocus(name.clone());
        self.loading = true;
        let op = self.next_op();

        let client = Arc::clone(&self.client);
        let tx = tx.clone();
        tokio::spawn(async move {
            let items = Arc::new(fetch_company_news(&client, &name).await);
            let _ = tx.send(AppEvent::CompanyLoaded { op, items }).await;
        });
    }

    /// Leave company focus (or an in-progress search) and return to the last
    /// browsed category.
    pub fn clear_search(&mut self, tx: &mpsc::Sender<AppEvent>) {
        self.suggest.clear();
        self.search_active = false;
        self.selected_suggestion = 0;
        if matches!(self.mode, ViewMode::CompanyFocus(_)) {
            self.select_category(self.last_category, tx);
        }
    }

    /// Refresh the active view: force-fetch the current category, or
    /// re-resolve the focused company.
    pub fn refresh(&mut self, tx: &mpsc::Sender<AppEvent>) {
        match self.mode.clone() {
            ViewMode::Browsing(key) => {
                self.loading = true;
                let op = self.next_op();
                let client = Arc::clone(&self.client);
                let cache = Arc::clone(&self.cache);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let items = cache.force_refresh(&client, key).await;
                    let _ = tx.send(AppEvent::CategoryLoaded { key, op, items }).await;
                });
            }
            ViewMode::CompanyFocus(name) => {
                self.loading = true;
                let op = self.next_op();
                let client = Arc::clone(&self.client);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let items = Arc::new(fetch_company_news(&client, &name).await);
                    let _ = tx.send(AppEvent::CompanyLoaded { op, items }).await;
                });
            }
        }
    }

    /// Periodic tick: fire the debounced suggestion request when due.
    pub fn tick(&mut self, now: Instant, tx: &mpsc::Sender<AppEvent>) {
        if let Some(req) = self.suggest.poll(now) {
            let client = Arc::clone(&self.client);
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = search_companies(&client, &req.query).await;
                let _ = tx
                    .send(AppEvent::SuggestionsLoaded {
                        generation: req.generation,
                        result,
                    })
                    .await;
            });
        }
    }

    /// Apply a background completion event.
    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CategoryLoaded { key, op, items } => {
                if op != self.op_seq {
                    // Superseded by a newer selection. The cache entry was
                    // already written inside the task; nothing to display.
                    tracing::debug!(category = key.label(), op, "Stale category completion ignored");
                    return;
                }
                self.items = items;
                self.loading = false;
                self.selected_item = 0;
            }
            AppEvent::CompanyLoaded { op, items } => {
                if op != self.op_seq {
                    tracing::debug!(op, "Stale company completion ignored");
                    return;
                }
                self.items = items;
                self.loading = false;
                self.selected_item = 0;
            }
            AppEvent::SuggestionsLoaded { generation, result } => {
                if self.suggest.apply(generation, result) {
                    self.selected_suggestion = 0;
                }
            }
        }
    }

    fn next_op(&mut self) -> u64 {
        self.op_seq = self.op_seq.wrapping_add(1);
        self.op_seq
    }

    /// Show a transient status line message.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now() + STATUS_DURATION));
        self.needs_redraw = true;
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(msg, _)| msg.as_str())
    }

    /// Drop the status message once expired. Returns true if it was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, expires)) = self.status {
            if Instant::now() >= expires {
                self.status = None;
                return true;
            }
        }
        false
    }
}
