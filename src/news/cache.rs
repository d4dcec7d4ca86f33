//! Session-lifetime cache of normalized news lists, keyed by category.
//!
//! The cache is strictly cache-first: once a key has an entry — even a
//! zero-item entry — browsing back to that tab never touches the network
//! until the user forces a refresh. At most one fetch per key is ever in
//! flight; concurrent requesters for the same key attach to the pending
//! fetch instead of issuing a duplicate call.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

use crate::api::{ApiClient, TransportError};
use crate::news::item::{normalize, NewsItem};

/// Fixed set of browsable news categories ("tabs").
///
/// The set itself is configuration-shaped (tabs come from config labels via
/// [`CategoryKey::from_label`]), but each key maps deterministically to one
/// service endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKey {
    All,
    Results,
    Penny,
    LargeCap,
    MidCap,
    SmallCap,
    Fmcg,
    It,
    Banking,
    Auto,
    Energy,
    Psu,
    Telecom,
}

impl CategoryKey {
    /// Service endpoint path for this category.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            CategoryKey::All => "/news/all",
            CategoryKey::Results => "/news/results",
            CategoryKey::Penny => "/news/sector/penny",
            CategoryKey::LargeCap => "/news/sector/largecap",
            CategoryKey::MidCap => "/news/sector/midcap",
            CategoryKey::SmallCap => "/news/sector/smallcap",
            CategoryKey::Fmcg => "/news/sector/fmcg",
            CategoryKey::It => "/news/sector/it",
            CategoryKey::Banking => "/news/sector/banking",
            CategoryKey::Auto => "/news/sector/auto",
            CategoryKey::Energy => "/news/sector/energy",
            CategoryKey::Psu => "/news/sector/psu",
            CategoryKey::Telecom => "/news/sector/telecom",
        }
    }

    /// Tab label shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            CategoryKey::All => "ALL",
            CategoryKey::Results => "RESULTS",
            CategoryKey::Penny => "PENNY",
            CategoryKey::LargeCap => "LARGE CAP",
            CategoryKey::MidCap => "MIDCAP",
            CategoryKey::SmallCap => "SMALLCAP",
            CategoryKey::Fmcg => "FMCG",
            CategoryKey::It => "IT",
            CategoryKey::Banking => "BANKING",
            CategoryKey::Auto => "AUTO",
            CategoryKey::Energy => "ENERGY",
            CategoryKey::Psu => "PSU",
            CategoryKey::Telecom => "TELECOM",
        }
    }

    /// Resolve a configured tab label. Unrecognized labels fall back to the
    /// generic [`CategoryKey::All`] endpoint.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().replace(' ', "") {
            s if s == "RESULTS" => CategoryKey::Results,
            s if s == "PENNY" => CategoryKey::Penny,
            s if s == "LARGECAP" => CategoryKey::LargeCap,
            s if s == "MIDCAP" => CategoryKey::MidCap,
            s if s == "SMALLCAP" => CategoryKey::SmallCap,
            s if s == "FMCG" => CategoryKey::Fmcg,
            s if s == "IT" => CategoryKey::It,
            s if s == "BANKING" => CategoryKey::Banking,
            s if s == "AUTO" => CategoryKey::Auto,
            s if s == "ENERGY" => CategoryKey::Energy,
            s if s == "PSU" => CategoryKey::Psu,
            s if s == "TELECOM" => CategoryKey::Telecom,
            _ => CategoryKey::All,
        }
    }
}

/// One cached fetch result for a category.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub items: Arc<Vec<NewsItem>>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(items: Vec<NewsItem>) -> Self {
        Self {
            items: Arc::new(items),
            fetched_at: Utc::now(),
        }
    }
}

/// Observable cache state for a key, as seen by the view layer.
#[derive(Debug, Clone)]
pub enum CacheState {
    /// No fetch has been requested for this key yet.
    Empty,
    /// A fetch is in flight; results will arrive via the requester.
    Loading,
    /// An entry exists (possibly with zero items).
    Ready(Arc<Vec<NewsItem>>),
}

/// Per-category news cache. Entries live for the application session and
/// are only replaced by an explicit refresh.
#[derive(Default)]
pub struct CategoryCache {
    slots: Mutex<HashMap<CategoryKey, Arc<OnceCell<CacheEntry>>>>,
}

impl CategoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached items for `key`, fetching once if no entry exists.
    ///
    /// A transport or shape failure is converted into an empty entry at this
    /// boundary (logged, never propagated): the UI shows "no news" instead
    /// of re-fetching on every render. Concurrent callers for the same key
    /// share the single in-flight fetch.
    pub async fn get_or_fetch(&self, client: &ApiClient, key: CategoryKey) -> Arc<Vec<NewsItem>> {
        let cell = self.slot(key);
        let entry = cell
            .get_or_init(|| async {
                match fetch_category(client, key).await {
                    Ok(items) => {
                        tracing::debug!(category = key.label(), count = items.len(), "Category fetched");
                        CacheEntry::new(items)
                    }
                    Err(e) => {
                        // Cached as empty: a transient failure reads as "no
                        // news" until the user forces a refresh.
                        tracing::warn!(category = key.label(), error = %e, "Category fetch failed, caching empty entry");
                        CacheEntry::new(Vec::new())
                    }
                }
            })
            .await;
        Arc::clone(&entry.items)
    }

    /// Fetch `key` unconditionally, bypassing any cached entry.
    ///
    /// On success the entry is overwritten; on failure the previous entry is
    /// left untouched — stale-but-available beats blanking the tab on a
    /// failed manual refresh.
    pub async fn force_refresh(&self, client: &ApiClient, key: CategoryKey) -> Arc<Vec<NewsItem>> {
        match fetch_category(client, key).await {
            Ok(items) => {
                let entry = CacheEntry::new(items);
                let items = Arc::clone(&entry.items);
                let mut slots = self.slots.lock().expect("cache mutex poisoned");
                slots.insert(key, Arc::new(OnceCell::new_with(Some(entry))));
                tracing::debug!(category = key.label(), count = items.len(), "Category refreshed");
                items
            }
            Err(e) => {
                tracing::warn!(category = key.label(), error = %e, "Refresh failed, keeping previous entry");
                self.cached_items(key).unwrap_or_default()
            }
        }
    }

    /// Current state of `key` without triggering any fetch.
    pub fn state(&self, key: CategoryKey) -> CacheState {
        let slots = self.slots.lock().expect("cache mutex poisoned");
        match slots.get(&key) {
            None => CacheState::Empty,
            Some(cell) => match cell.get() {
                Some(entry) => CacheState::Ready(Arc::clone(&entry.items)),
                None => CacheState::Loading,
            },
        }
    }

    /// Cached items for `key`, if an entry exists.
    pub fn cached_items(&self, key: CategoryKey) -> Option<Arc<Vec<NewsItem>>> {
        let slots = self.slots.lock().expect("cache mutex poisoned");
        slots
            .get(&key)
            .and_then(|cell| cell.get())
            .map(|entry| Arc::clone(&entry.items))
    }

    /// When the entry for `key` was fetched, if one exists.
    pub fn fetched_at(&self, key: CategoryKey) -> Option<DateTime<Utc>> {
        let slots = self.slots.lock().expect("cache mutex poisoned");
        slots
            .get(&key)
            .and_then(|cell| cell.get())
            .map(|entry| entry.fetched_at)
    }

    fn slot(&self, key: CategoryKey) -> Arc<OnceCell<CacheEntry>> {
        let mut slots = self.slots.lock().expect("cache mutex poisoned");
        Arc::clone(slots.entry(key).or_default())
    }
}

/// Fetch and normalize the news list for one category.
async fn fetch_category(
    client: &ApiClient,
    key: CategoryKey,
) -> Result<Vec<NewsItem>, TransportError> {
    let payload = client.fetch_json(key.endpoint_path(), &[]).await?;
    let raw = extract_news(&payload)?;
    Ok(raw.iter().map(normalize).collect())
}

/// Pull the `news` array out of a list-bearing response.
///
/// An absent array is an empty list, never an error; a present value of the
/// wrong type is a malformed response.
pub(crate) fn extract_news(payload: &Value) -> Result<Vec<Value>, TransportError> {
    match &payload["news"] {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.clone()),
        _ => Err(TransportError::MalformedResponse(
            "`news` field is not an array",
        )),
    }
}
