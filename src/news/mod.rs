//! News acquisition: normalization, category caching, and company lookup.

pub mod cache;
pub mod company;
pub mod item;

pub use cache::{CacheEntry, CacheState, CategoryCache, CategoryKey};
pub use company::fetch_company_news;
pub use item::{normalize, time_ago, NewsItem, Sentiment};
