//! tickerfeed — a terminal browser for categorized stock-market news.
//!
//! The library side holds everything the binary and the integration tests
//! share: the transport client, the item normalizer, the per-category cache,
//! the debounced search engine, and the view controller.

pub mod api;
pub mod app;
pub mod config;
pub mod news;
pub mod search;
pub mod ui;
pub mod util;
