//! One-shot company news resolution.
//!
//! Company lookups are low-frequency and freshness-sensitive, so they bypass
//! the category cache entirely: every selection fetches.

use crate::api::ApiClient;
use crate::news::cache::extract_news;
use crate::news::item::{normalize, NewsItem};

/// Fetch and normalize the full news list for one company, in source order.
///
/// Never fails: a transport or shape error yields an empty list and a log
/// line. The UI shows the same "no news" state either way.
pub async fn fetch_company_news(client: &ApiClient, name: &str) -> Vec<NewsItem> {
    let path = format!("/news/company/{}", urlencoding::encode(name));
    let raw = match client.fetch_json(&path, &[]).await {
        Ok(payload) => match extract_news(&payload) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(company = name, error = %e, "Malformed company news payload");
                return Vec::new();
            }
        },
        Err(e) => {
            tracing::warn!(company = name, error = %e, "Company news fetch failed");
            return Vec::new();
        }
    };
    raw.iter().map(normalize).collect()
}
