//! Normalization of raw news records into a stable display model.
//!
//! The remote service aggregates items from heterogeneous sources, so field
//! presence and naming vary per item (`summary` vs `description`, `pubDate`
//! vs `published_at`, free-text sentiment labels). [`normalize`] is the
//! single boundary that resolves all of that into a [`NewsItem`]; nothing
//! downstream branches on raw-field presence.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::util::{excerpt_words, truncate_chars};

/// Character budget for the long-form content excerpt.
const CONTENT_EXCERPT_CHARS: usize = 280;

/// Word budget for the title-derived description fallback.
const TITLE_EXCERPT_WORDS: usize = 28;

/// Tokens whose presence in a lowered sentiment label marks it positive.
/// Checked before the negative lexicon; first match wins.
const POSITIVE_LEXICON: &[&str] = &["good", "positive", "bull", "up", "buy", "green"];

/// Tokens whose presence in a lowered sentiment label marks it negative.
const NEGATIVE_LEXICON: &[&str] = &["bad", "negative", "bear", "down", "sell", "red"];

/// Display sentiment class, resolved from free-text source labels.
///
/// Always one of these three values — the raw source string never leaks
/// past the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Good,
    Bad,
    Neutral,
}

impl Sentiment {
    /// Resolve a raw sentiment/tag label by substring containment against
    /// the fixed lexicons. Absent or unmatched input is neutral.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Sentiment::Neutral;
        };
        let lowered = raw.to_lowercase();
        if POSITIVE_LEXICON.iter().any(|t| lowered.contains(t)) {
            Sentiment::Good
        } else if NEGATIVE_LEXICON.iter().any(|t| lowered.contains(t)) {
            Sentiment::Bad
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Good => "good",
            Sentiment::Bad => "bad",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A display-ready news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub company: Option<String>,
    /// Resolved sector label; never empty (defaults to "GENERAL").
    pub sector: String,
    pub sentiment: Sentiment,
    /// Resolved description; may be empty when no source field had text.
    pub description: String,
    /// Raw publication timestamp as received (ISO-8601 when the source
    /// provides one); display formatting happens via [`NewsItem::time_ago`].
    pub published_at: Option<String>,
    pub link: Option<String>,
    /// Headline figures (revenue, eps, dividend, ...) for display only.
    pub facts: BTreeMap<String, String>,
}

impl NewsItem {
    /// Relative-time label for the publication timestamp, given a fixed
    /// `now`. Empty when the item has no timestamp.
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        match &self.published_at {
            Some(raw) => time_ago(raw, now),
            None => String::new(),
        }
    }
}

/// Normalize one raw record into a [`NewsItem`].
///
/// Pure: any JSON value maps to some item. Missing `title` yields an empty
/// title rather than an error — filtering is a caller policy.
pub fn normalize(raw: &Value) -> NewsItem {
    let title = raw["title"].as_str().unwrap_or("").to_string();

    let sentiment = Sentiment::from_raw(
        raw["sentiment"]
            .as_str()
            .or_else(|| raw["tag"].as_str())
            .filter(|s| !s.trim().is_empty()),
    );

    NewsItem {
        company: non_empty(raw["company"].as_str()),
        sector: resolve_sector(raw),
        sentiment,
        description: resolve_description(raw, &title),
        published_at: non_empty(raw["pubDate"].as_str().or_else(|| raw["published_at"].as_str())),
        link: non_empty(raw["link"].as_str().or_else(|| raw["url"].as_str())),
        facts: resolve_facts(raw),
        title,
    }
}

/// Relative-time label: `{n}s ago`, `{n}m ago`, `{n}h ago`, `{n}d ago`.
///
/// An unparseable timestamp is passed through unchanged as the label, so
/// sources that send pre-formatted dates still display something sensible.
pub fn time_ago(raw: &str, now: DateTime<Utc>) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(raw) else {
        return raw.to_string();
    };
    let elapsed = (now - parsed.with_timezone(&Utc)).num_seconds().max(0);
    if elapsed < 60 {
        format!("{}s ago", elapsed)
    } else if elapsed < 3600 {
        format!("{}m ago", elapsed / 60)
    } else if elapsed < 86400 {
        format!("{}h ago", elapsed / 3600)
    } else {
        format!("{}d ago", elapsed / 86400)
    }
}

/// Description resolution, first non-empty wins: explicit summary, explicit
/// description, a 280-char slice of the long-form content, a title excerpt.
fn resolve_description(raw: &Value, title: &str) -> String {
    if let Some(summary) = non_empty(raw["summary"].as_str()) {
        return summary;
    }
    if let Some(description) = non_empty(raw["description"].as_str()) {
        return description;
    }
    if let Some(content) = non_empty(raw["content"].as_str().or_else(|| raw["raw_text"].as_str())) {
        return truncate_chars(&content, CONTENT_EXCERPT_CHARS).into_owned();
    }
    excerpt_words(title, TITLE_EXCERPT_WORDS)
}

/// Sector resolution, first present wins: sector, category, tags[0].
fn resolve_sector(raw: &Value) -> String {
    non_empty(raw["sector"].as_str())
        .or_else(|| non_empty(raw["category"].as_str()))
        .or_else(|| non_empty(raw["tags"][0].as_str()))
        .unwrap_or_else(|| "GENERAL".to_string())
}

/// Collect the optional `facts` object, coercing scalar values to strings.
/// Nested arrays/objects are skipped — facts are flat display figures.
fn resolve_facts(raw: &Value) -> BTreeMap<String, String> {
    let mut facts = BTreeMap::new();
    if let Some(map) = raw["facts"].as_object() {
        for (name, value) in map {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            facts.insert(name.clone(), rendered);
        }
    }
    facts
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_sentiment_positive_tokens() {
        for label in ["good", "Positive Q3", "BULLISH", "upbeat", "buy call", "green day"] {
            assert_eq!(
                Sentiment::from_raw(Some(label)),
                Sentiment::Good,
                "label {label:?}"
            );
        }
    }

    #[test]
    fn test_sentiment_negative_tokens() {
        for label in ["bad quarter", "Negative", "bearish", "downgrade", "sell-off", "red flag"] {
            assert_eq!(
                Sentiment::from_raw(Some(label)),
                Sentiment::Bad,
                "label {label:?}"
            );
        }
    }

    #[test]
    fn test_sentiment_positive_lexicon_wins_over_negative() {
        // Contains both "bull" and "sell"; positive lexicon is checked first
        assert_eq!(
            Sentiment::from_raw(Some("bulls selling into strength")),
            Sentiment::Good
        );
    }

    #[test]
    fn test_sentiment_absent_or_unmatched_is_neutral() {
        assert_eq!(Sentiment::from_raw(None), Sentiment::Neutral);
        assert_eq!(Sentiment::from_raw(Some("")), Sentiment::Neutral);
        assert_eq!(Sentiment::from_raw(Some("mixed outlook")), Sentiment::Neutral);
    }

    #[test]
    fn test_description_summary_beats_description() {
        let item = normalize(&json!({"title": "T", "summary": "S", "description": "D"}));
        assert_eq!(item.description, "S");
    }

    #[test]
    fn test_description_falls_back_to_description_field() {
        let item = normalize(&json!({"title": "T", "summary": "  ", "description": "D"}));
        assert_eq!(item.description, "D");
    }

    #[test]
    fn test_description_content_excerpt_is_280_chars() {
        let long = "x".repeat(500);
        let item = normalize(&json!({"title": "T", "content": long}));
        assert_eq!(item.description.chars().count(), 280);
    }

    #[test]
    fn test_description_raw_text_counts_as_content() {
        let item = normalize(&json!({"title": "T", "raw_text": "body text"}));
        assert_eq!(item.description, "body text");
    }

    #[test]
    fn test_description_title_excerpt_fallback() {
        let title: String = (0..40).map(|i| format!("w{} ", i)).collect();
        let item = normalize(&json!({ "title": title }));
        assert_eq!(item.description.split_whitespace().count(), 28);
        assert!(item.description.ends_with("..."));
    }

    #[test]
    fn test_description_empty_when_nothing_available() {
        let item = normalize(&json!({"title": ""}));
        assert_eq!(item.description, "");
    }

    #[test]
    fn test_sector_priority_chain() {
        let item = normalize(&json!({"title": "T", "sector": "IT", "category": "AUTO"}));
        assert_eq!(item.sector, "IT");

        let item = normalize(&json!({"title": "T", "category": "AUTO"}));
        assert_eq!(item.sector, "AUTO");

        let item = normalize(&json!({"title": "T", "tags": ["BANKING", "PSU"]}));
        assert_eq!(item.sector, "BANKING");

        let item = normalize(&json!({"title": "T"}));
        assert_eq!(item.sector, "GENERAL");
    }

    #[test]
    fn test_facts_coerce_scalars() {
        let item = normalize(&json!({
            "title": "T",
            "facts": {"revenue": "12.3 Cr", "eps": 4.2, "dividend": true, "nested": {"x": 1}}
        }));
        assert_eq!(item.facts.get("revenue").map(String::as_str), Some("12.3 Cr"));
        assert_eq!(item.facts.get("eps").map(String::as_str), Some("4.2"));
        assert_eq!(item.facts.get("dividend").map(String::as_str), Some("true"));
        assert!(!item.facts.contains_key("nested"));
    }

    #[test]
    fn test_link_and_published_at_aliases() {
        let item = normalize(&json!({"title": "T", "url": "https://x.test/a", "published_at": "2024-01-01T00:00:00Z"}));
        assert_eq!(item.link.as_deref(), Some("https://x.test/a"));
        assert_eq!(item.published_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_time_ago_thresholds() {
        let now = DateTime::parse_from_rfc3339("2024-01-02T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(time_ago("2024-01-01T23:59:30Z", now), "30s ago");
        assert_eq!(time_ago("2024-01-01T23:30:00Z", now), "30m ago");
        assert_eq!(time_ago("2024-01-01T19:00:00Z", now), "5h ago");
        assert_eq!(time_ago("2023-12-30T00:00:00Z", now), "3d ago");
    }

    #[test]
    fn test_time_ago_unparseable_passes_through() {
        let now = Utc::now();
        assert_eq!(time_ago("yesterday evening", now), "yesterday evening");
    }

    #[test]
    fn test_time_ago_absent_is_empty_label() {
        let item = normalize(&json!({"title": "T"}));
        assert_eq!(item.time_ago(Utc::now()), "");
    }

    #[test]
    fn test_time_ago_future_timestamp_clamps_to_zero() {
        let now = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(time_ago("2024-06-01T00:00:00Z", now), "0s ago");
    }

    #[test]
    fn test_normalize_results_item() {
        let item = normalize(&json!({
            "title": "X Corp reports profit",
            "sentiment": "Positive Q3",
            "pubDate": "2024-01-01T00:00:00Z"
        }));
        assert_eq!(item.sentiment, Sentiment::Good);
        assert_eq!(item.sector, "GENERAL");
        let now = DateTime::parse_from_rfc3339("2024-01-03T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(!item.time_ago(now).is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        // Filler that cannot spell a lexicon token regardless of how it is
        // concatenated around one.
        fn filler() -> impl Strategy<Value = String> {
            proptest::string::string_regex("[0-9 _\\-!?.]{0,12}").unwrap()
        }

        proptest! {
            #[test]
            fn positive_token_without_negative_is_good(
                prefix in filler(),
                token in proptest::sample::select(POSITIVE_LEXICON),
                suffix in filler(),
            ) {
                let label = format!("{prefix}{token}{suffix}");
                prop_assert_eq!(Sentiment::from_raw(Some(label.as_str())), Sentiment::Good);
            }

            #[test]
            fn negative_token_without_positive_is_bad(
                prefix in filler(),
                token in proptest::sample::select(NEGATIVE_LEXICON),
                suffix in filler(),
            ) {
                let label = format!("{prefix}{token}{suffix}");
                prop_assert_eq!(Sentiment::from_raw(Some(label.as_str())), Sentiment::Bad);
            }

            #[test]
            fn lexicon_free_labels_are_neutral(label in "[0-9 _\\-!?.]{0,24}") {
                prop_assert_eq!(Sentiment::from_raw(Some(label.as_str())), Sentiment::Neutral);
            }
        }
    }
}
