//! Debounced, race-guarded company search suggestions.
//!
//! Keystrokes re-arm a trailing-edge debounce deadline; when the query has
//! settled, [`SuggestEngine::poll`] emits at most one request tagged with a
//! freshly incremented generation. Responses for any other generation are
//! discarded — without that guard, a slow response for an earlier keystroke
//! can clobber a faster response for a later one.

use std::time::Duration;
use tokio::time::Instant;

use crate::api::{ApiClient, TransportError};

/// Quiet period a query must hold before a suggestion request fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(260);

/// A suggestion request due for dispatch, tagged for staleness checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestRequest {
    pub query: String,
    pub generation: u64,
}

/// Suggestion engine state machine.
///
/// Owned by the view controller; `poll` is driven from the periodic UI tick
/// so debounce expiry needs no dedicated timer task.
pub struct SuggestEngine {
    query: String,
    suggestions: Vec<String>,
    /// Sequence number of the most recently issued request. Bumped on every
    /// dispatch and on clear, so late responses can be recognized as stale.
    generation: u64,
    /// Trailing-edge debounce deadline; re-armed on every keystroke.
    deadline: Option<Instant>,
    /// A request has been dispatched and no response applied yet.
    pending: bool,
    debounce: Duration,
}

impl SuggestEngine {
    pub fn new(debounce: Duration) -> Self {
        Self {
            query: String::new(),
            suggestions: Vec::new(),
            generation: 0,
            deadline: None,
            pending: false,
            debounce,
        }
    }

    /// Record the current query text after a keystroke.
    ///
    /// A non-empty query (re-)arms the debounce deadline, cancelling any
    /// earlier pending fire. Clearing the text resets the whole session.
    pub fn on_input(&mut self, query: &str) {
        if query.trim().is_empty() {
            self.query = query.to_string();
            self.reset_session();
            return;
        }
        self.query = query.to_string();
        self.deadline = Some(Instant::now() + self.debounce);
    }

    /// Fire the debounced request if the quiet period has elapsed.
    ///
    /// Returns at most one [`SuggestRequest`] per settled query. The caller
    /// dispatches it and later hands the tagged response to [`apply`].
    ///
    /// [`apply`]: SuggestEngine::apply
    pub fn poll(&mut self, now: Instant) -> Option<SuggestRequest> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;

        let query = self.query.trim();
        if query.is_empty() {
            return None;
        }

        self.generation = self.generation.wrapping_add(1);
        self.pending = true;
        tracing::debug!(query, generation = self.generation, "Dispatching suggestion request");
        Some(SuggestRequest {
            query: query.to_string(),
            generation: self.generation,
        })
    }

    /// Apply a completed suggestion response.
    ///
    /// Responses whose generation is not the latest issued are discarded and
    /// `false` is returned. A transport failure counts as a completed request
    /// with zero suggestions — search failures are silent to the user.
    pub fn apply(
        &mut self,
        generation: u64,
        result: Result<Vec<String>, TransportError>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                latest = self.generation,
                "Discarding stale suggestion response"
            );
            return false;
        }
        self.pending = false;
        self.suggestions = match result {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!(error = %e, "Suggestion fetch failed");
                Vec::new()
            }
        };
        true
    }

    /// Destroy the search session: clear query and suggestions, cancel the
    /// pending deadline, and invalidate any in-flight request.
    pub fn clear(&mut self) {
        self.query.clear();
        self.reset_session();
    }

    fn reset_session(&mut self) {
        self.suggestions.clear();
        self.deadline = None;
        self.pending = false;
        // In-flight responses now carry a stale generation
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// True while a dispatched request has not yet been answered or
    /// invalidated.
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

impl Default for SuggestEngine {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Query the company search endpoint, returning matches in service order.
pub async fn search_companies(
    client: &ApiClient,
    query: &str,
) -> Result<Vec<String>, TransportError> {
    let payload = client.fetch_json("/companies/search", &[("q", query)]).await?;
    match payload.as_array() {
        Some(values) => Ok(values
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect()),
        None => Err(TransportError::MalformedResponse(
            "search payload is not an array",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{self, Duration};

    const DEBOUNCE: Duration = Duration::from_millis(250);

    #[tokio::test(start_paused = true)]
    async fn test_trailing_edge_debounce_fires_once() {
        let mut engine = SuggestEngine::new(DEBOUNCE);

        // Keystrokes at t=0, 50, 100, 150ms
        for (advance_ms, q) in [(0, "R"), (50, "Re"), (50, "Rel"), (50, "Reli")] {
            time::advance(Duration::from_millis(advance_ms)).await;
            engine.on_input(q);
            assert!(engine.poll(Instant::now()).is_none());
        }

        // Just before the deadline (t=399ms): still quiet
        time::advance(Duration::from_millis(249)).await;
        assert!(engine.poll(Instant::now()).is_none());

        // t=400ms: exactly one request, for the final query value
        time::advance(Duration::from_millis(1)).await;
        let req = engine.poll(Instant::now()).expect("debounce should fire");
        assert_eq!(req.query, "Reli");

        // No re-fire on subsequent polls
        time::advance(Duration::from_secs(1)).await;
        assert!(engine.poll(Instant::now()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_guard() {
        let mut engine = SuggestEngine::new(DEBOUNCE);

        engine.on_input("Re");
        time::advance(DEBOUNCE).await;
        let first = engine.poll(Instant::now()).unwrap();

        engine.on_input("Rel");
        time::advance(DEBOUNCE).await;
        let second = engine.poll(Instant::now()).unwrap();
        assert!(second.generation > first.generation);

        // Request #2 resolves first
        assert!(engine.apply(second.generation, Ok(vec!["Reliance Industries Limited".into()])));
        // Request #1 arrives late and must be discarded
        assert!(!engine.apply(first.generation, Ok(vec!["Rexpo".into()])));

        assert_eq!(engine.suggestions(), ["Reliance Industries Limited"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_timer_and_invalidates_inflight() {
        let mut engine = SuggestEngine::new(DEBOUNCE);

        engine.on_input("Rel");
        time::advance(DEBOUNCE).await;
        let req = engine.poll(Instant::now()).unwrap();
        assert!(engine.is_pending());

        engine.clear();
        assert!(!engine.is_pending());
        assert!(engine.query().is_empty());

        // The in-flight response is now stale
        assert!(!engine.apply(req.generation, Ok(vec!["Reliance".into()])));
        assert!(engine.suggestions().is_empty());

        // And no timer remains armed
        time::advance(Duration::from_secs(1)).await;
        assert!(engine.poll(Instant::now()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_keystroke_resets_to_idle() {
        let mut engine = SuggestEngine::new(DEBOUNCE);

        engine.on_input("Rel");
        engine.on_input("");

        time::advance(Duration::from_secs(1)).await;
        assert!(engine.poll(Instant::now()).is_none());
        assert!(engine.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_whitespace_query_never_fires() {
        let mut engine = SuggestEngine::new(DEBOUNCE);
        engine.on_input("   ");
        time::advance(Duration::from_secs(1)).await;
        assert!(engine.poll(Instant::now()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_is_silent_empty_result() {
        let mut engine = SuggestEngine::new(DEBOUNCE);

        engine.on_input("Rel");
        time::advance(DEBOUNCE).await;
        let req = engine.poll(Instant::now()).unwrap();

        assert!(engine.apply(req.generation, Err(TransportError::Timeout)));
        assert!(engine.suggestions().is_empty());
        assert!(!engine.is_pending());
    }

    #[tokio::test]
    async fn test_search_companies_parses_string_array() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/companies/search"))
            .and(query_param("q", "Rel"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"["Reliance Industries Limited","Relaxo Footwears"]"#,
            ))
            .mount(&mock_server)
            .await;

        let client = crate::api::ApiClient::new(reqwest::Client::new(), &mock_server.uri());
        let matches = search_companies(&client, "Rel").await.unwrap();
        assert_eq!(
            matches,
            ["Reliance Industries Limited", "Relaxo Footwears"]
        );
    }
}
