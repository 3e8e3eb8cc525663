//! # Search
//!
//! Full-text search over the catalog and the suggestion box shown while the
//! user types. Suggestion requests may overlap; each one is tagged with a
//! generation number and only the answer to the latest query is kept.

use crate::cancel::{cancelled, sleep_with_cancel, CancellationState};
use crate::client::BackofficeClient;
use crate::events::{ClientEvent, SharedEventBroadcaster};
use crate::types::Reference;
use crate::{BackofficeError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One hit in a search result section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub artist: Option<Reference>,
    #[serde(default)]
    pub image: Option<String>,
}

impl fmt::Display for SearchItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.artist {
            Some(artist) => write!(f, "{} - {}", artist, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Body of `GET search?q=`. Missing sections decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResults {
    pub tracks: Vec<SearchItem>,
    pub artists: Vec<SearchItem>,
    pub albums: Vec<SearchItem>,
    pub playlists: Vec<SearchItem>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
            && self.artists.is_empty()
            && self.albums.is_empty()
            && self.playlists.is_empty()
    }

    /// Sections in display order, with their titles.
    pub fn sections(&self) -> [(&'static str, &[SearchItem]); 4] {
        [
            ("Tracks", self.tracks.as_slice()),
            ("Artists", self.artists.as_slice()),
            ("Albums", self.albums.as_slice()),
            ("Playlists", self.playlists.as_slice()),
        ]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionEntry {
    Text(String),
    Named {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        title: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionsBody {
    List(Vec<SuggestionEntry>),
    Wrapped { suggestions: Vec<SuggestionEntry> },
}

impl SuggestionsBody {
    fn into_strings(self) -> Vec<String> {
        let entries = match self {
            SuggestionsBody::List(entries) => entries,
            SuggestionsBody::Wrapped { suggestions } => suggestions,
        };
        entries
            .into_iter()
            .filter_map(|entry| match entry {
                SuggestionEntry::Text(text) => Some(text),
                SuggestionEntry::Named { name, title } => name.or(title),
            })
            .filter(|s| !s.trim().is_empty())
            .collect()
    }
}

impl BackofficeClient {
    /// Search tracks, artists, albums and playlists.
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let path = format!("search?q={}", urlencoding::encode(query.trim()));
        self.get_json(&path).await
    }

    /// Autocomplete suggestions for a partial query.
    pub async fn search_suggestions(&self, query: &str) -> Result<Vec<String>> {
        let path = format!("search/suggestions?q={}", urlencoding::encode(query.trim()));
        let body: SuggestionsBody = self.get_json(&path).await?;
        Ok(body.into_strings())
    }
}

/// Anything that can answer suggestion queries.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn suggestions(&self, query: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl SuggestionSource for BackofficeClient {
    async fn suggestions(&self, query: &str) -> Result<Vec<String>> {
        self.search_suggestions(query).await
    }
}

/// What [`SuggestionBox::update`] did with a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionUpdate {
    /// The response was the latest and is now shown
    Applied(Vec<String>),
    /// The query was too short; suggestions were cleared without a request
    Cleared,
    /// A newer query arrived during the debounce delay; nothing was sent
    Superseded,
    /// The response arrived after a newer query and was thrown away
    Discarded,
}

/// Query, suggestions and request generation, always changed together.
#[derive(Debug, Default)]
struct SuggestionState {
    query: String,
    suggestions: Vec<String>,
    generation: u64,
    closed: bool,
}

/// Suggestions for the text currently typed in a search field.
///
/// Clones share state, so several updates can be in flight at once from
/// different tasks.
#[derive(Clone)]
pub struct SuggestionBox {
    source: Arc<dyn SuggestionSource>,
    state: Arc<Mutex<SuggestionState>>,
    debounce: Duration,
    cancel: CancellationState,
    events: Option<Arc<SharedEventBroadcaster>>,
}

impl fmt::Debug for SuggestionBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (generation, closed) = {
            let state = self.lock();
            (state.generation, state.closed)
        };
        f.debug_struct("SuggestionBox")
            .field("generation", &generation)
            .field("debounce", &self.debounce)
            .field("closed", &closed)
            .finish()
    }
}

impl SuggestionBox {
    pub fn new(source: Arc<dyn SuggestionSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(SuggestionState::default())),
            debounce: Duration::ZERO,
            cancel: CancellationState::new(),
            events: None,
        }
    }

    /// A box querying `client`, debounced per its configuration.
    pub fn for_client(client: &BackofficeClient) -> Self {
        Self {
            events: Some(client.broadcaster()),
            ..Self::new(Arc::new(client.clone()))
        }
        .with_debounce(client.config().suggestion_debounce)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.lock().suggestions.clone()
    }

    /// The last query passed to [`update`](Self::update).
    pub fn query(&self) -> String {
        self.lock().query.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SuggestionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// React to the search field changing to `query`.
    pub async fn update(&self, query: &str) -> Result<SuggestionUpdate> {
        let generation = {
            let mut state = self.lock();
            if state.closed {
                return Err(BackofficeError::Cancelled);
            }
            state.generation += 1;
            state.query = query.to_string();
            if query.trim().chars().count() <= 1 {
                state.suggestions.clear();
                return Ok(SuggestionUpdate::Cleared);
            }
            state.generation
        };

        let cancel_rx = self.cancel.subscribe();
        if !self.debounce.is_zero() {
            sleep_with_cancel(cancel_rx.clone(), self.debounce).await?;
            if self.lock().generation != generation {
                log::debug!("Suggestion query '{query}' superseded before sending");
                return Ok(SuggestionUpdate::Superseded);
            }
        }

        let result = tokio::select! {
            result = self.source.suggestions(query) => result,
            _ = cancelled(cancel_rx) => return Err(BackofficeError::Cancelled),
        };

        // Check and apply under one lock so a newer query cannot slip in between
        {
            let mut state = self.lock();
            if state.generation == generation {
                return match result {
                    Ok(suggestions) => {
                        state.suggestions = suggestions.clone();
                        Ok(SuggestionUpdate::Applied(suggestions))
                    }
                    Err(e) => {
                        state.suggestions.clear();
                        Err(e)
                    }
                };
            }
        }

        log::debug!("Discarding stale suggestions for '{query}' (generation {generation})");
        if let Some(events) = &self.events {
            events.broadcast_event(ClientEvent::StaleResponseDiscarded {
                query: query.to_string(),
                generation,
            });
        }
        Ok(SuggestionUpdate::Discarded)
    }

    /// Stop all pending work; later updates fail with `Cancelled`.
    pub fn close(&self) {
        {
            let mut state = self.lock();
            state.closed = true;
            state.generation += 1;
            state.suggestions.clear();
        }
        self.cancel.cancel();
    }
}
