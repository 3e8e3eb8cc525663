//! # Client Events
//!
//! A broadcast channel carrying what the client does: requests sent and answered,
//! dashboard alerts raised, and suggestion responses thrown away because a newer
//! query superseded them. Front ends subscribe to drive status lines or logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

/// Request information for client events
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestInfo {
    /// The HTTP method (GET, POST, etc.)
    pub method: String,
    /// Path relative to the API base, without query string
    pub path: String,
    /// Query parameters as key-value pairs
    pub query_params: Vec<(String, String)>,
}

impl RequestInfo {
    /// Create RequestInfo from a relative path (optionally with a query) and method
    pub fn from_path_and_method(path_and_query: &str, method: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path_and_query, ""),
        };

        let query_params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();

        Self {
            method: method.to_string(),
            path: path.trim_start_matches('/').to_string(),
            query_params,
        }
    }

    /// Get a short description of the request for logging
    pub fn short_description(&self) -> String {
        let mut desc = format!("{} /{}", self.method, self.path);
        if let Some((k, v)) = self.query_params.first() {
            desc.push_str(&format!("?{k}={v}"));
            if self.query_params.len() > 1 {
                desc.push_str("...");
            }
        }
        desc
    }
}

/// Event type to describe client activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    /// Request started
    RequestStarted {
        /// Request details
        request: RequestInfo,
    },
    /// Request answered (any status)
    RequestCompleted {
        /// Request details
        request: RequestInfo,
        /// HTTP status code
        status_code: u16,
        /// Duration of the request in milliseconds
        duration_ms: u64,
    },
    /// A dashboard KPI crossed its threshold
    AlertRaised {
        /// KPI identifier (`cpu`, `memory`, ...)
        kpi_id: String,
        /// Human readable alert text
        message: String,
        /// When the alert was raised
        timestamp: DateTime<Utc>,
    },
    /// A suggestion response arrived after a newer query had been issued
    StaleResponseDiscarded {
        /// The query the discarded response belonged to
        query: String,
        /// Generation of the discarded request
        generation: u64,
    },
}

/// Type alias for the broadcast receiver
pub type ClientEventReceiver = broadcast::Receiver<ClientEvent>;

/// Shared event broadcasting state that persists across client clones
#[derive(Clone)]
pub struct SharedEventBroadcaster {
    event_tx: broadcast::Sender<ClientEvent>,
    last_event_tx: watch::Sender<Option<ClientEvent>>,
}

impl SharedEventBroadcaster {
    /// Create a new shared event broadcaster
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (last_event_tx, _) = watch::channel(None);

        Self {
            event_tx,
            last_event_tx,
        }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast_event(&self, event: ClientEvent) {
        let _ = self.event_tx.send(event.clone());
        let _ = self.last_event_tx.send_replace(Some(event));
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> ClientEventReceiver {
        self.event_tx.subscribe()
    }

    /// Get the latest event
    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.last_event_tx.borrow().clone()
    }
}

impl Default for SharedEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedEventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEventBroadcaster")
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}
