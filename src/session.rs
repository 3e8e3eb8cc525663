use serde::{Deserialize, Serialize};

/// Serializable authentication state that can be persisted and restored.
///
/// This is the typed replacement for the browser's `token` storage key: it holds
/// everything needed to resume talking to the backend without logging in again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackofficeSession {
    /// The email the session was opened with
    pub email: Option<String>,
    /// Bearer token issued by `POST /login`
    pub token: Option<String>,
    /// CSRF token from `GET /csrf-token`
    pub csrf_token: Option<String>,
    /// Base URL of the API the token belongs to
    pub base_url: String,
}

impl BackofficeSession {
    /// Create a new session with the provided state
    pub fn new(
        email: Option<String>,
        token: Option<String>,
        csrf_token: Option<String>,
        base_url: String,
    ) -> Self {
        Self {
            email,
            token,
            csrf_token,
            base_url,
        }
    }

    /// An anonymous session for `base_url`
    pub fn anonymous(base_url: String) -> Self {
        Self {
            base_url,
            ..Default::default()
        }
    }

    /// Check if this session carries a usable bearer token
    ///
    /// This performs basic validation but doesn't guarantee the token
    /// is still accepted by the server.
    pub fn is_valid(&self) -> bool {
        self.token
            .as_deref()
            .map(|token| !token.trim().is_empty())
            .unwrap_or(false)
    }

    /// Drop credentials, keeping the base URL
    pub fn clear(&mut self) {
        self.email = None;
        self.token = None;
        self.csrf_token = None;
    }

    /// Serialize session to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize session from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
