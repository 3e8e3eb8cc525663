use crate::config::ClientConfig;
use crate::events::{ClientEvent, ClientEventReceiver, RequestInfo, SharedEventBroadcaster};
use crate::headers;
use crate::multipart::MultipartForm;
use crate::session::BackofficeSession;
use crate::store::AppStateStore;
use crate::{BackofficeError, Result};
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
    Text(String),
}

/// A fully described request, built by resources before anything is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub method: Method,
    /// Path relative to the API base URL, or an absolute `http(s)://` URL
    pub path: String,
    pub payload: Payload,
    /// Refuse to send without a bearer token
    pub requires_auth: bool,
}

impl Outbound {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            payload: Payload::Empty,
            requires_auth: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn json<T: Serialize + ?Sized>(method: Method, path: impl Into<String>, body: &T) -> Result<Self> {
        Ok(Self {
            payload: Payload::Json(serde_json::to_value(body)?),
            ..Self::new(method, path)
        })
    }

    pub fn multipart(method: Method, path: impl Into<String>, form: MultipartForm) -> Self {
        Self {
            payload: Payload::Multipart(form),
            ..Self::new(method, path)
        }
    }

    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }
}

/// Status and body of an answered request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            BackofficeError::Decode(format!("{e} (status {}, {} bytes)", self.status, self.body.len()))
        })
    }

    /// Best effort human readable error message from the body
    pub fn error_message(&self) -> String {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<String>,
            error: Option<String>,
        }

        if let Ok(ErrorBody { message, error }) = serde_json::from_str::<ErrorBody>(&self.body) {
            if let Some(msg) = message.or(error).filter(|m| !m.trim().is_empty()) {
                return msg;
            }
        }

        let trimmed = self.body.trim();
        if trimmed.is_empty() {
            format!("HTTP {}", self.status)
        } else {
            trimmed.chars().take(200).collect()
        }
    }

    /// Map a non-success status to the error taxonomy
    pub fn into_result(self) -> Result<ApiResponse> {
        match self.status {
            s if (200..300).contains(&s) => Ok(self),
            401 | 403 => Err(BackofficeError::Auth(self.error_message())),
            status => Err(BackofficeError::ServerRejected {
                status,
                message: self.error_message(),
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsrfTokenResponse {
    csrf_token: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client for the catalog back office REST API.
///
/// The client is cheap to clone: clones share the HTTP implementation, the
/// session and the event broadcaster, so a login through one clone is seen by
/// every editor built from the others.
///
/// # Examples
///
/// ```rust,no_run
/// use catalog_backoffice::{BackofficeClient, Result};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let http_client = http_client::native::NativeClient::new();
///     let client = BackofficeClient::new(Box::new(http_client));
///
///     client.login("admin@example.com", "secret").await?;
///     assert!(client.is_logged_in());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BackofficeClient {
    client: Arc<dyn HttpClient>,
    config: ClientConfig,
    session: Arc<Mutex<BackofficeSession>>,
    broadcaster: Arc<SharedEventBroadcaster>,
}

impl std::fmt::Debug for BackofficeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackofficeClient")
            .field("base_url", &self.config.base_url)
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}

impl BackofficeClient {
    /// Create a client for the default base URL.
    pub fn new(client: Box<dyn HttpClient>) -> Self {
        Self::with_config(client, ClientConfig::default())
    }

    /// Create a client with explicit configuration.
    pub fn with_config(client: Box<dyn HttpClient>, config: ClientConfig) -> Self {
        let session = BackofficeSession::anonymous(config.base_url.clone());
        Self::from_session(client, config, session)
    }

    /// Create a client resuming a persisted session.
    ///
    /// The session's base URL wins over the config's when it is set, so a token is
    /// never sent to a backend that did not issue it.
    pub fn from_session(
        client: Box<dyn HttpClient>,
        mut config: ClientConfig,
        session: BackofficeSession,
    ) -> Self {
        if !session.base_url.is_empty() && session.base_url != config.base_url {
            log::debug!(
                "Using session base URL {} instead of {}",
                session.base_url,
                config.base_url
            );
            config = config.with_base_url(&session.base_url);
        }
        let session = BackofficeSession {
            base_url: config.base_url.clone(),
            ..session
        };

        Self {
            client: Arc::from(client),
            config,
            session: Arc::new(Mutex::new(session)),
            broadcaster: Arc::new(SharedEventBroadcaster::new()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Snapshot of the current session state for persistence.
    pub fn session(&self) -> BackofficeSession {
        self.lock_session().clone()
    }

    /// Replace the session state.
    pub fn restore_session(&self, session: BackofficeSession) {
        *self.lock_session() = BackofficeSession {
            base_url: self.config.base_url.clone(),
            ..session
        };
    }

    /// Whether a bearer token is held.
    pub fn is_logged_in(&self) -> bool {
        self.lock_session().is_valid()
    }

    pub fn subscribe(&self) -> ClientEventReceiver {
        self.broadcaster.subscribe()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.broadcaster.latest_event()
    }

    pub(crate) fn broadcast(&self, event: ClientEvent) {
        self.broadcaster.broadcast_event(event);
    }

    pub(crate) fn broadcaster(&self) -> Arc<SharedEventBroadcaster> {
        Arc::clone(&self.broadcaster)
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, BackofficeSession> {
        // A poisoned lock only means a panic elsewhere; the data is plain state.
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolve an endpoint path against the base URL.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let full = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.config.base_url, path.trim_start_matches('/'))
        };
        full.parse::<Url>()
            .map_err(|e| BackofficeError::Network(format!("Invalid URL '{full}': {e}")))
    }

    /// Whether `url` points at the configured API: same origin, path under the
    /// base path.
    pub fn is_api_url(&self, url: &Url) -> bool {
        match self.config.base_url.parse::<Url>() {
            Ok(base) => url.origin() == base.origin() && url.path().starts_with(base.path()),
            Err(_) => false,
        }
    }

    /// Send a request and return whatever the server answered.
    ///
    /// Bearer and CSRF headers are only attached to URLs under the API base;
    /// absolute URLs elsewhere (webhooks) go out without credentials.
    ///
    /// Fails with [`BackofficeError::Auth`] before any network activity when the
    /// request requires a token and none is held.
    pub async fn send(&self, outbound: Outbound) -> Result<ApiResponse> {
        let Outbound {
            method,
            path,
            payload,
            requires_auth,
        } = outbound;
        let request_info = RequestInfo::from_path_and_method(&path, &method.to_string());

        let session = self.session();
        if requires_auth && !session.is_valid() {
            log::error!(
                "Refusing {}: no authentication token",
                request_info.short_description()
            );
            return Err(BackofficeError::Auth(
                "No authentication token; please log in".to_string(),
            ));
        }

        let url = self.url_for(&path)?;
        let on_api = self.is_api_url(&url);
        let mut request = Request::new(method, url);
        headers::add_common_headers(&mut request);
        if on_api {
            headers::add_auth_headers(&mut request, &session);
        } else {
            log::debug!(
                "{} is outside {}, sending without credentials",
                request_info.short_description(),
                self.config.base_url
            );
        }

        match payload {
            Payload::Empty => {}
            Payload::Json(value) => {
                request.set_body(serde_json::to_string(&value)?);
                let _ = request.insert_header("Content-Type", "application/json");
            }
            Payload::Multipart(form) => {
                request.set_body(form.to_bytes());
                let _ = request.insert_header("Content-Type", form.content_type());
            }
            Payload::Text(text) => {
                request.set_body(text);
                let _ = request.insert_header("Content-Type", "text/plain; charset=utf-8");
            }
        }

        log::debug!("Sending {}", request_info.short_description());
        self.broadcast(ClientEvent::RequestStarted {
            request: request_info.clone(),
        });
        let request_start = std::time::Instant::now();

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| BackofficeError::Network(e.to_string()))?;

        let status: u16 = response.status().into();
        self.broadcast(ClientEvent::RequestCompleted {
            request: request_info.clone(),
            status_code: status,
            duration_ms: request_start.elapsed().as_millis() as u64,
        });
        log::debug!("{} -> {status}", request_info.short_description());

        let body = response
            .body_string()
            .await
            .map_err(|e| BackofficeError::Network(e.to_string()))?;

        Ok(ApiResponse { status, body })
    }

    /// Send a request and map non-success statuses to errors.
    pub async fn execute(&self, outbound: Outbound) -> Result<ApiResponse> {
        self.send(outbound).await?.into_result()
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(Outbound::get(path)).await?.json()
    }

    /// Fetch a fresh CSRF token and keep it in the session.
    pub async fn fetch_csrf_token(&self) -> Result<String> {
        let response: CsrfTokenResponse = self
            .execute(Outbound::get("csrf-token"))
            .await
            .map_err(|e| match e {
                BackofficeError::ServerRejected { status, message } => BackofficeError::Auth(
                    format!("Could not obtain CSRF token ({status}): {message}"),
                ),
                other => other,
            })?
            .json()?;

        self.lock_session().csrf_token = Some(response.csrf_token.clone());
        Ok(response.csrf_token)
    }

    /// Authenticate with email and password.
    ///
    /// When a token is already held this is a no-op, matching the login screen
    /// that forwards already-authenticated users straight to the dashboard.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        if self.is_logged_in() {
            log::debug!("Already logged in, skipping login request");
            return Ok(());
        }

        self.fetch_csrf_token().await?;

        let email = email.trim().to_lowercase();
        let outbound = Outbound::json(
            Method::Post,
            "login",
            &LoginRequest {
                email: &email,
                password,
            },
        )?;

        let response = self.send(outbound).await?;
        if !response.is_success() {
            return Err(BackofficeError::Auth(response.error_message()));
        }

        let LoginResponse { token } = response.json()?;
        if token.trim().is_empty() {
            return Err(BackofficeError::Auth(
                "Login response did not contain a token".to_string(),
            ));
        }

        let mut session = self.lock_session();
        session.email = Some(email);
        session.token = Some(token);
        log::info!("Logged in to {}", self.config.base_url);
        Ok(())
    }

    /// Forget the credentials held by this client and its clones.
    ///
    /// A session saved with [`AppStateStore::save_session`] is left on disk; use
    /// [`logout_and_forget`](Self::logout_and_forget) to remove it as well.
    pub fn logout(&self) {
        self.lock_session().clear();
        log::info!("Logged out");
    }

    /// Log out and delete the session persisted in `store`.
    pub fn logout_and_forget(&self, store: &AppStateStore) -> Result<()> {
        self.logout();
        store.invalidate_session()
    }
}
