use std::path::PathBuf;
use std::time::Duration;

/// Base URL of the backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api/";

/// Dashboard refresh period used when nothing else is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Client-wide configuration.
///
/// Built with the `with_*` methods, or from `BACKOFFICE_*` environment variables
/// with [`ClientConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is resolved against (always ends with `/`)
    pub base_url: String,
    /// Interval between two dashboard polls
    pub poll_interval: Duration,
    /// Webhook that receives dashboard alerts as plain text (ntfy-style)
    pub notify_url: Option<String>,
    /// Delay before a suggestion request is sent; zero disables debouncing
    pub suggestion_debounce: Duration,
    /// Directory holding the persisted session and preferences
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            notify_url: None,
            suggestion_debounce: Duration::ZERO,
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Create default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config overridden by `BACKOFFICE_BASE_URL`, `BACKOFFICE_POLL_SECS`,
    /// `BACKOFFICE_NOTIFY_URL` and `BACKOFFICE_DATA_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(base_url) = lookup("BACKOFFICE_BASE_URL") {
            config = config.with_base_url(&base_url);
        }
        if let Some(secs) = lookup("BACKOFFICE_POLL_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.poll_interval = Duration::from_secs(secs),
                _ => log::warn!("Ignoring invalid BACKOFFICE_POLL_SECS value '{secs}'"),
            }
        }
        if let Some(url) = lookup("BACKOFFICE_NOTIFY_URL") {
            config.notify_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(dir) = lookup("BACKOFFICE_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        config
    }

    /// Set the backend base URL; a trailing `/` is added when missing
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let trimmed = base_url.trim();
        self.base_url = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        self
    }

    /// Set the dashboard poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the alert webhook
    pub fn with_notify_url(mut self, url: &str) -> Self {
        self.notify_url = Some(url.to_string());
        self
    }

    /// Set the suggestion debounce delay
    pub fn with_suggestion_debounce(mut self, debounce: Duration) -> Self {
        self.suggestion_debounce = debounce;
        self
    }

    /// Set the directory used for persisted state
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }
}
