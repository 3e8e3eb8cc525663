use crate::dashboard::{default_preferences, KpiPreference};
use crate::session::BackofficeSession;
use crate::{BackofficeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "catalog-backoffice";
const SESSION_FILE: &str = "session.json";
const PREFERENCES_FILE: &str = "preferences.json";

/// Application state kept between runs.
///
/// State lives in one directory, by default
/// `~/.local/share/catalog-backoffice/`:
///
/// - `session.json`: the authenticated [`BackofficeSession`]
/// - `preferences.json`: dashboard KPI preferences
///
/// Every value has a typed load and save; nothing is read from or written to
/// ambient global state.
#[derive(Debug, Clone)]
pub struct AppStateStore {
    dir: PathBuf,
}

impl AppStateStore {
    /// A store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// A store in the XDG data directory.
    pub fn default_location() -> Result<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            BackofficeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Cannot determine XDG data directory",
            ))
        })?;
        Ok(Self::new(data_dir.join(APP_DIR)))
    }

    /// The configured directory if any, the XDG location otherwise.
    pub fn from_config(config: &crate::ClientConfig) -> Result<Self> {
        match &config.data_dir {
            Some(dir) => Ok(Self::new(dir)),
            None => Self::default_location(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.dir.join(PREFERENCES_FILE)
    }

    /// Load the saved session, `None` when nothing was saved.
    pub fn load_session(&self) -> Result<Option<BackofficeSession>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let session = BackofficeSession::from_json(&json)?;
        log::debug!("Session loaded from: {}", path.display());
        Ok(Some(session))
    }

    pub fn save_session(&self, session: &BackofficeSession) -> Result<()> {
        let path = self.session_path();
        self.write(&path, &session.to_json()?)?;
        log::debug!("Session saved to: {}", path.display());
        Ok(())
    }

    /// Remove the saved session. Missing files are not an error.
    pub fn invalidate_session(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(&path)?;
            log::info!("Session removed from: {}", path.display());
        }
        Ok(())
    }

    /// Load KPI preferences, falling back to the defaults when none were saved.
    pub fn load_preferences(&self) -> Result<Vec<KpiPreference>> {
        let path = self.preferences_path();
        if !path.exists() {
            return Ok(default_preferences());
        }

        let json = fs::read_to_string(&path)?;
        let prefs: Vec<KpiPreference> = serde_json::from_str(&json)?;
        Ok(prefs)
    }

    pub fn save_preferences(&self, preferences: &[KpiPreference]) -> Result<()> {
        let path = self.preferences_path();
        self.write(&path, &serde_json::to_string_pretty(preferences)?)?;
        log::debug!(
            "Saved {} KPI preferences to: {}",
            preferences.len(),
            path.display()
        );
        Ok(())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::ChartType;

    #[test]
    fn test_missing_files_yield_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStateStore::new(dir.path().join("nested"));

        assert!(store.load_session().unwrap().is_none());
        assert_eq!(store.load_preferences().unwrap(), default_preferences());
        assert!(store.invalidate_session().is_ok());
    }

    #[test]
    fn test_session_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStateStore::new(dir.path());

        let session = BackofficeSession::new(
            Some("admin@example.com".to_string()),
            Some("jwt".to_string()),
            None,
            "http://localhost:3001/api/".to_string(),
        );
        store.save_session(&session).unwrap();

        assert_eq!(store.load_session().unwrap(), Some(session));

        store.invalidate_session().unwrap();
        assert!(store.load_session().unwrap().is_none());
    }

    #[test]
    fn test_preferences_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStateStore::new(dir.path());

        let mut prefs = default_preferences();
        prefs[0].threshold = 75.0;
        prefs[1].chart = ChartType::Line;
        store.save_preferences(&prefs).unwrap();

        assert_eq!(store.load_preferences().unwrap(), prefs);
    }

    #[test]
    fn test_corrupt_preferences_are_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStateStore::new(dir.path());
        fs::write(store.preferences_path(), "not json").unwrap();

        assert!(matches!(
            store.load_preferences(),
            Err(BackofficeError::Decode(_))
        ));
    }
}
