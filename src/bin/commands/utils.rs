use catalog_backoffice::{AppStateStore, BackofficeClient, ClientConfig};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

/// Build a client, resuming the saved session if there is one.
///
/// A session file that cannot be read is removed so the next login starts clean.
pub fn build_client(config: ClientConfig, store: &AppStateStore) -> BackofficeClient {
    let http_client = http_client::native::NativeClient::new();

    match store.load_session() {
        Ok(Some(session)) => {
            log::debug!("Restoring session from {}", store.session_path().display());
            BackofficeClient::from_session(Box::new(http_client), config, session)
        }
        Ok(None) => BackofficeClient::with_config(Box::new(http_client), config),
        Err(e) => {
            eprintln!("⚠️  Ignoring unreadable session file: {e}");
            let _ = store.invalidate_session();
            BackofficeClient::with_config(Box::new(http_client), config)
        }
    }
}

/// Log in with the environment credentials unless a token is already held.
pub async fn ensure_logged_in(
    client: &BackofficeClient,
    store: &AppStateStore,
) -> Result<(), Box<dyn std::error::Error>> {
    if client.is_logged_in() {
        return Ok(());
    }

    println!("🔐 No saved session, logging in...");
    let (email, password) = get_credentials()?;
    client.login(&email, &password).await?;
    save_session(client, store);
    Ok(())
}

pub fn save_session(client: &BackofficeClient, store: &AppStateStore) {
    if let Err(e) = store.save_session(&client.session()) {
        println!("⚠️  Warning: Failed to save session: {e}");
        println!("   (You'll need to login again next time)");
    } else {
        log::debug!("Session saved");
    }
}

/// Get email and password from environment variables
pub fn get_credentials() -> Result<(String, String), Box<dyn std::error::Error>> {
    let email = env::var("BACKOFFICE_EMAIL")
        .map_err(|_| "BACKOFFICE_EMAIL environment variable not set")?;
    let password = env::var("BACKOFFICE_PASSWORD")
        .map_err(|_| "BACKOFFICE_PASSWORD environment variable not set")?;
    Ok((email, password))
}

/// Ask a yes/no question on stderr
pub fn ask_for_confirmation(message: &str) -> bool {
    eprint!("{message} (y/N): ");
    if io::stderr().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    let response = input.trim().to_lowercase();
    response == "y" || response == "yes"
}

/// Print one value as a JSON line on stdout
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize output to JSON: {e}"),
    }
}

/// Horizontal bar of `width` cells filled in proportion to `value / max`
pub fn render_bar(value: f64, max: f64, width: usize) -> String {
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(50.0, 100.0, 4), "██░░");
        assert_eq!(render_bar(150.0, 100.0, 2), "██");
        assert_eq!(render_bar(1.0, 0.0, 3), "░░░");
    }
}
