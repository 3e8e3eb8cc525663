use super::utils::{get_credentials, save_session};
use catalog_backoffice::{AppStateStore, BackofficeClient};

pub async fn handle_login(
    client: &BackofficeClient,
    store: &AppStateStore,
) -> Result<(), Box<dyn std::error::Error>> {
    if client.is_logged_in() {
        println!("✅ Already logged in to {}", client.base_url());
        return Ok(());
    }

    let (email, password) = get_credentials()?;
    println!("🔐 Logging in as {email}...");
    client.login(&email, &password).await?;

    println!("💾 Saving session for future use...");
    save_session(client, store);
    println!("✅ Logged in to {}", client.base_url());
    Ok(())
}

pub fn handle_logout(
    client: &BackofficeClient,
    store: &AppStateStore,
) -> Result<(), Box<dyn std::error::Error>> {
    client.logout_and_forget(store)?;
    println!("👋 Logged out");
    Ok(())
}
