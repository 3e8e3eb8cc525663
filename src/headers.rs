use crate::session::BackofficeSession;
use http_client::Request;

/// User agent sent with every request
const USER_AGENT: &str = concat!("catalog-backoffice/", env!("CARGO_PKG_VERSION"));

/// Add headers shared by all API requests
pub fn add_common_headers(request: &mut Request) {
    let _ = request.insert_header("User-Agent", USER_AGENT);
    let _ = request.insert_header("Accept", "application/json");
}

/// Add bearer and CSRF headers for whatever credentials the session holds
pub fn add_auth_headers(request: &mut Request, session: &BackofficeSession) {
    if let Some(token) = session.token.as_deref().filter(|t| !t.is_empty()) {
        let _ = request.insert_header("Authorization", format!("Bearer {token}"));
    }
    if let Some(csrf) = session.csrf_token.as_deref().filter(|t| !t.is_empty()) {
        let _ = request.insert_header("X-CSRF-Token", csrf);
    }
}
