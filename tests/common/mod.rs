#![allow(dead_code)]
use async_trait::async_trait;
use catalog_backoffice::{BackofficeClient, BackofficeSession, ClientConfig};
use http_client::{HttpClient, Request, Response};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "http://backend.test/api/";

/// A request as seen by [`FakeHttp`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    /// Path relative to [`BASE_URL`], without the query string
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Debug, Clone)]
struct Route {
    method: String,
    /// `path` or `path?query`
    target: String,
    status: u16,
    body: String,
    delay: Duration,
}

#[derive(Debug, Default)]
struct FakeState {
    routes: Vec<Route>,
    requests: Vec<RecordedRequest>,
}

/// In-process `HttpClient` serving canned responses and recording every request.
///
/// Unrouted requests get a 404. When several routes match, the most recently
/// added one wins.
#[derive(Debug, Clone, Default)]
pub struct FakeHttp {
    state: Arc<Mutex<FakeState>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, target: &str, status: u16, body: serde_json::Value) {
        self.respond_delayed(method, target, status, body, Duration::ZERO);
    }

    pub fn respond_delayed(
        &self,
        method: &str,
        target: &str,
        status: u16,
        body: serde_json::Value,
        delay: Duration,
    ) {
        self.state.lock().unwrap().routes.push(Route {
            method: method.to_string(),
            target: target.to_string(),
            status,
            body: body.to_string(),
            delay,
        });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    fn find_route(&self, method: &str, path: &str, query: Option<&str>) -> Option<Route> {
        let full = match query {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        };
        self.state
            .lock()
            .unwrap()
            .routes
            .iter()
            .rev()
            .find(|route| {
                route.method == method && (route.target == full || route.target == path)
            })
            .cloned()
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn send(&self, mut req: Request) -> Result<Response, http_types::Error> {
        let method = req.method().to_string();
        let url = req.url().clone();
        let path = url
            .path()
            .trim_start_matches("/api/")
            .trim_start_matches('/')
            .to_string();
        let query = url.query().map(str::to_string);
        let headers = ["Authorization", "X-CSRF-Token", "Content-Type", "Accept"]
            .iter()
            .filter_map(|name| {
                req.header(*name)
                    .map(|values| (name.to_string(), values.last().as_str().to_string()))
            })
            .collect();
        let body = String::from_utf8_lossy(&req.body_bytes().await?).into_owned();

        self.state.lock().unwrap().requests.push(RecordedRequest {
            method: method.clone(),
            url: url.to_string(),
            path: path.clone(),
            query: query.clone(),
            headers,
            body,
        });

        let route = self.find_route(&method, &path, query.as_deref());
        let (status, body, delay) = match route {
            Some(route) => (route.status, route.body, route.delay),
            None => (404, r#"{"message":"Not found"}"#.to_string(), Duration::ZERO),
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut response = Response::new(status);
        response.set_body(body);
        let _ = response.insert_header("Content-Type", "application/json");
        Ok(response)
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new().with_base_url(BASE_URL)
}

/// An anonymous client talking to `fake`
pub fn client(fake: &FakeHttp) -> BackofficeClient {
    BackofficeClient::with_config(Box::new(fake.clone()), test_config())
}

/// A client holding a bearer token
pub fn logged_in_client(fake: &FakeHttp) -> BackofficeClient {
    let session = BackofficeSession::new(
        Some("admin@example.com".to_string()),
        Some("test-token".to_string()),
        Some("test-csrf".to_string()),
        BASE_URL.to_string(),
    );
    BackofficeClient::from_session(Box::new(fake.clone()), test_config(), session)
}
