//! HTTP transport abstraction.
//!
//! This module defines the `HttpClient` trait so the admin client can run against the real
//! backend (`ReqwestHttpClient`) or against scripted responses (`MockHttpClient`) without
//! touching the view-model.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::errors::{Error, Result};

/// A single request against the admin API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path below the base URL, e.g. `/admin/projects`
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn with_query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// `"{METHOD} {path}"`, the key used for logging and for scripted responses.
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Response from an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as a string
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for executing HTTP requests against the admin API.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute one request. Errors are transport-level only: a 4xx/5xx answer is still an
    /// `Ok(HttpResponse)`.
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Makes sure a url has a trailing slash, so `join` appends instead of replacing the last
/// path segment.
fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let mut path = new_url.path().to_string();
        path.push('/');
        new_url.set_path(&path);
        new_url
    }
}

// ============================================================================
// Production Implementation using reqwest
// ============================================================================

/// Production HTTP client using reqwest.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    base_url: Url,
    request_timeout: Option<Duration>,
}

impl ReqwestHttpClient {
    pub fn new(base_url: Url, request_timeout: Option<Duration>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: ensure_slash(&base_url),
            request_timeout,
        }
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Other(anyhow::anyhow!("Failed to construct URL for {path}: {e}")))
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    #[tracing::instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.path)
    )]
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = self.url_for(&request.path)?;

        tracing::debug!(url = %url, query = ?request.query, "Executing admin API request");

        let mut req = self.client.request(request.method.clone(), url.clone());
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }
        if let Some(timeout) = self.request_timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Admin API request failed");
            e
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(status, response_len = body.len(), "Admin API request completed");

        Ok(HttpResponse { status, body })
    }
}

// ============================================================================
// Test/Mock Implementation
// ============================================================================

struct ScriptedResponse {
    delay: Option<Duration>,
    result: Result<HttpResponse>,
}

/// Mock HTTP client with scripted responses.
///
/// Responses are keyed by `"{METHOD} {path}"` and returned in FIFO order. A request with no
/// scripted response fails like a dropped connection, which is what the fallback paths of
/// the console expect.
#[derive(Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, VecDeque<ScriptedResponse>>>>,
    calls: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response for `key`.
    pub fn add_response(&self, key: &str, result: Result<HttpResponse>) {
        self.push(key, None, result);
    }

    /// Queue a `200 OK` envelope with the given code and data.
    pub fn add_envelope(&self, key: &str, code: i64, data: Value) {
        self.push(key, None, Ok(envelope(code, data)));
    }

    /// Queue a `200 OK` envelope that is only delivered after `delay`.
    pub fn add_delayed_envelope(&self, key: &str, delay: Duration, code: i64, data: Value) {
        self.push(key, Some(delay), Ok(envelope(code, data)));
    }

    fn push(&self, key: &str, delay: Option<Duration>, result: Result<HttpResponse>) {
        self.responses
            .lock()
            .entry(key.to_string())
            .or_default()
            .push_back(ScriptedResponse { delay, result });
    }

    /// Get all requests that have been made to this mock client.
    pub fn get_calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().clone()
    }

    /// Number of requests made for `key`.
    pub fn calls_for(&self, key: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.key() == key).count()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

fn envelope(code: i64, data: Value) -> HttpResponse {
    let message = if code == crate::api::SUCCESS_CODE { Value::from("ok") } else { Value::Null };
    HttpResponse {
        status: 200,
        body: serde_json::json!({ "code": code, "message": message, "data": data }).to_string(),
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.calls.lock().push(request.clone());

        let key = request.key();
        let scripted = self.responses.lock().get_mut(&key).and_then(VecDeque::pop_front);

        match scripted {
            Some(ScriptedResponse { delay, result }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Err(Error::Other(anyhow::anyhow!("No mock response configured for {key}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn ensure_slash_appends_once() {
        let url = Url::parse("http://localhost:8081/api").unwrap();
        assert_eq!(ensure_slash(&url).as_str(), "http://localhost:8081/api/");
        let url = Url::parse("http://localhost:8081/api/").unwrap();
        assert_eq!(ensure_slash(&url).as_str(), "http://localhost:8081/api/");
    }

    #[tokio::test]
    async fn reqwest_client_keeps_base_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/instances/with-projects"))
            .and(query_param("projectId", "proj_001"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"code": 200, "data": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
        let client = ReqwestHttpClient::new(base_url, None);
        let request = HttpRequest::get("/admin/instances/with-projects")
            .with_query(vec![("projectId", "proj_001".to_string())]);

        let response = client.execute(&request).await.unwrap();
        assert!(response.is_success());
        assert!(response.body.contains("\"code\":200"));
    }

    #[tokio::test]
    async fn reqwest_client_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/apikeys"))
            .and(body_json(json!({"description": "ci"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"code": 200, "data": null})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let base_url = Url::parse(&server.uri()).unwrap();
        let client = ReqwestHttpClient::new(base_url, Some(Duration::from_secs(5)));
        let request = HttpRequest::new(Method::POST, "/admin/apikeys")
            .with_body(json!({"description": "ci"}));

        let response = client.execute(&request).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn reqwest_client_returns_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new(Url::parse(&server.uri()).unwrap(), None);
        let response = client.execute(&HttpRequest::get("/admin/projects")).await.unwrap();
        assert_eq!(response.status, 503);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn reqwest_client_reports_network_errors() {
        // Point to a port that's not listening
        let client = ReqwestHttpClient::new(Url::parse("http://127.0.0.1:1").unwrap(), None);
        let result = client.execute(&HttpRequest::get("/admin/projects")).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn mock_client_returns_in_fifo_order() {
        let mock = MockHttpClient::new();
        mock.add_envelope("GET /admin/projects", 200, json!(["first"]));
        mock.add_envelope("GET /admin/projects", 200, json!(["second"]));

        let request = HttpRequest::get("/admin/projects");
        let first = mock.execute(&request).await.unwrap();
        let second = mock.execute(&request).await.unwrap();

        assert!(first.body.contains("first"));
        assert!(second.body.contains("second"));
        assert_eq!(mock.calls_for("GET /admin/projects"), 2);
    }

    #[tokio::test]
    async fn mock_client_without_script_fails() {
        let mock = MockHttpClient::new();
        let result = mock.execute(&HttpRequest::get("/admin/unknown")).await;
        assert!(result.is_err());
        assert_eq!(mock.call_count(), 1);
    }
}
