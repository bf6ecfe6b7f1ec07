//! HTTP transport implementation
//!
//! This module handles all HTTP requests issued by the source extractors, including:
//! - Building the shared HTTP client with a browser-like user agent
//! - Single GET / POST requests with a per-request timeout
//! - Error classification (timeout, connect, body)

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a single HTTP exchange
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Failed to read body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// HTTP method for a request, with the body for POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post { body: String },
}

/// One HTTP request as described by a source query
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Target URL
    pub url: String,

    /// GET or POST (with body)
    pub method: Method,

    /// Extra request headers
    pub headers: Vec<(String, String)>,

    /// Per-attempt timeout for this request
    pub timeout: Duration,
}

impl HttpRequest {
    /// Creates a GET request with no extra headers
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: Vec::new(),
            timeout,
        }
    }

    /// Creates a POST request carrying a JSON body
    pub fn post_json(url: impl Into<String>, body: String, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method: Method::Post { body },
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            timeout,
        }
    }

    /// Adds a header, builder style
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Raw response returned by the transport
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Returns true for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single HTTP request
///
/// Implementations must not retry; retries belong to the retry executor.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header sent with every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use algo_harvest::fetch::build_http_client;
///
/// let client = build_http_client("Mozilla/5.0").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Transport backed by a reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client for the given user agent and wraps it
    pub fn with_user_agent(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent)?))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::debug!("Requesting {}", request.url);

        let mut builder = match &request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post { body } => self.client.post(&request.url).body(body.clone()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| classify_error(&request.url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: request.url.clone(),
                }
            } else {
                TransportError::Body {
                    url: request.url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// Maps a reqwest error onto the transport taxonomy
fn classify_error(url: &str, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
