//! ClubHub REST client.
//!
//! Every call is a single best-effort attempt: no retry and no cancellation.
//! A timeout applies only when one is configured.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::request::{Method, RequestDescriptor};
use super::CredentialSource;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// HTTP client bound to a base endpoint and a credential source.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `config.api_url` that authenticates with whatever
    /// `credentials` currently holds.
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialSource>) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request and normalize the outcome.
    ///
    /// 2xx yields the parsed JSON body (`Null` when empty). Anything else
    /// fails with [`ClientError::Server`] carrying the body's `message`
    /// field, or a generic message naming the status.
    pub async fn request(&self, descriptor: RequestDescriptor) -> ClientResult<Value> {
        let url = descriptor.url(&self.base_url);
        let headers = self.headers_for(&descriptor)?;

        tracing::debug!(
            method = %descriptor.method,
            endpoint = %descriptor.endpoint,
            authenticated = headers.contains_key(AUTHORIZATION),
            "Sending API request"
        );

        let mut req = self
            .http
            .request(descriptor.method.into(), &url)
            .headers(headers);
        if !descriptor.query.is_empty() {
            req = req.query(&descriptor.query);
        }
        if let Some(body) = &descriptor.body {
            req = req.body(serde_json::to_vec(body)?);
        }

        let response = req.send().await.map_err(|e| {
            tracing::warn!(endpoint = %descriptor.endpoint, error = %e, "API request did not complete");
            ClientError::Network(format!("Network error: {}", e))
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(format!("Network error: {}", e)))?;

        if !status.is_success() {
            let message = error_message(status.as_u16(), &bytes);
            tracing::warn!(
                endpoint = %descriptor.endpoint,
                status = status.as_u16(),
                message = %message,
                "API request rejected"
            );
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get(&self, endpoint: &str) -> ClientResult<Value> {
        self.request(RequestDescriptor::get(endpoint)).await
    }

    /// GET with query-string parameters.
    pub async fn get_with_query<K, V>(&self, endpoint: &str, query: &[(K, V)]) -> ClientResult<Value>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let descriptor = query.iter().fold(RequestDescriptor::get(endpoint), |d, (k, v)| {
            d.query(k.as_ref(), v.as_ref())
        });
        self.request(descriptor).await
    }

    pub async fn post(&self, endpoint: &str, body: Option<Value>) -> ClientResult<Value> {
        self.request(with_body(Method::Post, endpoint, body)).await
    }

    pub async fn put(&self, endpoint: &str, body: Option<Value>) -> ClientResult<Value> {
        self.request(with_body(Method::Put, endpoint, body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> ClientResult<Value> {
        self.request(RequestDescriptor::delete(endpoint)).await
    }

    fn headers_for(&self, descriptor: &RequestDescriptor) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = self.credentials.credential() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::Config("Stored credential is not a valid header value".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in &descriptor.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::Config(format!("Invalid header name: {}", name)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::Config(format!("Invalid value for header {}", name)))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

fn with_body(method: Method, endpoint: &str, body: Option<Value>) -> RequestDescriptor {
    let descriptor = RequestDescriptor::new(method, endpoint);
    match body {
        Some(body) => descriptor.body(body),
        None => descriptor,
    }
}

/// Message for a rejected request: the body's `message` (or `error`) field,
/// otherwise a generic one naming the status.
fn error_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"].iter().find_map(|field| {
                value
                    .get(*field)
                    .and_then(|v| v.as_str())
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}
