//! HTTP execution collaborator
//!
//! [`RequestsWrapper`] performs one request and hands back the status code
//! and raw body. A non-2xx status is a normal [`ApiResponse`], not an error;
//! only transport failures (connection refused, timeout) return `Err`.

use crate::error::Result;
use crate::spec::Method;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// Status and body of an API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub text: String,
}

impl ApiResponse {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs HTTP requests on behalf of the caller.
#[async_trait]
pub trait RequestsWrapper: Send + Sync {
    /// Perform a request. `params` go to the query string, `data` is sent as
    /// a JSON body.
    async fn request(
        &self,
        method: Method,
        url: &str,
        params: Option<&Map<String, Value>>,
        data: Option<&Value>,
    ) -> Result<ApiResponse>;

    async fn get(&self, url: &str, params: Option<&Map<String, Value>>) -> Result<ApiResponse> {
        self.request(Method::Get, url, params, None).await
    }

    async fn post(
        &self,
        url: &str,
        params: Option<&Map<String, Value>>,
        data: Option<&Value>,
    ) -> Result<ApiResponse> {
        self.request(Method::Post, url, params, data).await
    }

    async fn put(
        &self,
        url: &str,
        params: Option<&Map<String, Value>>,
        data: Option<&Value>,
    ) -> Result<ApiResponse> {
        self.request(Method::Put, url, params, data).await
    }

    async fn patch(
        &self,
        url: &str,
        params: Option<&Map<String, Value>>,
        data: Option<&Value>,
    ) -> Result<ApiResponse> {
        self.request(Method::Patch, url, params, data).await
    }

    async fn delete(
        &self,
        url: &str,
        params: Option<&Map<String, Value>>,
        data: Option<&Value>,
    ) -> Result<ApiResponse> {
        self.request(Method::Delete, url, params, data).await
    }
}

/// [`RequestsWrapper`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpRequests {
    client: reqwest::Client,
    access_token: Option<String>,
}

impl HttpRequests {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            access_token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.access_token = (!token.is_empty()).then_some(token);
        self
    }
}

/// Render params as query pairs; strings are sent without quotes.
fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

#[async_trait]
impl RequestsWrapper for HttpRequests {
    async fn request(
        &self,
        method: Method,
        url: &str,
        params: Option<&Map<String, Value>>,
        data: Option<&Value>,
    ) -> Result<ApiResponse> {
        let mut builder = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        };

        if let Some(params) = params {
            builder = builder.query(&query_pairs(params));
        }
        if let (true, Some(data)) = (method.has_body(), data) {
            builder = builder.json(data);
        }
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(%method, url, status, bytes = text.len(), "API request completed");

        Ok(ApiResponse { status, text })
    }
}
