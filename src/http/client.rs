use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::observability::ApiMetrics;

/// JSON transport bound to one base address.
///
/// No retries and no timeout beyond the reqwest defaults: every failure is
/// reported to the caller on the first attempt.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    metrics: Arc<ApiMetrics>,
}

impl HttpTransport {
    /// Create a transport for an already-resolved base address.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            metrics: Arc::new(ApiMetrics::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metrics(&self) -> &ApiMetrics {
        &self.metrics
    }

    /// Issue a request and return the parsed JSON body.
    pub async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.metrics.record_request();
        let result = self.dispatch(method, path, body).await;
        if let Err(ref err) = result {
            self.metrics.record_error(err);
        }
        result
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send::<()>(Method::GET, path, None).await
    }

    pub async fn post<B>(&self, path: &str, body: &B) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send::<()>(Method::DELETE, path, None).await
    }

    async fn dispatch<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let endpoint = format!("{}{}", self.base_url, path);
        let started = Instant::now();
        debug!("{} {}", method, endpoint);

        let mut request = self
            .client
            .request(method.clone(), &endpoint)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| {
            warn!("{} {} unreachable: {}", method, endpoint, source);
            ApiError::Network {
                endpoint: endpoint.clone(),
                source,
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ApiError::Network {
            endpoint: endpoint.clone(),
            source,
        })?;
        debug!(
            "{} {} -> {} in {}ms",
            method,
            endpoint,
            status.as_u16(),
            started.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(ApiError::remote(status.as_u16(), text));
        }

        serde_json::from_str(&text).map_err(|source| ApiError::Decode { endpoint, source })
    }
}
