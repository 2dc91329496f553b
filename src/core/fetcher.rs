use crate::core::{ConfigProvider, OutputSink, RenderedOutput, Resource};
use crate::domain::model::{ApiIndex, HealthStatus};
use crate::utils::error::{FinanceClientError, Result};
use chrono::Utc;
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Pretty-prints a JSON value with 2-space indentation.
pub fn render_pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// HTTP access to the finance service, relative to one base URL.
#[derive(Debug, Clone)]
pub struct ResourceFetcher {
    client: Client,
    base_url: String,
}

impl ResourceFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::with_timeout(config.base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.endpoint_url(path);
        tracing::debug!("GET {}", url);
        self.send_for_json(self.client.get(&url), url).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let url = self.endpoint_url(path);
        tracing::debug!("POST {}", url);
        self.send_for_json(self.client.post(&url).json(body), url)
            .await
    }

    async fn send_for_json(&self, request: RequestBuilder, url: String) -> Result<Value> {
        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status {} from {}", status, url);
        if !status.is_success() {
            return Err(FinanceClientError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        // non-JSON bodies surface as InvalidJson
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| FinanceClientError::InvalidJson { url, source })
    }

    async fn get_typed<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint_url(path);
        let value = self.get_json(path).await?;
        serde_json::from_value(value).map_err(|source| FinanceClientError::InvalidJson { url, source })
    }

    /// Fetches one resource and replaces its target's text with the pretty
    /// JSON. The target is left untouched if anything fails before the write.
    pub async fn fetch_and_render<S: OutputSink + ?Sized>(
        &self,
        resource: &Resource,
        sink: &S,
    ) -> Result<RenderedOutput> {
        let url = self.endpoint_url(&resource.path);
        let value = self.get_json(&resource.path).await?;
        let rendered = render_value(&resource.name, &resource.target, url, &value, sink).await?;

        tracing::info!(
            "Rendered {} into {} ({} bytes)",
            resource.name,
            resource.target,
            rendered.text.len()
        );
        Ok(rendered)
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_typed("/health").await
    }

    pub async fn index(&self) -> Result<ApiIndex> {
        self.get_typed("/").await
    }
}

/// Writes an already fetched value into `target`.
pub async fn render_value<S: OutputSink + ?Sized>(
    name: &str,
    target: &str,
    url: String,
    value: &Value,
    sink: &S,
) -> Result<RenderedOutput> {
    let text = render_pretty(value)?;
    sink.write_text(target, &text).await?;

    Ok(RenderedOutput {
        resource: name.to_string(),
        target: target.to_string(),
        url,
        text,
        fetched_at: Utc::now(),
    })
}
