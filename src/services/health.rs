//! Outbound reachability check used by `/health`.
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    /// Status code returned by the probe target.
    async fn check(&self) -> Result<StatusCode, HealthError>;
}

#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    target: Url,
    client: reqwest::Client,
}

impl HttpHealthProbe {
    pub fn new(target: Url, timeout: Duration) -> Result<Self, HealthError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { target, client })
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    #[tracing::instrument(name = "health.probe", skip(self), fields(target = %self.target))]
    async fn check(&self) -> Result<StatusCode, HealthError> {
        let response = self.client.get(self.target.clone()).send().await?;
        Ok(response.status())
    }
}
