//! Signing-key set (JWKS) retrieval and caching.
//!
//! `KeySource` is the upstream (the tenant's discovery endpoint in production).
//! `JwksCache` sits in front of it:
//! - the set is reused until `ttl` runs out (`ttl == 0` fetches on every call)
//! - a miss is refreshed by one task at a time; concurrent callers wait on the
//!   refresh lock and then pick up the new set instead of fetching again
//! - an unknown `kid` forces one refresh, at most once per `min_refresh`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet, PublicKeyUse};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use url::Url;

#[derive(Debug, Error)]
pub enum JwksError {
    #[error("jwks request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("jwks endpoint returned status {0}")]
    Status(u16),
    #[error("jwks document is invalid: {0}")]
    Parse(String),
    #[error("jwks document contains no usable key")]
    Empty,
}

/// Where signing keys come from.
#[async_trait]
pub trait KeySource: Send + Sync + 'static {
    // For logs.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<JwkSet, JwksError>;
}

/// JWKS published over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteJwks {
    url: Url,
    client: reqwest::Client,
}

impl RemoteJwks {
    /// `timeout` bounds the whole request; hitting it is reported as a transport error.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, JwksError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    #[tracing::instrument(name = "jwks.fetch", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<JwkSet, JwksError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(JwksError::Status(status.as_u16()));
        }

        let body = response.json::<Value>().await?;
        parse_key_set(body)
    }
}

/// Build a `JwkSet` from a raw document, dropping entries this verifier cannot use
/// (unknown `kty`, encryption keys) instead of rejecting the whole set.
pub fn parse_key_set(document: Value) -> Result<JwkSet, JwksError> {
    let Some(Value::Array(raw_keys)) = document.get("keys") else {
        return Err(JwksError::Parse("missing 'keys' array".into()));
    };

    let keys: Vec<Jwk> = raw_keys
        .iter()
        .filter_map(|raw| match serde_json::from_value::<Jwk>(raw.clone()) {
            Ok(jwk) => Some(jwk),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unparseable jwk");
                None
            }
        })
        .filter(is_signing_key)
        .collect();

    if keys.is_empty() {
        return Err(JwksError::Empty);
    }

    Ok(JwkSet { keys })
}

fn is_signing_key(jwk: &Jwk) -> bool {
    matches!(
        jwk.common.public_key_use,
        None | Some(PublicKeyUse::Signature)
    )
}

#[derive(Clone)]
struct CachedKeys {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

pub struct JwksCache {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    min_refresh: Duration,
    current: RwLock<Option<CachedKeys>>,
    refresh: Mutex<()>,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache")
            .field("source", &self.source.describe())
            .field("ttl", &self.ttl)
            .field("min_refresh", &self.min_refresh)
            .finish()
    }
}

impl JwksCache {
    pub fn new(source: Arc<dyn KeySource>, ttl: Duration, min_refresh: Duration) -> Self {
        Self {
            source,
            ttl,
            min_refresh,
            current: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Current key set, fetching it if the cached one is missing or expired.
    pub async fn key_set(&self) -> Result<Arc<JwkSet>, JwksError> {
        if let Some(keys) = self.fresh().await {
            return Ok(keys);
        }

        let _guard = self.refresh.lock().await;
        // Another task may have refreshed while we waited.
        if let Some(keys) = self.fresh().await {
            return Ok(keys);
        }
        self.fetch_and_store().await
    }

    /// Find the signing key for `kid`, refreshing once if `kid` is not in the cached set.
    pub async fn find(&self, kid: &str) -> Result<Option<Jwk>, JwksError> {
        let keys = self.key_set().await?;
        if let Some(jwk) = keys.find(kid) {
            return Ok(Some(jwk.clone()));
        }

        match self.refresh_stale(&keys).await? {
            Some(fresh) => Ok(fresh.find(kid).cloned()),
            None => Ok(None),
        }
    }

    async fn fresh(&self) -> Option<Arc<JwkSet>> {
        if self.ttl.is_zero() {
            return None;
        }
        let current = self.current.read().await;
        current
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.ttl)
            .map(|c| c.keys.clone())
    }

    /// Forced refresh after a `kid` miss against `seen`.
    ///
    /// Returns `None` when the set was refreshed too recently to try again.
    async fn refresh_stale(&self, seen: &Arc<JwkSet>) -> Result<Option<Arc<JwkSet>>, JwksError> {
        let _guard = self.refresh.lock().await;

        let current = self.current.read().await.clone();
        if let Some(current) = current {
            if !Arc::ptr_eq(&current.keys, seen) {
                return Ok(Some(current.keys));
            }
            if current.fetched_at.elapsed() < self.min_refresh {
                tracing::debug!("unknown kid but jwks was refreshed recently; not refetching");
                return Ok(None);
            }
        }

        self.fetch_and_store().await.map(Some)
    }

    async fn fetch_and_store(&self) -> Result<Arc<JwkSet>, JwksError> {
        let keys = Arc::new(self.source.fetch().await?);
        tracing::info!(
            source = %self.source.describe(),
            keys = keys.keys.len(),
            "refreshed jwks"
        );

        *self.current.write().await = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }
}
