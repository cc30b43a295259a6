/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::AuthService;
use crate::services::auth::access_jwt::TokenVerifier;
use crate::services::auth::jwks::{JwksCache, JwksError, RemoteJwks};

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, JwksError> {
    let remote = RemoteJwks::new(config.auth_jwks_url.clone(), config.jwks_fetch_timeout)?;
    let jwks = JwksCache::new(
        Arc::new(remote),
        config.jwks_cache_ttl,
        config.jwks_min_refresh,
    );

    let verifier = TokenVerifier::new(
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
    );

    Ok(Arc::new(AuthService::new(
        jwks,
        verifier,
        Arc::new(config.path_scope.clone()),
    )))
}
