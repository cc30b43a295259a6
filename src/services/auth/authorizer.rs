//! Bearer-token authorization pipeline.
//!
//! header → token → signing key → verified claims → path scope.
//! Each step returns `Result`, the first failure ends the pipeline.

use std::sync::Arc;

use axum::http::HeaderMap;
use jsonwebtoken::DecodingKey;

use super::access_jwt::{TokenVerifier, VerifiedClaims};
use super::bearer::extract_token;
use super::error::AuthError;
use super::jwks::JwksCache;
use super::path_scope::PathScopeTable;

#[derive(Debug)]
pub struct AuthService {
    jwks: JwksCache,
    verifier: TokenVerifier,
    path_scope: Arc<PathScopeTable>,
}

impl AuthService {
    pub fn new(jwks: JwksCache, verifier: TokenVerifier, path_scope: Arc<PathScopeTable>) -> Self {
        Self {
            jwks,
            verifier,
            path_scope,
        }
    }

    pub fn path_scope(&self) -> &PathScopeTable {
        &self.path_scope
    }

    /// Run the whole pipeline for a request to `path`.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        path: &str,
    ) -> Result<VerifiedClaims, AuthError> {
        let token = extract_token(headers).inspect_err(|err| {
            tracing::warn!(error = %err, "authorization header rejected");
        })?;

        let key = self.resolve_signing_key(token).await?;
        let claims = self.verifier.verify(token, &key)?;
        self.check_path_scope(&claims, path)?;

        Ok(claims)
    }

    /// Pick the verification key for `token`.
    ///
    /// The header is untrusted until its `kid` is found in the published key set,
    /// so the key always comes from the set, never from the token.
    pub async fn resolve_signing_key(&self, token: &str) -> Result<DecodingKey, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(|err| {
            tracing::warn!(error = %err, "failed to parse token header");
            AuthError::InvalidHeader
        })?;

        let kid = header.kid.ok_or_else(|| {
            tracing::warn!("token header has no kid");
            AuthError::InvalidHeader
        })?;

        let jwk = self
            .jwks
            .find(&kid)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "failed to load signing keys");
                AuthError::InvalidHeader
            })?
            .ok_or_else(|| {
                tracing::warn!(kid = %kid, "no published signing key matches kid");
                AuthError::KeyNotFound
            })?;

        DecodingKey::from_jwk(&jwk).map_err(|err| {
            tracing::warn!(error = %err, kid = %kid, "published key is unusable");
            AuthError::InvalidHeader
        })
    }

    /// An unmapped path fails closed; startup validation should make that unreachable.
    pub fn check_path_scope(&self, claims: &VerifiedClaims, path: &str) -> Result<(), AuthError> {
        match self.path_scope.check(&claims.roles, path) {
            Some(true) => Ok(()),
            Some(false) => {
                tracing::warn!(path, roles = ?claims.roles, "access token missing required role");
                Err(AuthError::MissingPathRole {
                    path: path.to_string(),
                })
            }
            None => {
                tracing::error!(path, "no path scope configured for protected path");
                Err(AuthError::MissingPathRole {
                    path: path.to_string(),
                })
            }
        }
    }
}
