use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Access token (JWT) claims.
///
/// NOTE:
/// - `aud` can be a string or an array; `Validation::set_audience` checks either form.
/// - `roles` is optional at the serde level so a missing claim can be reported as
///   `MissingRole` instead of a generic decode failure.
/// - `iss` / `exp` default for the same reason: their presence is enforced by
///   `Validation::set_required_spec_claims`, which reports `MissingRequiredClaim`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub aud: serde_json::Value,
    #[serde(default)]
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub nbf: Option<i64>,

    #[serde(default)]
    pub sub: Option<String>,
    // Entra ID object id of the caller (user or service principal).
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub appid: Option<String>,

    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

/// Claims that passed every check, roles guaranteed non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedClaims {
    pub subject: Option<String>,
    pub app_id: Option<String>,
    pub roles: Vec<String>,
    pub claims: TokenClaims,
}

/// RS256 access-token verifier.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    validation: Validation,
    leeway_seconds: u64,
}

impl TokenVerifier {
    pub fn new(issuer: &str, audience: &str, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = leeway_seconds;

        Self {
            validation,
            leeway_seconds,
        }
    }

    /// Verify signature, issuer, audience and time claims, then require roles.
    ///
    /// `jsonwebtoken` has no `iat` check, so a token issued in the future (beyond
    /// the leeway) is rejected here.
    pub fn verify(&self, token: &str, key: &DecodingKey) -> Result<VerifiedClaims, AuthError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, key, &self.validation)
            .map_err(classify)?;
        let claims = data.claims;

        if let Some(iat) = claims.iat {
            let now = chrono::Utc::now().timestamp();
            if iat > now + self.leeway_seconds as i64 {
                tracing::warn!(iat, now, "access token issued in the future");
                return Err(AuthError::InvalidClaims(
                    "The token is not yet valid (iat)".into(),
                ));
            }
        }

        let roles = match claims.roles.as_deref() {
            Some(roles) if !roles.is_empty() => roles.to_vec(),
            _ => {
                tracing::warn!("access token missing roles");
                return Err(AuthError::MissingRole);
            }
        };

        Ok(VerifiedClaims {
            subject: claims.oid.clone().or_else(|| claims.sub.clone()),
            app_id: claims.appid.clone(),
            roles,
            claims,
        })
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => {
            tracing::warn!("access token has expired");
            AuthError::TokenExpired
        }
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => {
            tracing::warn!(error = %err, "access token has invalid claims");
            AuthError::InvalidClaims(err.to_string())
        }
        _ => {
            tracing::warn!(error = %err, "access token could not be decoded");
            AuthError::InvalidHeader
        }
    }
}
