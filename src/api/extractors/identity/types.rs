/*
 * Responsibility
 * - the "verified caller" type handlers see
 * - the access middleware builds it and stores it in request extensions
 *
 * Notes
 * - token verification lives in services::auth; this is only the contract
 */
use crate::services::auth::VerifiedClaims;

/// Caller of an authorized request.
///
/// - `subject` is the token `oid` (falls back to `sub`)
/// - `roles` is never empty
/// - `expires_at` is the token `exp` (unix seconds)
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: Option<String>,
    pub app_id: Option<String>,
    pub roles: Vec<String>,
    pub expires_at: i64,
}

impl Identity {
    pub fn display_name(&self) -> &str {
        self.subject
            .as_deref()
            .or(self.app_id.as_deref())
            .unwrap_or("-")
    }
}

impl From<&VerifiedClaims> for Identity {
    fn from(claims: &VerifiedClaims) -> Self {
        Self {
            subject: claims.subject.clone(),
            app_id: claims.app_id.clone(),
            roles: claims.roles.clone(),
            expires_at: claims.claims.exp,
        }
    }
}
