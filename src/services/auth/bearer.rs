//! `Authorization: Bearer <token>` header parsing.

use axum::http::{HeaderMap, header};

use super::error::AuthError;

/// Pull the raw bearer token out of the request headers.
///
/// The scheme check runs before the segment count, so `Basic a b` reports a
/// scheme problem rather than a malformed header.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::HeaderMissing)?;

    let auth = value.to_str().map_err(|_| AuthError::HeaderFormat)?;

    let mut parts = auth.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::HeaderMissing)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::HeaderFormatBearer);
    }

    let token = parts.next().ok_or(AuthError::TokenNotFound)?;
    if parts.next().is_some() {
        return Err(AuthError::HeaderFormat);
    }

    Ok(token)
}
