use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::services::auth::AuthError;
use crate::state::AppState;

use super::Identity;

/// Extracts the `Identity` inserted by the access middleware.
/// Missing means the route was not wrapped by the middleware; that is reported as
/// a missing header so nothing leaks through unauthenticated.
pub struct IdentityExtractor(pub Identity);

impl FromRequestParts<AppState> for IdentityExtractor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(IdentityExtractor)
            .ok_or(ApiError::Auth(AuthError::HeaderMissing))
    }
}
