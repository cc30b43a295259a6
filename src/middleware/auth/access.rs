//! Bearer access token verification → `Identity` in request extensions.
//!
//! The whole pipeline (header, JWKS key, claims, path scope) runs in
//! `AuthService::authorize`; this layer only wires it into axum and turns the
//! outcome into either the next handler's response or an auth error body.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::Identity;
use crate::error::ApiError;
use crate::state::AppState;

/// Put the access middleware in front of every route of `router`.
///
/// `route_layer` so unknown paths still fall through to the 404 handler.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 from_fn cannot take the State extractor; pass state explicitly.
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // Inside a nested router the uri is already relative to the prefix,
    // which is what the path-scope table is keyed on.
    let path = req.uri().path().to_string();

    let claims = state.auth.authorize(req.headers(), &path).await?;
    let identity = Identity::from(&claims);

    tracing::debug!(
        caller = identity.display_name(),
        path = %path,
        expires_at = identity.expires_at,
        "request authorized"
    );

    // middleware → extractor
    req.extensions_mut().insert(identity.clone());

    let mut response = next.run(req).await;
    // Access log reads the caller from here.
    response.extensions_mut().insert(identity);
    Ok(response)
}
