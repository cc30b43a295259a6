/*
 * Responsibility
 * - URL layout: public /health, protected /vault
 * - the access middleware is applied to the protected group only (route_layer)
 */
use axum::{Router, routing::get};

use crate::api::handlers::{fallback::method_not_allowed, health::health, vault::get_secret};
use crate::middleware;
use crate::state::AppState;

/// Paths behind the access middleware. Each needs a PATH_SCOPE entry.
pub const PROTECTED_PATHS: &[&str] = &["/vault"];

pub fn routes(state: AppState) -> Router<AppState> {
    // `get` also answers HEAD.
    let public = Router::new().route("/health", get(health));

    let protected = Router::new().route("/vault", get(get_secret));
    let protected = middleware::auth::access::apply(protected, state);

    public
        .merge(protected)
        .method_not_allowed_fallback(method_not_allowed)
}
