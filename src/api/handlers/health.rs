/*
 * Responsibility
 * - GET/HEAD /health (no auth)
 * - reports whether the outbound probe target is reachable
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::error::MessageBody;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("checking health of the function");

    match state.health.check().await {
        Ok(status) if status == StatusCode::OK => {
            (StatusCode::OK, MessageBody::new("Health Check Ok"))
        }
        Ok(status) => {
            tracing::warn!(%status, "health probe target returned non-200");
            (status, MessageBody::new("Health Check Failed"))
        }
        Err(err) => {
            tracing::error!(error = %err, "health probe failed");
            (StatusCode::INTERNAL_SERVER_ERROR, MessageBody::new(err.to_string()))
        }
    }
}
