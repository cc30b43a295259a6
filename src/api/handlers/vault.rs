/*
 * Responsibility
 * - GET/HEAD /vault?secret=<name> (requires GetSecret role)
 * - secret retrieval itself is not wired to a key vault yet; answers with a placeholder
 */
use axum::{extract::Query, http::StatusCode, response::IntoResponse};

use crate::api::dto::vault::SecretQuery;
use crate::api::extractors::IdentityExtractor;
use crate::error::{ApiError, MessageBody};

pub async fn get_secret(
    IdentityExtractor(identity): IdentityExtractor,
    Query(query): Query<SecretQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let secret = query
        .secret
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest(
                "Secret name is missing. Please use QP secret=<secret_name>".to_string(),
            )
        })?;

    tracing::info!(
        caller = identity.display_name(),
        roles = ?identity.roles,
        secret = %secret,
        "secret requested"
    );

    Ok((
        StatusCode::OK,
        MessageBody::new(format!(
            "Vault Integration is currently not implemented to get value for {secret}"
        )),
    ))
}
