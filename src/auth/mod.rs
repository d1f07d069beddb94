//! Authentication module.
//!
//! Password verification against the canonical admin credential, session
//! issuance, and the bearer-token middleware gating privileged routes.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use bcrypt::DEFAULT_COST;

use crate::db::Repository;
use crate::errors::{AppError, ErrorResponse};
use crate::models::Session;

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, DEFAULT_COST)?)
}

/// Verify a candidate password against a stored hash.
///
/// bcrypt verification is constant-time-safe with respect to the hash
/// comparison.
pub fn verify_password(candidate: &str, hash: &str) -> Result<bool, AppError> {
    Ok(bcrypt::verify(candidate, hash)?)
}

/// Validate a submitted credential pair. Fails closed: empty inputs are
/// rejected without a lookup, and an unknown identifier fails the same way as
/// a wrong password.
pub async fn authenticate(
    repo: &Repository,
    identifier: &str,
    candidate: &str,
) -> Result<bool, AppError> {
    if identifier.trim().is_empty() || candidate.is_empty() {
        return Ok(false);
    }

    let Some(admin) = repo.find_admin(identifier).await? else {
        return Ok(false);
    };

    verify_password(candidate, &admin.password_hash)
}

/// Authenticate and issue a session token.
pub async fn login(
    repo: &Repository,
    identifier: &str,
    candidate: &str,
    ttl_secs: i64,
) -> Result<Option<Session>, AppError> {
    if !authenticate(repo, identifier, candidate).await? {
        tracing::warn!("Failed login attempt for {}", identifier);
        return Ok(None);
    }

    let session = repo.create_session(ttl_secs).await?;
    tracing::info!("Admin {} logged in", identifier);
    Ok(Some(session))
}

/// Session middleware for privileged routes.
///
/// Requires a `Authorization: Bearer <token>` header holding a live session.
pub async fn session_auth_layer(repo: Arc<Repository>, request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    let Some(token) = token else {
        return unauthorized_response("Missing session token");
    };

    match repo.find_valid_session(&token).await {
        Ok(Some(_)) => next.run(request).await,
        Ok(None) => {
            // Expired tokens are swept opportunistically on rejection.
            if let Err(e) = repo.purge_expired_sessions().await {
                tracing::warn!("Failed to purge expired sessions: {}", e);
            }
            unauthorized_response("Invalid or expired session token")
        }
        Err(e) => e.into_response(),
    }
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse::new(&AppError::Unauthorized(message.to_string()));
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("UniUnity2025!").unwrap();
        assert!(verify_password("UniUnity2025!", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-input").unwrap();
        let b = hash_password("same-input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }
}
