//! Authentication endpoints.

use axum::{
    extract::{Request, State},
    http::header,
    Json,
};

use super::{ApiResult, MessageResponse};
use crate::auth;
use crate::errors::AppError;
use crate::models::{LoginRequest, LoginResponse};
use crate::AppState;

/// POST /api/auth - Validate admin credentials and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let session = auth::login(
        &state.repo,
        &request.username,
        &request.password,
        state.config.session_ttl_secs,
    )
    .await?
    .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

    Ok(Json(LoginResponse {
        success: true,
        token: session.token,
        expires_at: session.expires_at,
    }))
}

/// POST /api/auth/logout - Revoke the presented session.
pub async fn logout(State(state): State<AppState>, request: Request) -> ApiResult<MessageResponse> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing session token".to_string()))?;

    state.repo.delete_session(token).await?;

    Ok(Json(MessageResponse::new("Logged out")))
}
