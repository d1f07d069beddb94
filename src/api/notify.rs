//! Push notification endpoint.
//!
//! Delivery is an external collaborator; this endpoint validates and
//! acknowledges only.

use axum::{extract::State, Json};
use serde::Deserialize;

use super::{ApiResult, MessageResponse};
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// POST /api/send-notification - Accept a notification message.
pub async fn send_notification(
    State(_state): State<AppState>,
    Json(request): Json<NotificationRequest>,
) -> ApiResult<MessageResponse> {
    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::Validation("Message is required".to_string()))?;

    tracing::info!("Notification accepted: {}", message);

    Ok(Json(MessageResponse::new("Notification queued")))
}
