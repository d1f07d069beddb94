//! Site configuration endpoints.

use axum::{extract::State, Json};

use super::ApiResult;
use crate::auth;
use crate::errors::AppError;
use crate::models::{SiteConfig, UpdateConfigRequest};
use crate::AppState;

/// GET /api/config - The site configuration, or the defaults when none has
/// been written yet.
pub async fn get_config(State(state): State<AppState>) -> ApiResult<SiteConfig> {
    let config = state.repo.get_config().await?;
    Ok(Json(config))
}

/// POST /api/config - Merge the supplied fields into the config singleton.
///
/// A new admin password is accepted only with proof of the current one while a
/// credential exists; the first-time set on an empty store needs none. The
/// hash and the config fields commit atomically.
pub async fn update_config(
    State(state): State<AppState>,
    Json(request): Json<UpdateConfigRequest>,
) -> ApiResult<SiteConfig> {
    let new_password_hash = match &request.admin_password {
        Some(new_password) => {
            if new_password.trim().is_empty() {
                return Err(AppError::Validation(
                    "New admin password must not be empty".to_string(),
                ));
            }

            if let Some(admin) = state.repo.get_admin().await? {
                let current = request.current_password.as_deref().ok_or_else(|| {
                    AppError::Unauthorized(
                        "Current password is required to change the admin password".to_string(),
                    )
                })?;

                if !auth::verify_password(current, &admin.password_hash)? {
                    tracing::warn!("Rejected password rotation: wrong current password");
                    return Err(AppError::Unauthorized(
                        "Current password is incorrect".to_string(),
                    ));
                }
            }

            Some(auth::hash_password(new_password)?)
        }
        None => None,
    };

    let config = state
        .repo
        .update_config(&request, new_password_hash.as_deref())
        .await?;

    if new_password_hash.is_some() {
        tracing::info!("Admin password rotated");
    }

    Ok(Json(config))
}
