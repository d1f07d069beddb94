//! Blog post API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{ApiResult, MessageResponse};
use crate::errors::AppError;
use crate::models::{BlogPost, CreatePostRequest, UpdatePostRequest};
use crate::AppState;

/// GET /api/blogs - List all posts, newest first.
pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Vec<BlogPost>> {
    let posts = state.repo.list_posts().await?;
    Ok(Json(posts))
}

/// POST /api/blogs - Create a new post.
pub async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<BlogPost>), AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }

    let post = state.repo.create_post(&request).await?;
    tracing::info!("Created post {}", post.id);

    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/blogs/:id - Update a post. Supplied keys overwrite prior values.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePostRequest>,
) -> ApiResult<BlogPost> {
    let post = state.repo.update_post(&id, &request).await?;
    Ok(Json(post))
}

/// DELETE /api/blogs/:id - Delete a post.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    state.repo.delete_post(&id).await?;
    tracing::info!("Deleted post {}", id);
    Ok(Json(MessageResponse::new("Post deleted")))
}
