//! REST API module.
//!
//! Contains all API routes and handlers following the admin console contract.
//! Success responses carry the resource directly; errors use the envelope from
//! `crate::errors`.

mod auth;
mod notify;
mod posts;
mod site;

pub use auth::*;
pub use notify::*;
pub use posts::*;
pub use site::*;

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Result type for handlers returning a plain JSON body.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Acknowledgement body for operations without a resource payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
