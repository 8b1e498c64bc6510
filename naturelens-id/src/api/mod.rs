//! HTTP API handlers for naturelens-id

pub mod health;
pub mod identify;

pub use health::health_routes;
pub use identify::identify_routes;

use axum::http::Uri;

use crate::ApiError;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
