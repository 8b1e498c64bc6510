//! Identification endpoint
//!
//! POST /api/identify runs one detection and always answers 200 with a
//! `DetectionResult`; failures surface as sentinel names.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use naturelens_common::{DetectionResult, Outcome};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState};

const SERVICE_FAILURE_MESSAGE: &str = "Identification failed. Please try again.";

/// Identification request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyRequest {
    /// Local image reference (path or file:// URI)
    #[serde(default)]
    pub image_uri: String,
    /// "flora", "fauna" or "landmark"
    #[serde(default)]
    pub domain: String,
}

/// POST /api/identify
///
/// Missing fields are forwarded as empty strings so they resolve to the
/// usual "Error" result; only a body that is not JSON at all is rejected.
pub async fn identify(
    State(state): State<AppState>,
    payload: Result<Json<IdentifyRequest>, JsonRejection>,
) -> ApiResult<Json<DetectionResult>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let request_id = Uuid::new_v4();
    let span = info_span!("identify", %request_id, domain = %request.domain);
    let orchestrator = Arc::clone(&state.orchestrator);
    let image_uri = request.image_uri.clone();

    // A panicking provider must still produce a result
    let task = tokio::spawn(
        async move {
            orchestrator
                .detect_object(&request.image_uri, &request.domain)
                .await
        }
        .instrument(span),
    );

    let result = match task.await {
        Ok(result) => result,
        Err(e) => {
            error!(%request_id, error = %e, "Identification task failed");
            Outcome::upstream("naturelens-id", e.to_string(), SERVICE_FAILURE_MESSAGE)
                .into_result(Some(image_uri.as_str()))
        }
    };

    Ok(Json(result))
}

/// Build identification routes
pub fn identify_routes() -> Router<AppState> {
    Router::new().route("/api/identify", post(identify))
}
