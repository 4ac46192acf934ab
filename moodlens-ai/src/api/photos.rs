//! Photo analysis API handlers
//!
//! POST /api/photos/analyze, GET /api/photos/getAnalyzedPhotos

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use moodlens_common::PhotoRecord;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    models::GroupedPhotos,
    services::group_photos,
    AppState,
};

/// POST /api/photos/analyze request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// POST /api/photos/analyze response
///
/// Only photos analyzed by this call; skipped and failed photos are not reported.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub photos: Vec<PhotoRecord>,
}

/// GET /api/photos/getAnalyzedPhotos query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedPhotosQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/photos/analyze
///
/// Lists the user's album photos and analyzes every photo not seen before.
/// A body that is missing or not the expected JSON counts as missing fields.
pub async fn analyze_photos(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Unusable analyze request body");
            AnalyzeRequest::default()
        }
    };

    let (access_token, user_id) = match (non_blank(request.access_token), non_blank(request.user_id)) {
        (Some(access_token), Some(user_id)) => (access_token, user_id),
        _ => {
            return Err(ApiError::InvalidInput(
                "Access token and user ID are required".to_string(),
            ))
        }
    };

    let photos = match state.album_source.list_photo_refs(&access_token).await {
        Ok(photos) => photos,
        Err(e) => {
            let message = format!("Failed to list album photos: {}", e);
            state.record_error(message.clone()).await;
            return Err(ApiError::Upstream(message));
        }
    };
    state.clear_error().await;

    let report = state.pipeline.analyze_batch(&user_id, photos).await;

    Ok(Json(AnalyzeResponse {
        photos: report.records,
    }))
}

/// GET /api/photos/getAnalyzedPhotos?userId=...
///
/// Every stored record of the user, grouped by dominant emotion and by theme.
pub async fn get_analyzed_photos(
    State(state): State<AppState>,
    Query(query): Query<AnalyzedPhotosQuery>,
) -> ApiResult<Json<GroupedPhotos>> {
    let user_id = non_blank(query.user_id)
        .ok_or_else(|| ApiError::InvalidInput("User ID is required".to_string()))?;

    let records = crate::db::photos::load_photos_for_user(&state.db, &user_id).await?;
    let grouped = group_photos(&records);

    tracing::debug!(
        user_id = %user_id,
        photo_count = records.len(),
        themes = grouped.thematic_groups.len(),
        "Grouped analyzed photos"
    );

    Ok(Json(grouped))
}

/// Build photo routes
pub fn photo_routes() -> Router<AppState> {
    Router::new()
        .route("/api/photos/analyze", post(analyze_photos))
        .route("/api/photos/getAnalyzedPhotos", get(get_analyzed_photos))
}
