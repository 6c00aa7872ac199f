use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::{NewRecommendation, Recommendation, RecommendationFilter};

use super::AppState;

/// Root URL response describing the service
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": "Recommendations Service",
        "version": "1.0",
        "description": "This microservice manages product-to-product recommendations \
            for the eCommerce platform. It supports Create, Read, Update, Delete, \
            and List operations for recommendation relationships.",
        "endpoints": {
            "list": "/recommendations",
            "create": "/recommendations",
            "read": "/recommendations/:id",
            "update": "/recommendations/:id",
            "delete": "/recommendations/:id",
            "like": "/recommendations/:id/like",
            "dislike": "/recommendations/:id/like",
            "cancel": "/recommendations/:id/cancel",
        },
        "status": "OK",
    }))
}

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Raw query parameters for listing recommendations.
///
/// Values are kept as strings so an unparseable filter can be ignored with a
/// warning instead of rejecting the whole request. Unrecognized keys are
/// dropped by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub base_product_id: Option<String>,
    pub recommendation_type: Option<String>,
    pub status: Option<String>,
}

impl ListParams {
    fn into_filter(self) -> RecommendationFilter {
        let mut filter = RecommendationFilter::default();

        if let Some(raw) = self.base_product_id {
            match raw.parse() {
                Ok(id) => filter.base_product_id = Some(id),
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring non-integer base_product_id filter")
                }
            }
        }
        if let Some(raw) = self.recommendation_type {
            match raw.parse() {
                Ok(t) => filter.recommendation_type = Some(t),
                Err(()) => {
                    tracing::warn!(value = %raw, "ignoring unknown recommendation_type filter")
                }
            }
        }
        if let Some(raw) = self.status {
            match raw.parse() {
                Ok(s) => filter.status = Some(s),
                Err(()) => tracing::warn!(value = %raw, "ignoring unknown status filter"),
            }
        }
        filter
    }
}

/// List recommendations, optionally filtered by base product, type, or status
pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let filter = params.into_filter();
    let found = state.store.list(&filter).await?;
    tracing::info!(count = found.len(), "listed recommendations");
    Ok(Json(found))
}

/// Create a new recommendation
pub async fn create_recommendation(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let candidate = NewRecommendation::from_value(&body)?;
    candidate.validate()?;

    let record = state.store.create(candidate).await?;
    tracing::info!(id = record.id, "created recommendation");

    let location = format!("/recommendations/{}", record.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(record),
    ))
}

/// Retrieve a single recommendation by id
pub async fn get_recommendation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Recommendation>> {
    let record = state.store.get(id).await?;
    Ok(Json(record))
}

/// Replace every field of an existing recommendation
pub async fn update_recommendation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> AppResult<Json<Recommendation>> {
    let candidate = NewRecommendation::from_value(&body)?;
    candidate.validate()?;

    let record = state.store.update(id, candidate).await?;
    tracing::info!(id, "updated recommendation");
    Ok(Json(record))
}

/// Hard-delete a recommendation. Deleting an absent id is a no-op.
pub async fn delete_recommendation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let existed = state.store.delete(id).await?;
    tracing::info!(id, existed, "deleted recommendation");
    Ok(StatusCode::NO_CONTENT)
}

/// Add one like to a recommendation
pub async fn like_recommendation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Recommendation>> {
    let record = state.store.like(id).await?;
    tracing::info!(id, likes = record.likes, "liked recommendation");
    Ok(Json(record))
}

/// Remove one like from a recommendation; the counter floors at zero
pub async fn dislike_recommendation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Recommendation>> {
    let record = state.store.dislike(id).await?;
    tracing::info!(id, likes = record.likes, "disliked recommendation");
    Ok(Json(record))
}

/// Take a recommendation out of rotation by marking it inactive
pub async fn cancel_recommendation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Recommendation>> {
    let record = state.store.cancel(id).await?;
    tracing::info!(id, "cancelled recommendation");
    Ok(Json(record))
}
