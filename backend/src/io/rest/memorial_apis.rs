//! # REST API for the public memorial pages
//!
//! Listing with search, animal filter and sort, lookup by memorial code and
//! the health check. None of these require a session.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use shared::{HealthResponse, MemorialDetail, MemorialListQuery, MemorialListResponse};
use tracing::{info, warn};

use super::errors::error_response;
use super::mappers::MemorialMapper;
use crate::domain::errors::MemorialError;
use crate::domain::memorial_list::ListCriteria;
use crate::AppState;

/// Create the public memorial API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_memorials))
        .route("/code/:code", get(get_memorial_by_code))
}

/// List memorials for the public page
pub async fn list_memorials(
    State(state): State<AppState>,
    query: Result<Query<MemorialListQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!("GET /api/memorials - invalid query: {}", rejection);
            return error_response(StatusCode::BAD_REQUEST, "INVALID_QUERY", rejection.body_text());
        }
    };
    info!("GET /api/memorials - query: {:?}", query);

    let sort = match query.sort_order() {
        Ok(sort) => sort,
        Err(e) => {
            warn!("GET /api/memorials - invalid query: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "INVALID_QUERY", e.to_string());
        }
    };
    let criteria = ListCriteria::new(query.search.as_deref(), query.animal.as_deref(), sort);
    match state.memorial_service.list_public().await {
        Ok(records) => {
            let memorials = state.list_view.cards(&records, &criteria);
            Json(MemorialListResponse {
                total: memorials.len(),
                memorials,
                sort: criteria.sort,
            })
            .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get the public page of a memorial by its code
pub async fn get_memorial_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<MemorialDetail>, MemorialError> {
    info!("GET /api/memorials/code/{}", code);

    let record = state
        .memorial_service
        .get_by_code(&code)
        .await?
        .ok_or_else(|| MemorialError::NotFound(code.clone()))?;

    Ok(Json(MemorialMapper::to_detail_dto(record, state.list_view.formatter())))
}

/// Liveness plus whether a store is configured
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store_available: state.memorial_service.is_available(),
    })
}
