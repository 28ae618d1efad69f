//! # REST API for memorial administration
//!
//! Create, edit and delete memorials. Every handler runs behind the session
//! guard and addresses the scope of the signed-in admin.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use shared::{
    AdminMemorialListResponse, CreateMemorialRequest, CreateMemorialResponse, Memorial,
    MemorialResponse, UpdateMemorialRequest,
};
use tracing::{error, info};

use super::errors::error_response;
use super::mappers::MemorialMapper;
use crate::domain::auth_service::Principal;
use crate::domain::errors::MemorialError;
use crate::AppState;

/// Create the admin API router; the caller applies the session guard
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/memorials", get(list_memorials).post(create_memorial))
        .route(
            "/admin/memorials/:id",
            get(get_memorial).put(update_memorial).delete(delete_memorial),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

fn invalid_body(rejection: JsonRejection) -> Response {
    error!("Rejected request body: {}", rejection);
    error_response(StatusCode::BAD_REQUEST, "INVALID_BODY", rejection.body_text())
}

/// List the admin's memorials, highest code first
pub async fn list_memorials(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<AdminMemorialListResponse>, MemorialError> {
    info!("GET /api/admin/memorials - {}", principal.email);

    let scope = state.memorial_service.scope_for(&principal.uid);
    let records = state.memorial_service.list_for_dashboard(&scope).await?;
    Ok(Json(MemorialMapper::to_admin_list_dto(records, state.list_view.formatter())))
}

/// Create a new memorial
pub async fn create_memorial(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<CreateMemorialRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateMemorialResponse>), Response> {
    let Json(request) = body.map_err(invalid_body)?;
    info!("POST /api/admin/memorials - code: {}", request.memorial_code);

    let scope = state.memorial_service.scope_for(&principal.uid);
    let id = state
        .memorial_service
        .create(&scope, request)
        .await
        .map_err(IntoResponse::into_response)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateMemorialResponse {
            id,
            success_message: "Memorial created successfully".to_string(),
        }),
    ))
}

/// Get one of the admin's memorials for editing
pub async fn get_memorial(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Memorial>, MemorialError> {
    info!("GET /api/admin/memorials/{}", id);

    let scope = state.memorial_service.scope_for(&principal.uid);
    let record = state
        .memorial_service
        .get_by_id(&scope, &id)
        .await?
        .ok_or(MemorialError::NotFound(id))?;

    Ok(Json(MemorialMapper::to_dto(record, state.list_view.formatter())))
}

/// Merge an update into a memorial
pub async fn update_memorial(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<UpdateMemorialRequest>, JsonRejection>,
) -> Result<Json<MemorialResponse>, Response> {
    let Json(request) = body.map_err(invalid_body)?;
    info!("PUT /api/admin/memorials/{}", id);

    let scope = state.memorial_service.scope_for(&principal.uid);
    let record = state
        .memorial_service
        .update(&scope, &id, request)
        .await
        .map_err(IntoResponse::into_response)?;

    Ok(Json(MemorialMapper::to_memorial_response_dto(
        record,
        state.list_view.formatter(),
        "Memorial updated successfully",
    )))
}

/// Permanently delete a memorial; requires `?confirm=true`
pub async fn delete_memorial(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    params: Option<Query<DeleteParams>>,
) -> Result<StatusCode, MemorialError> {
    info!("DELETE /api/admin/memorials/{}", id);

    let confirmed = params.map(|Query(params)| params.confirm).unwrap_or(false);
    if !confirmed {
        return Err(MemorialError::ConfirmationRequired);
    }

    let scope = state.memorial_service.scope_for(&principal.uid);
    state.memorial_service.delete(&scope, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{
        login, read_json, seed, TestApp, ADMIN_A_EMAIL, ADMIN_A_UID, ADMIN_B_EMAIL,
    };
    use crate::domain::models::{OwnershipScheme, Scope};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use shared::{
        AdminMemorialListResponse, CreateMemorialResponse, ErrorResponse, Memorial, MemorialDetail,
        MemorialResponse,
    };
    use tower::util::ServiceExt; // for `oneshot`

    fn authed(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let app = TestApp::new(OwnershipScheme::Flat);
        let token = login(&app, ADMIN_A_EMAIL).await;

        let body = json!({
            "memorialCode": "12",
            "name": "  Bolinha ",
            "animalType": "Gato",
            "sex": "Fêmea",
            "cremationDate": "2024-02-10",
            "images": [{"kind": "upload", "contentType": "image/png", "data": "aGVsbG8="}]
        });
        let response = app
            .router()
            .oneshot(authed(Method::POST, "/api/admin/memorials", &token, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: CreateMemorialResponse = read_json(response).await;

        let uri = format!("/api/admin/memorials/{}", created.id);
        let response = app
            .router()
            .oneshot(authed(Method::GET, &uri, &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let memorial: Memorial = read_json(response).await;
        assert_eq!(memorial.memorial_code, "#12");
        assert_eq!(memorial.name.as_deref(), Some("Bolinha"));
        assert_eq!(memorial.cremation_date.as_deref(), Some("2024-02-10"));
        assert_eq!(memorial.image_urls, vec!["data:image/png;base64,aGVsbG8="]);
    }

    #[tokio::test]
    async fn test_create_validation_failure_is_422() {
        let app = TestApp::new(OwnershipScheme::Flat);
        let token = login(&app, ADMIN_A_EMAIL).await;

        let body = json!({ "memorialCode": "", "birthDate": "31/12/2020" });
        let response = app
            .router()
            .oneshot(authed(Method::POST, "/api/admin/memorials", &token, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let error: ErrorResponse = read_json(response).await;
        assert_eq!(error.code, "VALIDATION_FAILED");
        let fields: Vec<_> = error.fields.unwrap().into_iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["memorialCode", "birthDate"]);
        assert!(app.state.memorial_service.list(&Scope::Global).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let app = TestApp::new(OwnershipScheme::Flat);
        let token = login(&app, ADMIN_A_EMAIL).await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/admin/memorials")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = read_json(response).await;
        assert_eq!(error.code, "INVALID_BODY");
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let app = TestApp::new(OwnershipScheme::Flat);
        let token = login(&app, ADMIN_A_EMAIL).await;
        let id = seed(&app, "Rex", "10", "Cão", "2024-01-05").await;

        let uri = format!("/api/admin/memorials/{}", id);
        let body = json!({ "breed": "Labrador", "cremationDate": "" });
        let response = app
            .router()
            .oneshot(authed(Method::PUT, &uri, &token, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let updated: MemorialResponse = read_json(response).await;
        assert_eq!(updated.memorial.breed.as_deref(), Some("Labrador"));
        assert_eq!(updated.memorial.name.as_deref(), Some("Rex"));
        assert_eq!(updated.memorial.cremation_date, None);
    }

    #[tokio::test]
    async fn test_update_missing_memorial_is_404() {
        let app = TestApp::new(OwnershipScheme::Flat);
        let token = login(&app, ADMIN_A_EMAIL).await;

        let response = app
            .router()
            .oneshot(authed(
                Method::PUT,
                "/api/admin/memorials/missing",
                &token,
                Some(json!({ "name": "Rex" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let app = TestApp::new(OwnershipScheme::Flat);
        let token = login(&app, ADMIN_A_EMAIL).await;
        let id = seed(&app, "Rex", "10", "Cão", "2024-01-05").await;

        let uri = format!("/api/admin/memorials/{}", id);
        let response = app
            .router()
            .oneshot(authed(Method::DELETE, &uri, &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
        let error: ErrorResponse = read_json(response).await;
        assert_eq!(error.code, "CONFIRMATION_REQUIRED");

        let confirmed = format!("{}?confirm=true", uri);
        let response = app
            .router()
            .oneshot(authed(Method::DELETE, &confirmed, &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .router()
            .oneshot(authed(Method::DELETE, &confirmed, &token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_list_is_code_desc() {
        let app = TestApp::new(OwnershipScheme::Flat);
        let token = login(&app, ADMIN_A_EMAIL).await;
        seed(&app, "Rex", "3", "Cão", "2024-01-05").await;
        seed(&app, "Mia", "5", "Gato", "2024-03-01").await;

        let response = app
            .router()
            .oneshot(authed(Method::GET, "/api/admin/memorials", &token, None))
            .await
            .unwrap();
        let list: AdminMemorialListResponse = read_json(response).await;
        let codes: Vec<_> = list.memorials.iter().map(|m| m.memorial_code.as_str()).collect();
        assert_eq!(codes, vec!["#5", "#3"]);
    }

    #[tokio::test]
    async fn test_per_owner_lists_are_isolated_but_code_lookup_is_public() {
        let app = TestApp::new(OwnershipScheme::PerOwner);
        let token_b = login(&app, ADMIN_B_EMAIL).await;
        let id = seed(&app, "Luna", "42", "Gato", "2024-05-01").await;

        let response = app
            .router()
            .oneshot(authed(Method::GET, "/api/admin/memorials", &token_b, None))
            .await
            .unwrap();
        let list: AdminMemorialListResponse = read_json(response).await;
        assert!(list.memorials.is_empty());

        let uri = format!("/api/admin/memorials/{}", id);
        let response = app
            .router()
            .oneshot(authed(Method::GET, &uri, &token_b, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/memorials/code/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let detail: MemorialDetail = read_json(response).await;
        assert_eq!(detail.id, id);

        let owner_scope = app.state.memorial_service.scope_for(ADMIN_A_UID);
        assert_eq!(owner_scope, Scope::owner(ADMIN_A_UID));
    }

    #[tokio::test]
    async fn test_writes_without_store_are_503() {
        let app = TestApp::without_store();
        let token = login(&app, ADMIN_A_EMAIL).await;

        let response = app
            .router()
            .oneshot(authed(
                Method::POST,
                "/api/admin/memorials",
                &token,
                Some(json!({ "memorialCode": "1", "name": "Rex" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let error: ErrorResponse = read_json(response).await;
        assert_eq!(error.code, "STORE_UNAVAILABLE");
    }
}
