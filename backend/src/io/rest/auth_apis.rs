//! # REST API for admin sessions
//!
//! Sign-in, sign-out and the guard middleware that protects every admin
//! route. The guard resolves `Authorization: Bearer <token>` to a
//! [`Principal`] and hands it to the handler as a request extension.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    Extension,
};
use shared::{LoginRequest, LoginResponse};
use tracing::{info, warn};

use super::errors::{error_response, UNAUTHENTICATED};
use crate::domain::auth_service::Principal;
use crate::domain::errors::MemorialError;
use crate::AppState;

/// Bearer token of the current request, set by the guard
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject requests without a live session
pub async fn require_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(token) = bearer_token(&request).map(str::to_string) else {
        warn!("{} {} - missing bearer token", request.method(), request.uri().path());
        return error_response(StatusCode::UNAUTHORIZED, UNAUTHENTICATED, "Authentication required");
    };

    let Some(principal) = state.auth_service.authenticate(&token).await else {
        warn!("{} {} - invalid or expired session", request.method(), request.uri().path());
        return error_response(StatusCode::UNAUTHORIZED, UNAUTHENTICATED, "Session is invalid or expired");
    };

    request.extensions_mut().insert(principal);
    request.extensions_mut().insert(BearerToken(token));
    next.run(request).await
}

/// Sign in with email and password
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, Response> {
    let Json(request) = body.map_err(|rejection| {
        error_response(StatusCode::BAD_REQUEST, "INVALID_BODY", rejection.body_text())
    })?;
    info!("POST /api/auth/login - email: {}", request.email);

    let session = state
        .auth_service
        .sign_in(&request.email, &request.password)
        .await
        .map_err(MemorialError::into_response)?;

    Ok(Json(LoginResponse {
        token: session.token,
        uid: session.principal.uid,
        email: session.principal.email,
        expires_at: session.expires_at.to_rfc3339(),
    }))
}

/// End the current session
pub async fn logout(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> StatusCode {
    info!("POST /api/auth/logout - {}", principal.email);
    state.auth_service.sign_out(&token).await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{login, read_json, TestApp, ADMIN_A_EMAIL, ADMIN_PASSWORD};
    use crate::domain::models::OwnershipScheme;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::json;
    use shared::{ErrorResponse, LoginResponse};
    use tower::util::ServiceExt; // for `oneshot`

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "email": email, "password": password }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_returns_session() {
        let app = TestApp::new(OwnershipScheme::Flat);
        let response = app
            .router()
            .oneshot(login_request(ADMIN_A_EMAIL, ADMIN_PASSWORD))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let session: LoginResponse = read_json(response).await;
        assert_eq!(session.email, ADMIN_A_EMAIL);
        assert!(!session.token.is_empty());
    }

    #[tokio::test]
    async fn test_login_with_bad_password_is_401() {
        let app = TestApp::new(OwnershipScheme::Flat);
        let response = app
            .router()
            .oneshot(login_request(ADMIN_A_EMAIL, "wrong"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = read_json(response).await;
        assert_eq!(body.code, "AUTH_FAILED");
    }

    #[tokio::test]
    async fn test_admin_routes_require_bearer_token() {
        let app = TestApp::new(OwnershipScheme::Flat);

        let response = app
            .router()
            .oneshot(Request::builder().uri("/api/admin/memorials").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = read_json(response).await;
        assert_eq!(body.code, "UNAUTHENTICATED");

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/admin/memorials")
                    .header(header::AUTHORIZATION, "Bearer not-a-session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let app = TestApp::new(OwnershipScheme::Flat);
        let token = login(&app, ADMIN_A_EMAIL).await;

        let logout = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/logout")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = app.router().oneshot(logout).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/admin/memorials")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
