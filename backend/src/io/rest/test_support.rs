//! Shared fixtures for the REST tests: an app over the in-memory store with
//! two admin accounts.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde_json::json;
use shared::{CreateMemorialRequest, LoginResponse};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

use crate::domain::auth_service::{hash_password, AuthService, Credential};
use crate::domain::models::OwnershipScheme;
use crate::domain::{DateFormatter, ImageService, MemorialListView, MemorialService};
use crate::storage::InMemoryMemorialStore;
use crate::{api_router, AppState};

pub const ADMIN_PASSWORD: &str = "segredo";
pub const ADMIN_A_EMAIL: &str = "admin-a@example.com";
pub const ADMIN_A_UID: &str = "owner-a";
pub const ADMIN_B_EMAIL: &str = "admin-b@example.com";
pub const ADMIN_B_UID: &str = "owner-b";

pub struct TestApp {
    pub state: AppState,
}

fn auth_service() -> AuthService {
    AuthService::new(
        vec![
            Credential::new(ADMIN_A_EMAIL, hash_password(ADMIN_PASSWORD), ADMIN_A_UID),
            Credential::new(ADMIN_B_EMAIL, hash_password(ADMIN_PASSWORD), ADMIN_B_UID),
        ],
        Duration::minutes(30),
    )
}

impl TestApp {
    pub fn new(scheme: OwnershipScheme) -> Self {
        let memorial_service = MemorialService::new(
            Arc::new(InMemoryMemorialStore::new()),
            scheme,
            ImageService::default(),
        );
        Self::with_service(memorial_service)
    }

    pub fn without_store() -> Self {
        Self::with_service(MemorialService::unavailable(
            OwnershipScheme::Flat,
            ImageService::default(),
        ))
    }

    fn with_service(memorial_service: MemorialService) -> Self {
        Self {
            state: AppState {
                memorial_service,
                list_view: MemorialListView::new(DateFormatter::default()),
                auth_service: auth_service(),
            },
        }
    }

    pub fn router(&self) -> Router {
        api_router(self.state.clone())
    }
}

/// Create a memorial owned by admin A
pub async fn seed(app: &TestApp, name: &str, code: &str, animal: &str, cremation_date: &str) -> String {
    let service = &app.state.memorial_service;
    let request = CreateMemorialRequest {
        memorial_code: code.to_string(),
        name: Some(name.to_string()),
        animal_type: Some(animal.to_string()),
        cremation_date: Some(cremation_date.to_string()),
        ..Default::default()
    };
    service
        .create(&service.scope_for(ADMIN_A_UID), request)
        .await
        .unwrap()
}

/// Sign in through the API and return the bearer token
pub async fn login(app: &TestApp, email: &str) -> String {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": email, "password": ADMIN_PASSWORD }).to_string(),
        ))
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    read_json::<LoginResponse>(response).await.token
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
