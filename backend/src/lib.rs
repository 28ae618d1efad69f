//! # Pet Memorial Backend
//!
//! Memorial records of a pet cremation service: the record store client, the
//! public listing view model and the REST surface that exposes them.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, session guard)
//!     ↓
//! Domain Layer (memorial service, list view, validation, auth)
//!     ↓
//! Storage Layer (YAML documents or in-memory)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{AppConfig, StoreConfig};
use crate::domain::{AuthService, DateFormatter, ImageService, MemorialListView, MemorialService};
use crate::io::rest::{admin_apis, auth_apis, memorial_apis};
use crate::storage::{InMemoryMemorialStore, MemorialRepository, MemorialStorage, YamlConnection};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub memorial_service: MemorialService,
    pub list_view: MemorialListView,
    pub auth_service: AuthService,
}

/// Initialize the backend with all required services
pub fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let images = ImageService::new(config.placeholder_image.clone(), config.max_inline_image_bytes);

    info!("Setting up memorial store");
    let memorial_service = match &config.store {
        StoreConfig::Yaml { data_dir } => {
            let connection = YamlConnection::new(data_dir)
                .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
            info!("Using YAML document store at {}", data_dir.display());
            let store: Arc<dyn MemorialStorage> = Arc::new(MemorialRepository::new(connection));
            MemorialService::new(store, config.ownership, images)
        }
        StoreConfig::Memory => {
            warn!("Using in-memory store, memorials will not survive a restart");
            MemorialService::new(Arc::new(InMemoryMemorialStore::new()), config.ownership, images)
        }
        StoreConfig::Disabled => {
            warn!("No memorial store configured, listings will be empty and edits rejected");
            MemorialService::unavailable(config.ownership, images)
        }
    };

    let auth_service = AuthService::new(
        config.admins.clone(),
        Duration::minutes(config.session_ttl_minutes),
    );
    if !auth_service.has_accounts() {
        warn!("No admin account configured, the admin API cannot be used");
    }

    let formatter = DateFormatter::from_offset_minutes(config.display_offset_minutes);

    info!("Setting up application state");
    Ok(AppState {
        memorial_service,
        list_view: MemorialListView::new(formatter),
        auth_service,
    })
}

/// All routes under `/api`, admin routes behind the session guard
pub fn api_router(state: AppState) -> Router {
    let guarded_routes = admin_apis::router()
        .route("/auth/logout", post(auth_apis::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_apis::require_session,
        ));

    let api_routes = Router::new()
        .route("/health", get(memorial_apis::health_check))
        .route("/auth/login", post(auth_apis::login))
        .nest("/memorials", memorial_apis::router())
        .merge(guarded_routes);

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Create the Axum router with CORS and request tracing
pub fn create_router(state: AppState, config: &AppConfig) -> Result<Router> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", config.cors_origin))?;

    // CORS setup to allow the website to make requests
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Ok(api_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}
