use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::templates::{InMemoryRoleTemplates, RoleTemplateSource};
use crate::authz::{AuthzEngine, AuthzMode};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::routes::{authz, health};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AuthzEngine>,
    pub templates: Arc<dyn RoleTemplateSource>,
    pub mode: AuthzMode,
}

impl AppState {
    pub fn new(engine: AuthzEngine, templates: impl RoleTemplateSource + 'static, mode: AuthzMode) -> Self {
        Self {
            engine: Arc::new(engine),
            templates: Arc::new(templates),
            mode,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let engine = config.build_engine()?;
        let templates = config.build_templates()?;
        Ok(Self::new(engine, templates, config.mode))
    }

    /// Built-in HR configuration, no stored templates, strict mode.
    pub fn hr_default() -> Self {
        Self::new(
            AuthzEngine::hr_default(),
            InMemoryRoleTemplates::new(),
            AuthzMode::Strict,
        )
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let authz_routes = Router::new()
        .route("/catalog", get(authz::catalog))
        .route("/resolve", post(authz::resolve))
        .route("/check", post(authz::check))
        .route("/menu", post(authz::menu));

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/authz", authz_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
