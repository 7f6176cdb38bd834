//! Authorization API Routes
//!
//! Resolution endpoints consumed by the HTTP layer and the admin console.
//! Actors arrive in the request body; authenticating them is the caller's job.

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::app::AppState;
use crate::authz::templates::resolve_with_source;
use crate::authz::{actions, roles};
use crate::catalog::canonical_key;
use crate::errors::{AppError, AppResult};
use crate::models::authz::*;

/// Module catalog and action vocabulary
#[utoipa::path(
    get,
    path = "/authz/catalog",
    tag = "Authorization",
    responses(
        (status = 200, description = "Module catalog", body = CatalogResponse),
    )
)]
pub async fn catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let catalog = state.engine.catalog();
    Json(CatalogResponse {
        modules: catalog.modules().to_vec(),
        actions: catalog.actions().to_vec(),
    })
}

/// Resolve an actor into its canonical permission list
#[utoipa::path(
    post,
    path = "/authz/resolve",
    tag = "Authorization",
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Canonical permissions", body = ResolveResponse),
        (status = 400, description = "Actor has no role"),
    )
)]
pub async fn resolve(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> AppResult<Json<ResolveResponse>> {
    require_role(&req.actor.role)?;

    let resolution = resolve_with_source(&state.engine, state.templates.as_ref(), &req.actor).await;

    Ok(Json(ResolveResponse {
        role: roles::canonical(&req.actor.role),
        permissions: resolution.permissions.to_entries(),
        sources: resolution.sources,
        unrestricted: resolution.unrestricted,
        resolved_at: Utc::now(),
    }))
}

/// Check one module/action pair for an actor
#[utoipa::path(
    post,
    path = "/authz/check",
    tag = "Authorization",
    request_body = CheckRequest,
    responses(
        (status = 200, description = "Access decision", body = CheckResponse),
        (status = 400, description = "Missing role or module"),
    )
)]
pub async fn check(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> AppResult<Json<CheckResponse>> {
    require_role(&req.actor.role)?;

    let module = canonical_key(&req.module);
    if module.is_empty() {
        return Err(AppError::bad_request("module must not be empty"));
    }
    let action = req
        .action
        .as_deref()
        .map(canonical_key)
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| actions::VIEW.to_string());

    let resolution = resolve_with_source(&state.engine, state.templates.as_ref(), &req.actor).await;
    let allowed = state.engine.has_action(&resolution.permissions, &module, &action);
    let can_view = state.engine.can_view(&resolution.permissions, &module);

    tracing::debug!(
        role = %req.actor.role,
        module = %module,
        action = %action,
        allowed,
        can_view,
        "access check"
    );

    Ok(Json(CheckResponse {
        module,
        action,
        allowed,
        can_view,
    }))
}

/// Resolve the active menu entry and the visible menu for an actor
#[utoipa::path(
    post,
    path = "/authz/menu",
    tag = "Authorization",
    request_body = MenuRequest,
    responses(
        (status = 200, description = "Active entry and visible menu", body = MenuResponse),
        (status = 400, description = "Actor has no role"),
    )
)]
pub async fn menu(
    State(state): State<AppState>,
    Json(req): Json<MenuRequest>,
) -> AppResult<Json<MenuResponse>> {
    require_role(&req.actor.role)?;

    let resolution = resolve_with_source(&state.engine, state.templates.as_ref(), &req.actor).await;
    let active = state
        .engine
        .active_menu(&req.path, &req.query, &resolution.permissions);

    Ok(Json(MenuResponse {
        active,
        menu: state.engine.visible_menu(&resolution.permissions),
    }))
}

fn require_role(role: &str) -> AppResult<()> {
    if role.trim().is_empty() {
        return Err(AppError::bad_request("actor role must not be empty"));
    }
    Ok(())
}
