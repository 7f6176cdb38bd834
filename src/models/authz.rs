use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::authz::{Actor, PermissionSource};
use crate::catalog::ModuleDescriptor;
use crate::models::menu::{ActiveMenu, MenuEntry};
use crate::models::permission::PermissionEntry;

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub modules: Vec<ModuleDescriptor>,
    #[schema(example = json!(["view", "create", "update", "delete"]))]
    pub actions: Vec<String>,
}

// =============================================================================
// RESOLVE
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveRequest {
    pub actor: Actor,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResolveResponse {
    #[schema(example = "manager")]
    pub role: String,
    pub permissions: Vec<PermissionEntry>,
    pub sources: Vec<PermissionSource>,
    pub unrestricted: bool,
    pub resolved_at: DateTime<Utc>,
}

// =============================================================================
// CHECK
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckRequest {
    pub actor: Actor,
    #[schema(example = "candidates")]
    pub module: String,
    /// Defaults to `view`
    #[serde(default)]
    #[schema(example = "start_interview")]
    pub action: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckResponse {
    pub module: String,
    pub action: String,
    /// Whether the actor holds `action` on `module`
    pub allowed: bool,
    /// Whether the module (or any of its children) is visible
    pub can_view: bool,
}

// =============================================================================
// MENU
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuRequest {
    pub actor: Actor,
    #[schema(example = "/staff/attendance/today")]
    pub path: String,
    #[serde(default)]
    #[schema(example = "")]
    pub query: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuResponse {
    #[serde(flatten)]
    pub active: ActiveMenu,
    pub menu: Vec<MenuEntry>,
}
