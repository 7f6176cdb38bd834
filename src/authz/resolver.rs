//! Precedence resolver.
//!
//! Resolution order:
//! 1. sentinel role -> full access, short-circuit
//! 2. sidebar list (sidebar role only)
//! 3. direct permissions
//! 4. custom-role template
//! 5. role defaults, only when the actor carries none of 2-4
//!
//! Sources 2-4 are unioned rather than replaced: sidebar visibility and
//! direct CRUD grants complement each other.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::normalizer::{full_access, normalize};
use super::principal::Actor;
use crate::catalog::{AccessRules, ModuleCatalog};
use crate::models::permission::PermissionList;

/// Where a grant came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSource {
    SentinelRole,
    Sidebar,
    Direct,
    RoleTemplate,
    RoleDefault,
}

impl PermissionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionSource::SentinelRole => "sentinel_role",
            PermissionSource::Sidebar => "sidebar",
            PermissionSource::Direct => "direct",
            PermissionSource::RoleTemplate => "role_template",
            PermissionSource::RoleDefault => "role_default",
        }
    }
}

/// Canonical list plus the sources that contributed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub permissions: PermissionList,
    pub sources: Vec<PermissionSource>,
    pub unrestricted: bool,
}

/// Resolves `actor` using the template carried inline on its custom role.
pub fn resolve(catalog: &ModuleCatalog, rules: &AccessRules, actor: &Actor) -> PermissionList {
    resolve_detailed(catalog, rules, actor, actor.inline_template()).permissions
}

/// Resolves `actor` with an explicitly supplied role template.
pub fn resolve_detailed(
    catalog: &ModuleCatalog,
    rules: &AccessRules,
    actor: &Actor,
    template: Option<&Value>,
) -> Resolution {
    let role = actor.canonical_role();

    if role == rules.sentinel_role {
        tracing::debug!(user_id = ?actor.user_id, role = %role, "sentinel role bypass");
        return Resolution {
            permissions: full_access(catalog),
            sources: vec![PermissionSource::SentinelRole],
            unrestricted: true,
        };
    }

    let sidebar = if role == rules.sidebar_role {
        actor.sidebar_permissions.as_ref()
    } else {
        None
    };

    let candidates = [
        (PermissionSource::Sidebar, sidebar),
        (PermissionSource::Direct, actor.direct_permissions.as_ref()),
        (PermissionSource::RoleTemplate, template),
    ];

    // A custom-role reference counts as a source even when its template is missing.
    let has_records = actor.custom_role.is_some() || candidates.iter().any(|(_, raw)| raw.is_some());

    let mut merged = PermissionList::new();
    let mut sources = Vec::new();

    for (source, raw) in candidates {
        let Some(raw) = raw else { continue };
        let list = expand_submodules(catalog, normalize(catalog, rules, raw, &role));
        tracing::debug!(
            user_id = ?actor.user_id,
            role = %role,
            source = source.as_str(),
            modules = list.len(),
            "normalized permission source"
        );
        if !list.is_empty() {
            sources.push(source);
            merged.merge(list);
        }
    }

    if !has_records {
        if let Some(defaults) = rules.role_defaults.get(&role) {
            merged = expand_submodules(catalog, defaults.iter().cloned().collect());
            if !merged.is_empty() {
                sources.push(PermissionSource::RoleDefault);
            }
        }
    }

    let unrestricted = covers_catalog(catalog, &merged);
    Resolution {
        permissions: merged,
        sources,
        unrestricted,
    }
}

/// Adds a `view` grant on every descendant of each granted parent module.
/// A module present with an empty action set grants nothing and is not expanded.
pub fn expand_submodules(catalog: &ModuleCatalog, list: PermissionList) -> PermissionList {
    let mut expanded = list.clone();
    let granted = list
        .iter()
        .filter(|(_, actions)| !actions.is_empty())
        .map(|(module, _)| module);
    for module in granted {
        for child in catalog.descendants(module) {
            expanded.grant(child, "view");
        }
    }
    expanded
}

fn covers_catalog(catalog: &ModuleCatalog, list: &PermissionList) -> bool {
    catalog.modules().iter().all(|module| {
        catalog
            .actions()
            .iter()
            .all(|action| list.contains(&module.key, action))
    })
}
