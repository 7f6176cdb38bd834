//! Authorization module - resolution engine and route guard
//!
//! This module implements the permission resolution engine with support for:
//! - Several stored permission encodings, normalized to one canonical list
//! - Source precedence with set-union merging
//! - Parent/child module expansion
//! - Menu specificity resolution for the navigation UI
//! - Configurable enforcement modes (off/advisory/strict)

mod evaluator;
pub mod guard;
mod menu;
pub mod normalizer;
mod principal;
mod resolver;
pub mod templates;

pub use evaluator::{can_view, has_action, VIEW_ACTIONS};
pub use menu::{resolve_active_menu, visible_menu};
pub use normalizer::{full_access, fuzzy_module_match, normalize};
pub use principal::{Actor, CustomRole};
pub use resolver::{expand_submodules, resolve, resolve_detailed, PermissionSource, Resolution};

use serde_json::Value;

use crate::catalog::{AccessRules, ModuleCatalog};
use crate::models::menu::{ActiveMenu, MenuEntry};
use crate::models::permission::PermissionList;

/// Authorization enforcement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthzMode {
    /// No permission checks (development mode)
    Off,
    /// Log denials but allow requests (testing mode)
    Advisory,
    /// Enforce 401/403 on denied requests (production mode)
    Strict,
}

impl AuthzMode {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "off" => AuthzMode::Off,
            "advisory" => AuthzMode::Advisory,
            _ => AuthzMode::Strict,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(&std::env::var("AUTHZ_MODE").unwrap_or_default())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthzMode::Off => "off",
            AuthzMode::Advisory => "advisory",
            AuthzMode::Strict => "strict",
        }
    }
}

/// Well-known role labels, in canonical form
pub mod roles {
    pub const SUPER_ADMIN: &str = "super_admin";
    pub const ADMIN: &str = "admin";
    pub const MANAGER: &str = "manager";
    pub const EMPLOYEE: &str = "employee";

    /// `"Super Admin"`, `"super-admin"` and `"SUPER_ADMIN"` all become `super_admin`.
    pub fn canonical(label: &str) -> String {
        label
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect()
    }
}

/// Well-known action names
pub mod actions {
    pub const VIEW: &str = "view";
    pub const READ: &str = "read";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const APPROVE: &str = "approve";
    pub const EXPORT: &str = "export";
    pub const START_INTERVIEW: &str = "start_interview";
}

/// Immutable engine configuration shared by every request.
///
/// Pure and synchronous: safe to share behind an `Arc` across tasks.
#[derive(Debug, Clone, Default)]
pub struct AuthzEngine {
    catalog: ModuleCatalog,
    rules: AccessRules,
    menu: Vec<MenuEntry>,
}

impl AuthzEngine {
    pub fn new(catalog: ModuleCatalog, rules: AccessRules, menu: Vec<MenuEntry>) -> Self {
        Self {
            catalog,
            rules,
            menu,
        }
    }

    /// Built-in HR catalog, rules and menu.
    pub fn hr_default() -> Self {
        Self::new(
            ModuleCatalog::default(),
            AccessRules::default(),
            crate::catalog::defaults::menu(),
        )
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &AccessRules {
        &self.rules
    }

    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    pub fn normalize(&self, raw: &Value, role: &str) -> PermissionList {
        normalize(&self.catalog, &self.rules, raw, role)
    }

    pub fn resolve(&self, actor: &Actor) -> PermissionList {
        resolve(&self.catalog, &self.rules, actor)
    }

    pub fn resolve_detailed(&self, actor: &Actor, template: Option<&Value>) -> Resolution {
        resolve_detailed(&self.catalog, &self.rules, actor, template)
    }

    pub fn has_action(&self, list: &PermissionList, module: &str, action: &str) -> bool {
        has_action(list, module, action)
    }

    pub fn can_view(&self, list: &PermissionList, module: &str) -> bool {
        can_view(&self.catalog, list, module)
    }

    /// Resolves against the configured menu tree.
    pub fn active_menu(&self, path: &str, query: &str, list: &PermissionList) -> ActiveMenu {
        resolve_active_menu(&self.catalog, path, query, &self.menu, list)
    }

    pub fn resolve_active_menu(
        &self,
        path: &str,
        query: &str,
        tree: &[MenuEntry],
        list: &PermissionList,
    ) -> ActiveMenu {
        resolve_active_menu(&self.catalog, path, query, tree, list)
    }

    pub fn visible_menu(&self, list: &PermissionList) -> Vec<MenuEntry> {
        visible_menu(&self.catalog, &self.menu, list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_labels_are_canonicalized() {
        assert_eq!(roles::canonical("Super Admin"), roles::SUPER_ADMIN);
        assert_eq!(roles::canonical(" super-admin "), roles::SUPER_ADMIN);
        assert_eq!(roles::canonical("Employee"), roles::EMPLOYEE);
    }

    #[test]
    fn mode_defaults_to_strict() {
        assert_eq!(AuthzMode::parse(""), AuthzMode::Strict);
        assert_eq!(AuthzMode::parse("Advisory"), AuthzMode::Advisory);
        assert_eq!(AuthzMode::parse("off"), AuthzMode::Off);
    }
}
