//! Module catalog: the static configuration the engine resolves against.
//!
//! Holds the module hierarchy (parent -> ordered children), the action
//! vocabularies, alias tables and the role rules. All of it is built once at
//! startup and never mutated afterwards.

pub mod defaults;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::models::permission::PermissionEntry;

/// Upper bound on hierarchy depth accepted at load time.
pub const MAX_DEPTH: usize = 10;

// =============================================================================
// CONFIGURATION SHAPES
// =============================================================================

/// A module as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

impl ModuleSpec {
    pub fn leaf(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: Some(label.to_string()),
            children: Vec::new(),
        }
    }

    pub fn parent(key: &str, label: &str, children: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: Some(label.to_string()),
            children: children.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Target of a named special-case token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialGrant {
    pub module: String,
    pub action: String,
}

/// On-disk catalog document. Every field falls back to the built-in HR data.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "defaults::modules")]
    pub modules: Vec<ModuleSpec>,
    #[serde(default = "defaults::actions")]
    pub actions: Vec<String>,
    #[serde(default = "defaults::legacy_actions")]
    pub legacy_actions: Vec<String>,
    #[serde(default = "defaults::action_aliases")]
    pub action_aliases: BTreeMap<String, String>,
    #[serde(default = "defaults::module_aliases")]
    pub module_aliases: BTreeMap<String, String>,
    #[serde(default = "defaults::special_tokens")]
    pub special_tokens: BTreeMap<String, SpecialGrant>,
    #[serde(default = "defaults::sentinel_role")]
    pub sentinel_role: String,
    #[serde(default = "defaults::sidebar_role")]
    pub sidebar_role: String,
    #[serde(default = "defaults::unrestricted_tokens")]
    pub unrestricted_tokens: Vec<String>,
    #[serde(default = "defaults::role_defaults")]
    pub role_defaults: BTreeMap<String, Vec<PermissionEntry>>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            modules: defaults::modules(),
            actions: defaults::actions(),
            legacy_actions: defaults::legacy_actions(),
            action_aliases: defaults::action_aliases(),
            module_aliases: defaults::module_aliases(),
            special_tokens: defaults::special_tokens(),
            sentinel_role: defaults::sentinel_role(),
            sidebar_role: defaults::sidebar_role(),
            unrestricted_tokens: defaults::unrestricted_tokens(),
            role_defaults: defaults::role_defaults(),
        }
    }
}

impl CatalogConfig {
    /// Validates the document and splits it into the catalog and role rules.
    pub fn build(self) -> Result<(ModuleCatalog, AccessRules), AppError> {
        let catalog = ModuleCatalog::from_specs(
            self.modules,
            self.actions,
            self.legacy_actions,
            self.action_aliases,
            self.module_aliases,
            self.special_tokens,
        )?;

        let rules = AccessRules {
            sentinel_role: crate::authz::roles::canonical(&self.sentinel_role),
            sidebar_role: crate::authz::roles::canonical(&self.sidebar_role),
            unrestricted_tokens: self
                .unrestricted_tokens
                .iter()
                .map(|t| canonical_key(t))
                .collect(),
            role_defaults: self
                .role_defaults
                .into_iter()
                .map(|(role, entries)| (crate::authz::roles::canonical(&role), entries))
                .collect(),
            fuzzy_fallback: true,
        };

        Ok((catalog, rules))
    }
}

// =============================================================================
// ROLE RULES
// =============================================================================

/// Role-keyed rules consulted by the normalizer and the resolver.
#[derive(Debug, Clone)]
pub struct AccessRules {
    /// Role that short-circuits to full access.
    pub sentinel_role: String,
    /// Role whose sidebar list is a permission source.
    pub sidebar_role: String,
    /// Flat-list tokens meaning "unrestricted" for that source.
    pub unrestricted_tokens: Vec<String>,
    /// Grants used when an actor's records yield nothing.
    pub role_defaults: BTreeMap<String, Vec<PermissionEntry>>,
    /// Whether the substring fallback of the normalizer runs.
    pub fuzzy_fallback: bool,
}

impl Default for AccessRules {
    fn default() -> Self {
        Self {
            sentinel_role: defaults::sentinel_role(),
            sidebar_role: defaults::sidebar_role(),
            unrestricted_tokens: defaults::unrestricted_tokens(),
            role_defaults: defaults::role_defaults(),
            fuzzy_fallback: true,
        }
    }
}

impl AccessRules {
    pub fn is_unrestricted_token(&self, token: &str) -> bool {
        self.unrestricted_tokens.iter().any(|t| t == token)
    }
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ModuleDescriptor {
    #[schema(example = "interview")]
    pub key: String,
    #[schema(example = "Recruitment")]
    pub label: String,
    #[schema(example = json!(["job_openings", "candidates", "offer_letter"]))]
    pub children: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ModuleCatalog {
    modules: Vec<ModuleDescriptor>,
    index: HashMap<String, usize>,
    actions: Vec<String>,
    legacy_actions: Vec<String>,
    action_aliases: HashMap<String, String>,
    module_aliases: HashMap<String, String>,
    special_tokens: HashMap<String, SpecialGrant>,
    /// (keyword, module) pairs, longest keyword first.
    fuzzy_keywords: Vec<(String, String)>,
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::assemble(
            defaults::modules(),
            defaults::actions(),
            defaults::legacy_actions(),
            defaults::action_aliases(),
            defaults::module_aliases(),
            defaults::special_tokens(),
        )
    }
}

impl ModuleCatalog {
    pub fn from_specs(
        modules: Vec<ModuleSpec>,
        actions: Vec<String>,
        legacy_actions: Vec<String>,
        action_aliases: BTreeMap<String, String>,
        module_aliases: BTreeMap<String, String>,
        special_tokens: BTreeMap<String, SpecialGrant>,
    ) -> Result<Self, AppError> {
        validate_hierarchy(&modules)?;

        let catalog = Self::assemble(
            modules,
            actions,
            legacy_actions,
            action_aliases,
            module_aliases,
            special_tokens,
        );

        for (alias, target) in &catalog.module_aliases {
            if !catalog.is_known(target) {
                return Err(AppError::configuration(format!(
                    "module alias `{alias}` points at unknown module `{target}`"
                )));
            }
        }
        for (token, grant) in &catalog.special_tokens {
            if !catalog.is_known(&grant.module) {
                return Err(AppError::configuration(format!(
                    "special token `{token}` points at unknown module `{}`",
                    grant.module
                )));
            }
        }

        Ok(catalog)
    }

    fn assemble(
        specs: Vec<ModuleSpec>,
        actions: Vec<String>,
        legacy_actions: Vec<String>,
        action_aliases: BTreeMap<String, String>,
        module_aliases: BTreeMap<String, String>,
        special_tokens: BTreeMap<String, SpecialGrant>,
    ) -> Self {
        let mut modules: Vec<ModuleDescriptor> = Vec::new();
        let mut index = HashMap::new();

        for spec in &specs {
            let key = canonical_key(&spec.key);
            let children: Vec<String> = spec.children.iter().map(|c| canonical_key(c)).collect();
            let descriptor = ModuleDescriptor {
                label: spec.label.clone().unwrap_or_else(|| key.clone()),
                key: key.clone(),
                children,
            };
            match index.get(&key) {
                Some(&pos) => modules[pos] = descriptor,
                None => {
                    index.insert(key, modules.len());
                    modules.push(descriptor);
                }
            }
        }

        // Children only named under a parent become leaf descriptors.
        let undeclared: Vec<String> = modules
            .iter()
            .flat_map(|m| m.children.iter())
            .filter(|child| !index.contains_key(*child))
            .cloned()
            .collect();
        for child in undeclared {
            if index.contains_key(&child) {
                continue;
            }
            index.insert(child.clone(), modules.len());
            modules.push(ModuleDescriptor {
                label: child.clone(),
                key: child,
                children: Vec::new(),
            });
        }

        let module_aliases: HashMap<String, String> = module_aliases
            .into_iter()
            .map(|(alias, target)| (canonical_key(&alias), canonical_key(&target)))
            .collect();

        let mut fuzzy_keywords: Vec<(String, String)> = modules
            .iter()
            .map(|m| (m.key.clone(), m.key.clone()))
            .chain(module_aliases.iter().map(|(a, t)| (a.clone(), t.clone())))
            .collect();
        fuzzy_keywords.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self {
            modules,
            index,
            actions: actions.iter().map(|a| canonical_key(a)).collect(),
            legacy_actions: legacy_actions.iter().map(|a| canonical_key(a)).collect(),
            action_aliases: action_aliases
                .into_iter()
                .map(|(from, to)| (canonical_key(&from), canonical_key(&to)))
                .collect(),
            module_aliases,
            special_tokens: special_tokens
                .into_iter()
                .map(|(token, grant)| {
                    (
                        canonical_key(&token),
                        SpecialGrant {
                            module: canonical_key(&grant.module),
                            action: canonical_key(&grant.action),
                        },
                    )
                })
                .collect(),
            fuzzy_keywords,
        }
    }

    /// Ordered children of `module`; empty for leaves and unknown keys.
    pub fn children(&self, module: &str) -> &[String] {
        self.get(module)
            .map(|m| m.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_known(&self, module: &str) -> bool {
        self.index.contains_key(module)
    }

    pub fn get(&self, module: &str) -> Option<&ModuleDescriptor> {
        self.index.get(module).map(|&pos| &self.modules[pos])
    }

    /// Every module below `module`, in pre-order.
    pub fn descendants(&self, module: &str) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_descendants(module, &mut out, 0);
        out
    }

    fn collect_descendants<'a>(&'a self, module: &str, out: &mut Vec<&'a str>, depth: usize) {
        if depth >= MAX_DEPTH {
            return;
        }
        for child in self.children(module) {
            out.push(child.as_str());
            self.collect_descendants(child, out, depth + 1);
        }
    }

    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// Full action vocabulary.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn is_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    pub fn is_legacy_action(&self, action: &str) -> bool {
        self.legacy_actions.iter().any(|a| a == action)
    }

    /// Applies the action alias table (`edit` -> `update`, ...).
    pub fn canonical_action<'a>(&'a self, action: &'a str) -> &'a str {
        self.action_aliases
            .get(action)
            .map(String::as_str)
            .unwrap_or(action)
    }

    /// Resolves a raw module token through the alias table to a known key.
    pub fn resolve_module<'a>(&'a self, token: &'a str) -> Option<&'a str> {
        if let Some(target) = self.module_aliases.get(token) {
            return Some(target.as_str());
        }
        self.index.get_key_value(token).map(|(key, _)| key.as_str())
    }

    pub fn special_token(&self, token: &str) -> Option<&SpecialGrant> {
        self.special_tokens.get(token)
    }

    pub fn fuzzy_keywords(&self) -> &[(String, String)] {
        &self.fuzzy_keywords
    }
}

/// Lower-cased, trimmed form used for every module and action key.
pub fn canonical_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn validate_hierarchy(specs: &[ModuleSpec]) -> Result<(), AppError> {
    let mut parent_of: HashMap<String, String> = HashMap::new();

    for spec in specs {
        let key = canonical_key(&spec.key);
        if key.is_empty() {
            return Err(AppError::configuration("module key must not be empty"));
        }
        for child in &spec.children {
            let child = canonical_key(child);
            if child == key {
                return Err(AppError::configuration(format!(
                    "module `{key}` lists itself as a child"
                )));
            }
            if let Some(existing) = parent_of.insert(child.clone(), key.clone()) {
                if existing != key {
                    return Err(AppError::configuration(format!(
                        "module `{child}` has two parents: `{existing}` and `{key}`"
                    )));
                }
            }
        }
    }

    for start in parent_of.keys() {
        let mut current = start.as_str();
        let mut depth = 0;
        while let Some(parent) = parent_of.get(current) {
            depth += 1;
            if parent == start || depth > MAX_DEPTH {
                return Err(AppError::configuration(format!(
                    "module hierarchy around `{start}` is cyclic or deeper than {MAX_DEPTH}"
                )));
            }
            current = parent;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_exposes_children_in_order() {
        let catalog = ModuleCatalog::default();
        assert_eq!(
            catalog.children("interview"),
            ["job_openings", "candidates", "offer_letter"]
        );
        assert_eq!(catalog.children("staff"), ["attendance", "leave_requests"]);
        assert!(catalog.is_known("candidates"));
    }

    #[test]
    fn unknown_modules_behave_as_leaves() {
        let catalog = ModuleCatalog::default();
        assert!(!catalog.is_known("spaceships"));
        assert!(catalog.children("spaceships").is_empty());
        assert!(catalog.descendants("spaceships").is_empty());
    }

    #[test]
    fn aliases_resolve_to_canonical_keys() {
        let catalog = ModuleCatalog::default();
        assert_eq!(catalog.resolve_module("employees"), Some("staff"));
        assert_eq!(catalog.resolve_module("staff"), Some("staff"));
        assert_eq!(catalog.resolve_module("company_policies"), Some("company-policy"));
        assert_eq!(catalog.resolve_module("policies"), Some("company-policy"));
        assert_eq!(catalog.resolve_module("nope"), None);
        assert_eq!(catalog.canonical_action("edit"), "update");
        assert_eq!(catalog.canonical_action("view"), "view");
    }

    #[test]
    fn fuzzy_keywords_are_longest_first() {
        let catalog = ModuleCatalog::default();
        let lengths: Vec<usize> = catalog.fuzzy_keywords().iter().map(|(k, _)| k.len()).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn rejects_child_with_two_parents() {
        let config = CatalogConfig {
            modules: vec![
                ModuleSpec::parent("a", "A", &["shared"]),
                ModuleSpec::parent("b", "B", &["shared"]),
            ],
            ..CatalogConfig::default()
        };
        let err = config.build().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn rejects_cycles() {
        let config = CatalogConfig {
            modules: vec![
                ModuleSpec::parent("a", "A", &["b"]),
                ModuleSpec::parent("b", "B", &["a"]),
            ],
            module_aliases: BTreeMap::new(),
            special_tokens: BTreeMap::new(),
            ..CatalogConfig::default()
        };
        assert!(config.build().is_err());
    }

    #[test]
    fn undeclared_children_become_leaves() {
        let catalog = ModuleCatalog::from_specs(
            vec![ModuleSpec::parent("hr", "HR", &["people"])],
            vec!["view".into()],
            vec!["view".into()],
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
        )
        .unwrap();
        assert!(catalog.is_known("people"));
        assert_eq!(catalog.children("hr"), ["people"]);
        assert!(catalog.children("people").is_empty());
    }
}
