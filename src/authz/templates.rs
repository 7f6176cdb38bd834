use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use super::principal::Actor;
use super::resolver::Resolution;
use super::AuthzEngine;
use crate::errors::AppError;

/// External store holding custom-role permission templates.
#[async_trait]
pub trait RoleTemplateSource: Send + Sync {
    /// Raw template for the custom role `role_id`, if the store knows it.
    async fn fetch(&self, role_id: &str) -> Option<Value>;
}

/// Templates kept in memory, typically loaded from a JSON file at startup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleTemplates {
    templates: HashMap<String, Value>,
}

impl InMemoryRoleTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, role_id: impl Into<String>, permissions: Value) -> Self {
        self.templates.insert(role_id.into(), permissions);
        self
    }

    /// Loads `{ "<role id>": [{"module": ..., "actions": [...]}, ...], ... }`.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AppError::configuration(format!("failed to read {}: {err}", path.display()))
        })?;
        let mut de = serde_json::Deserializer::from_str(&raw);
        let templates: HashMap<String, Value> = serde_path_to_error::deserialize(&mut de)
            .map_err(|err| {
                AppError::configuration(format!(
                    "invalid role templates in {} at `{}`: {}",
                    path.display(),
                    err.path(),
                    err.inner()
                ))
            })?;
        Ok(Self { templates })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[async_trait]
impl RoleTemplateSource for InMemoryRoleTemplates {
    async fn fetch(&self, role_id: &str) -> Option<Value> {
        self.templates.get(role_id).cloned()
    }
}

/// Resolves `actor`, fetching its custom-role template when it is only
/// referenced by id. An unresolvable reference counts as an empty source.
pub async fn resolve_with_source(
    engine: &AuthzEngine,
    source: &dyn RoleTemplateSource,
    actor: &Actor,
) -> Resolution {
    if let Some(inline) = actor.inline_template() {
        return engine.resolve_detailed(actor, Some(inline));
    }

    let fetched = match actor.template_reference() {
        Some(role_id) => {
            let template = source.fetch(role_id).await;
            if template.is_none() {
                tracing::warn!(
                    user_id = ?actor.user_id,
                    role_id = %role_id,
                    "custom role has no resolvable template; treating it as empty"
                );
            }
            template
        }
        None => None,
    };

    engine.resolve_detailed(actor, fetched.as_ref())
}
