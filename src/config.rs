use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::authz::templates::InMemoryRoleTemplates;
use crate::authz::{AuthzEngine, AuthzMode};
use crate::catalog::{canonical_key, CatalogConfig};
use crate::errors::AppError;
use crate::models::menu::MenuEntry;

const DEFAULT_PORT: u16 = 8000;

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub mode: AuthzMode,
    pub catalog_path: Option<PathBuf>,
    pub menu_path: Option<PathBuf>,
    pub role_templates_path: Option<PathBuf>,
    pub fuzzy_fallback: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mode: AuthzMode::Strict,
            catalog_path: None,
            menu_path: None,
            role_templates_path: None,
            fuzzy_fallback: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let port = std::env::var("APP_PORT")
            .map(|val| val.parse::<u16>())
            .unwrap_or(Ok(DEFAULT_PORT))
            .map_err(|_| AppError::configuration("APP_PORT must be a valid port number"))?;

        let fuzzy_fallback = match std::env::var("AUTHZ_FUZZY_FALLBACK") {
            Ok(val) => parse_flag(&val).ok_or_else(|| {
                AppError::configuration("AUTHZ_FUZZY_FALLBACK must be true or false")
            })?,
            Err(_) => true,
        };

        Ok(Self {
            port,
            mode: AuthzMode::from_env(),
            catalog_path: path_var("AUTHZ_CATALOG_PATH"),
            menu_path: path_var("AUTHZ_MENU_PATH"),
            role_templates_path: path_var("AUTHZ_ROLE_TEMPLATES_PATH"),
            fuzzy_fallback,
        })
    }

    /// Builds the engine from the configured files, falling back to the
    /// built-in HR catalog and menu.
    pub fn build_engine(&self) -> Result<AuthzEngine, AppError> {
        let catalog_config = match &self.catalog_path {
            Some(path) => read_json::<CatalogConfig>(path)?,
            None => CatalogConfig::default(),
        };
        let (catalog, mut rules) = catalog_config.build()?;
        rules.fuzzy_fallback = self.fuzzy_fallback;

        let menu = match &self.menu_path {
            Some(path) => read_json::<Vec<MenuEntry>>(path)?,
            None => crate::catalog::defaults::menu(),
        };
        warn_unknown_menu_modules(&catalog, &menu);

        tracing::info!(
            modules = catalog.modules().len(),
            actions = catalog.actions().len(),
            menu_entries = menu.len(),
            fuzzy_fallback = rules.fuzzy_fallback,
            "authorization catalog loaded"
        );

        Ok(AuthzEngine::new(catalog, rules, menu))
    }

    pub fn build_templates(&self) -> Result<InMemoryRoleTemplates, AppError> {
        match &self.role_templates_path {
            Some(path) => InMemoryRoleTemplates::from_file(path),
            None => Ok(InMemoryRoleTemplates::new()),
        }
    }
}

/// Reads a JSON document, reporting the failing field path on error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path).map_err(|err| {
        AppError::configuration(format!("failed to read {}: {err}", path.display()))
    })?;
    let mut de = serde_json::Deserializer::from_str(&raw);
    serde_path_to_error::deserialize(&mut de).map_err(|err| {
        AppError::configuration(format!(
            "invalid document {} at `{}`: {}",
            path.display(),
            err.path(),
            err.inner()
        ))
    })
}

fn warn_unknown_menu_modules(catalog: &crate::catalog::ModuleCatalog, entries: &[MenuEntry]) {
    for entry in entries {
        if let Some(module) = entry.module.as_deref() {
            if !catalog.is_known(&canonical_key(module)) {
                tracing::warn!(
                    entry = %entry.key,
                    module = %module,
                    "menu entry tagged with unknown module will never be visible"
                );
            }
        }
        warn_unknown_menu_modules(catalog, &entry.children);
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|val| !val.trim().is_empty())
        .map(PathBuf::from)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
