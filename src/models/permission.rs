use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// CANONICAL ENTRY
// =============================================================================

/// One `(module, actions)` grant as exchanged with callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermissionEntry {
    #[schema(example = "job_openings")]
    pub module: String,
    #[schema(example = json!(["view", "create"]))]
    pub actions: Vec<String>,
}

impl PermissionEntry {
    pub fn new<I, S>(module: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            module: module.into(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// CANONICAL LIST
// =============================================================================

/// Normalized, deduplicated permission set for one actor.
///
/// Module keys are unique and every action set is a true set. Adding a grant
/// for a module that is already present unions the action sets. Ordered maps
/// keep iteration and serialization stable across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PermissionEntry>", into = "Vec<PermissionEntry>")]
pub struct PermissionList {
    grants: BTreeMap<String, BTreeSet<String>>,
}

impl PermissionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `action` on `module`.
    pub fn grant(&mut self, module: impl Into<String>, action: impl Into<String>) {
        self.grants
            .entry(module.into())
            .or_default()
            .insert(action.into());
    }

    /// Grants every action in `actions` on `module`. An empty iterator still
    /// registers the module with an empty action set.
    pub fn grant_all<I, S>(&mut self, module: impl Into<String>, actions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = self.grants.entry(module.into()).or_default();
        set.extend(actions.into_iter().map(Into::into));
    }

    /// Unions `other` into `self`.
    pub fn merge(&mut self, other: PermissionList) {
        for (module, actions) in other.grants {
            self.grants.entry(module).or_default().extend(actions);
        }
    }

    pub fn contains(&self, module: &str, action: &str) -> bool {
        self.grants
            .get(module)
            .map(|actions| actions.contains(action))
            .unwrap_or(false)
    }

    pub fn actions(&self, module: &str) -> Option<&BTreeSet<String>> {
        self.grants.get(module)
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.grants.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.grants.iter().map(|(module, actions)| (module.as_str(), actions))
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn to_entries(&self) -> Vec<PermissionEntry> {
        self.grants
            .iter()
            .map(|(module, actions)| PermissionEntry::new(module.clone(), actions.iter().cloned()))
            .collect()
    }
}

impl From<Vec<PermissionEntry>> for PermissionList {
    fn from(entries: Vec<PermissionEntry>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<PermissionList> for Vec<PermissionEntry> {
    fn from(list: PermissionList) -> Self {
        list.to_entries()
    }
}

impl FromIterator<PermissionEntry> for PermissionList {
    fn from_iter<T: IntoIterator<Item = PermissionEntry>>(iter: T) -> Self {
        let mut list = PermissionList::new();
        for entry in iter {
            list.grant_all(entry.module, entry.actions);
        }
        list
    }
}
