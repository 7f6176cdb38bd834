use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Navigation node of the administration console.
///
/// `path` is absent for pure group headers and may carry a `?query`
/// requirement (e.g. `/reports?type=payroll`). Entries without a `module`
/// tag are never hidden by authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MenuEntry {
    #[schema(example = "attendance")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "/staff/attendance")]
    pub path: Option<String>,
    #[serde(default, alias = "moduleKey", skip_serializing_if = "Option::is_none")]
    #[schema(example = "attendance")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            path: None,
            module: None,
            children: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_children(mut self, children: Vec<MenuEntry>) -> Self {
        self.children = children;
        self
    }

    /// Path without its query requirement.
    pub fn route(&self) -> Option<&str> {
        self.path
            .as_deref()
            .map(|path| path.split_once('?').map(|(route, _)| route).unwrap_or(path))
    }

    /// Query text the current location must contain for this entry to match.
    pub fn query_requirement(&self) -> Option<&str> {
        self.path
            .as_deref()
            .and_then(|path| path.split_once('?'))
            .map(|(_, query)| query)
            .filter(|query| !query.is_empty())
    }
}

/// Outcome of menu specificity resolution. Both fields absent is a valid state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActiveMenu {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_top_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_sub_entry: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_and_query_requirement_split_on_question_mark() {
        let entry = MenuEntry::new("payroll-report").with_path("/reports?type=payroll");
        assert_eq!(entry.route(), Some("/reports"));
        assert_eq!(entry.query_requirement(), Some("type=payroll"));

        let plain = MenuEntry::new("reports").with_path("/reports");
        assert_eq!(plain.route(), Some("/reports"));
        assert_eq!(plain.query_requirement(), None);
    }

    #[test]
    fn accepts_camel_case_module_key() {
        let entry: MenuEntry = serde_json::from_value(serde_json::json!({
            "key": "staff",
            "path": "/staff",
            "moduleKey": "staff"
        }))
        .unwrap();
        assert_eq!(entry.module.as_deref(), Some("staff"));
        assert!(entry.children.is_empty());
    }
}
