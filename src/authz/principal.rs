use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Actor represents the authenticated subject being authorized.
///
/// Permission fields are kept as raw JSON: stored records use several
/// encodings and the normalizer decides how to read each one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    #[serde(default, alias = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[schema(example = "Manager")]
    pub role: String,
    #[serde(default, alias = "directPermissions", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object, example = json!(["staff_view", "job_openings.create"]))]
    pub direct_permissions: Option<Value>,
    #[serde(default, alias = "sidebarPermissions", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object, example = json!(["dashboard", "staff"]))]
    pub sidebar_permissions: Option<Value>,
    #[serde(default, alias = "customRole", skip_serializing_if = "Option::is_none")]
    pub custom_role: Option<CustomRole>,
}

/// Reference to a custom role, optionally carrying its permission template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CustomRole {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object, example = json!([{"module": "payroll", "actions": ["view"]}]))]
    pub permissions: Option<Value>,
}

impl Actor {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Self::default()
        }
    }

    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_direct_permissions(mut self, raw: Value) -> Self {
        self.direct_permissions = Some(raw);
        self
    }

    pub fn with_sidebar_permissions(mut self, raw: Value) -> Self {
        self.sidebar_permissions = Some(raw);
        self
    }

    pub fn with_custom_role(mut self, custom_role: CustomRole) -> Self {
        self.custom_role = Some(custom_role);
        self
    }

    /// Role label in canonical form (`"Super Admin"` -> `super_admin`).
    pub fn canonical_role(&self) -> String {
        super::roles::canonical(&self.role)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.canonical_role() == super::roles::canonical(role)
    }

    /// Inline template carried on the custom-role reference, if any.
    pub fn inline_template(&self) -> Option<&Value> {
        self.custom_role.as_ref().and_then(|r| r.permissions.as_ref())
    }

    /// Custom role that must be looked up in a template store.
    pub fn template_reference(&self) -> Option<&str> {
        self.custom_role
            .as_ref()
            .filter(|r| r.permissions.is_none())
            .and_then(|r| r.id.as_deref())
    }
}

impl CustomRole {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn inline(permissions: Value) -> Self {
        Self {
            permissions: Some(permissions),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_external_camel_case_record() {
        let actor: Actor = serde_json::from_value(json!({
            "role": "Employee",
            "directPermissions": ["staff_view"],
            "sidebarPermissions": ["dashboard"],
            "customRole": {"_id": "r-1"}
        }))
        .unwrap();

        assert!(actor.has_role("employee"));
        assert_eq!(actor.direct_permissions, Some(json!(["staff_view"])));
        assert_eq!(actor.template_reference(), Some("r-1"));
        assert!(actor.inline_template().is_none());
    }

    #[test]
    fn inline_template_wins_over_reference() {
        let actor = Actor::new("Manager").with_custom_role(CustomRole {
            id: Some("r-2".into()),
            name: None,
            permissions: Some(json!([])),
        });
        assert!(actor.inline_template().is_some());
        assert_eq!(actor.template_reference(), None);
    }
}
