//! Permission normalizer.
//!
//! Turns one raw permission source into a [`PermissionList`]. Stored records
//! are not self-describing, so the input shape is detected in a fixed order:
//!
//! 1. sentinel role -> full access, nothing else is read
//! 2. structured `[{module, actions}]` list -> passed through, entries
//!    without any action are skipped
//! 3. flat list holding an unrestricted token -> full access for this source
//! 4. flat string list -> every token runs through [`TOKEN_RULES`]
//!
//! A single comma-separated string is read as a flat list.
//!
//! Tokens that no rule understands are dropped without error.

use serde_json::Value;

use crate::catalog::{canonical_key, AccessRules, ModuleCatalog};
use crate::models::permission::PermissionList;

/// A single `(module, action)` grant parsed out of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub module: String,
    pub action: String,
}

impl TokenGrant {
    fn new(module: &str, action: &str) -> Self {
        Self {
            module: module.to_string(),
            action: action.to_string(),
        }
    }
}

type TokenRule = fn(&ModuleCatalog, &AccessRules, &str) -> Option<TokenGrant>;

/// Parse attempts in precedence order; the first match wins.
pub const TOKEN_RULES: [(&str, TokenRule); 4] = [
    ("special", parse_special_token),
    ("dotted", parse_dotted_token),
    ("underscored", parse_underscored_token),
    ("fuzzy", fuzzy_module_match),
];

/// Normalizes `raw` for an actor holding `role`.
pub fn normalize(
    catalog: &ModuleCatalog,
    rules: &AccessRules,
    raw: &Value,
    role: &str,
) -> PermissionList {
    if crate::authz::roles::canonical(role) == rules.sentinel_role {
        return full_access(catalog);
    }

    if let Some(items) = raw.as_array() {
        if is_structured(items) {
            return normalize_structured(items);
        }
        let tokens: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
        return normalize_tokens(catalog, rules, &tokens);
    }

    if let Some(csv) = raw.as_str() {
        let tokens: Vec<&str> = csv.split(',').collect();
        return normalize_tokens(catalog, rules, &tokens);
    }

    tracing::trace!(raw = %raw, "ignoring permission source with unsupported shape");
    PermissionList::new()
}

/// Every catalog module with the full action vocabulary.
pub fn full_access(catalog: &ModuleCatalog) -> PermissionList {
    let mut list = PermissionList::new();
    for module in catalog.modules() {
        list.grant_all(module.key.clone(), catalog.actions().iter().cloned());
    }
    list
}

fn is_structured(items: &[Value]) -> bool {
    items
        .first()
        .and_then(Value::as_object)
        .map(|obj| {
            obj.get("module").map(Value::is_string).unwrap_or(false)
                && obj.get("actions").map(Value::is_array).unwrap_or(false)
        })
        .unwrap_or(false)
}

fn normalize_structured(items: &[Value]) -> PermissionList {
    let mut list = PermissionList::new();
    for item in items {
        let Some(module) = item.get("module").and_then(Value::as_str) else {
            continue;
        };
        let Some(actions) = item.get("actions").and_then(Value::as_array) else {
            continue;
        };
        let module = canonical_key(module);
        let actions: Vec<String> = actions
            .iter()
            .filter_map(Value::as_str)
            .map(canonical_key)
            .filter(|a| !a.is_empty())
            .collect();
        if module.is_empty() || actions.is_empty() {
            continue;
        }
        list.grant_all(module, actions);
    }
    list
}

fn normalize_tokens(catalog: &ModuleCatalog, rules: &AccessRules, raw_tokens: &[&str]) -> PermissionList {
    let tokens: Vec<String> = raw_tokens
        .iter()
        .map(|t| canonical_key(t))
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.iter().any(|t| rules.is_unrestricted_token(t)) {
        return full_access(catalog);
    }

    let mut list = PermissionList::new();
    for token in &tokens {
        match parse_token(catalog, rules, token) {
            Some(grant) => list.grant(grant.module, grant.action),
            None => tracing::trace!(token = %token, "dropping unparseable permission token"),
        }
    }
    list
}

/// Runs `token` through the rule chain. `token` must already be canonical.
pub fn parse_token(catalog: &ModuleCatalog, rules: &AccessRules, token: &str) -> Option<TokenGrant> {
    TOKEN_RULES
        .iter()
        .find_map(|(_, rule)| rule(catalog, rules, token))
}

fn parse_special_token(catalog: &ModuleCatalog, _rules: &AccessRules, token: &str) -> Option<TokenGrant> {
    catalog
        .special_token(token)
        .map(|grant| TokenGrant::new(&grant.module, &grant.action))
}

/// `module.action`, split on the first dot. Unknown actions read as `view`.
fn parse_dotted_token(catalog: &ModuleCatalog, _rules: &AccessRules, token: &str) -> Option<TokenGrant> {
    let (left, right) = token.split_once('.')?;
    let module = catalog.resolve_module(left)?;
    let action = catalog.canonical_action(right);
    let action = if catalog.is_action(action) { action } else { "view" };
    Some(TokenGrant::new(module, action))
}

/// `module_action`, split on the last underscore since keys embed underscores.
fn parse_underscored_token(catalog: &ModuleCatalog, _rules: &AccessRules, token: &str) -> Option<TokenGrant> {
    let (left, right) = token.rsplit_once('_')?;
    let module = catalog.resolve_module(left)?;
    let action = catalog.canonical_action(right);
    if !catalog.is_legacy_action(action) {
        return None;
    }
    Some(TokenGrant::new(module, action))
}

/// Last-resort match for irregular legacy data: the token is, or contains, a
/// known module key or alias. Always grants `view`.
///
/// Can report false positives when a module name happens to be a substring of
/// an unrelated token; disabled with `AccessRules::fuzzy_fallback = false`.
pub fn fuzzy_module_match(catalog: &ModuleCatalog, rules: &AccessRules, token: &str) -> Option<TokenGrant> {
    if !rules.fuzzy_fallback {
        return None;
    }

    if let Some(module) = catalog.resolve_module(token) {
        return Some(TokenGrant::new(module, "view"));
    }

    let (keyword, module) = catalog
        .fuzzy_keywords()
        .iter()
        .find(|(keyword, _)| token.contains(keyword.as_str()))?;

    tracing::debug!(
        token = %token,
        keyword = %keyword,
        module = %module,
        "fuzzy permission match"
    );
    Some(TokenGrant::new(module, "view"))
}
