use super::actions;
use crate::catalog::{ModuleCatalog, MAX_DEPTH};
use crate::models::permission::PermissionList;

/// Actions that count as "can see the module".
pub const VIEW_ACTIONS: [&str; 2] = [actions::VIEW, actions::READ];

/// Exact check: `list` holds `action` on `module`.
///
/// Keys are canonicalized when the list is built, so there is no case folding
/// or partial matching here.
pub fn has_action(list: &PermissionList, module: &str, action: &str) -> bool {
    list.contains(module, action)
}

/// Whether the actor can see `module`.
///
/// A parent is visible when any of its children is visible. The reverse does
/// not hold: holding only the parent does not make a child visible unless the
/// resolver expanded the parent grant.
pub fn can_view(catalog: &ModuleCatalog, list: &PermissionList, module: &str) -> bool {
    can_view_at(catalog, list, module, 0)
}

fn can_view_at(catalog: &ModuleCatalog, list: &PermissionList, module: &str, depth: usize) -> bool {
    if VIEW_ACTIONS
        .iter()
        .any(|action| has_action(list, module, action))
    {
        return true;
    }

    if depth >= MAX_DEPTH {
        return false;
    }

    catalog
        .children(module)
        .iter()
        .any(|child| can_view_at(catalog, list, child, depth + 1))
}
