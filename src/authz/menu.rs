//! Menu specificity resolution.
//!
//! Picks the single menu entry that best matches the current location.
//! Ranking, highest first:
//! 1. exact path match over `prefix + "/"` match
//! 2. longer authored path (query requirement included)
//! 3. earlier position in a pre-order walk of the tree
//!
//! Entries whose module the actor cannot view are removed together with their
//! subtree before matching. Entries without a module tag always take part.

use std::cmp::{Ordering, Reverse};

use super::evaluator::can_view;
use crate::catalog::{canonical_key, ModuleCatalog};
use crate::models::menu::{ActiveMenu, MenuEntry};
use crate::models::permission::PermissionList;

#[derive(Debug)]
struct Candidate<'a> {
    top_level: &'a MenuEntry,
    entry: &'a MenuEntry,
    depth: usize,
    position: usize,
    exact: bool,
}

impl Candidate<'_> {
    fn rank_key(&self) -> (bool, Reverse<usize>, usize) {
        let authored_len = self.entry.path.as_deref().map(str::len).unwrap_or(0);
        (!self.exact, Reverse(authored_len), self.position)
    }
}

/// Location being rendered, with the query string split off.
#[derive(Debug, Clone, Copy)]
struct Location<'a> {
    path: &'a str,
    query: &'a str,
}

impl<'a> Location<'a> {
    fn new(path: &'a str, query: &'a str) -> Self {
        let (path, inline_query) = path.split_once('?').unwrap_or((path, ""));
        let query = if query.is_empty() { inline_query } else { query };
        Self {
            path: trim_trailing_slash(path),
            query: query.trim_start_matches('?'),
        }
    }

    /// `Some(true)` for an exact match, `Some(false)` for a segment prefix.
    fn match_route(&self, route: &str) -> Option<bool> {
        let route = trim_trailing_slash(route);
        if route.is_empty() {
            return None;
        }
        if self.path == route {
            return Some(true);
        }
        self.path
            .strip_prefix(route)
            .filter(|rest| rest.starts_with('/'))
            .map(|_| false)
    }
}

/// Determines which top-level group is expanded and which nested entry is
/// active for `path` and `query`. No match yields an empty [`ActiveMenu`].
pub fn resolve_active_menu(
    catalog: &ModuleCatalog,
    path: &str,
    query: &str,
    tree: &[MenuEntry],
    list: &PermissionList,
) -> ActiveMenu {
    let location = Location::new(path, query);
    let mut candidates = Vec::new();
    let mut position = 0;

    for top_level in tree {
        collect_candidates(
            catalog,
            list,
            &location,
            top_level,
            top_level,
            0,
            &mut position,
            &mut candidates,
        );
    }

    let winner = candidates
        .into_iter()
        .min_by(|a, b| compare(a, b));

    match winner {
        Some(candidate) => {
            tracing::trace!(
                path = %location.path,
                entry = %candidate.entry.key,
                exact = candidate.exact,
                "active menu entry"
            );
            ActiveMenu {
                active_top_level: Some(candidate.top_level.key.clone()),
                active_sub_entry: (candidate.depth > 0).then(|| candidate.entry.key.clone()),
            }
        }
        None => ActiveMenu::default(),
    }
}

fn compare(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.rank_key().cmp(&b.rank_key())
}

#[allow(clippy::too_many_arguments)]
fn collect_candidates<'a>(
    catalog: &ModuleCatalog,
    list: &PermissionList,
    location: &Location<'_>,
    top_level: &'a MenuEntry,
    entry: &'a MenuEntry,
    depth: usize,
    position: &mut usize,
    out: &mut Vec<Candidate<'a>>,
) {
    if !is_entry_visible(catalog, list, entry) {
        return;
    }

    let current = *position;
    *position += 1;

    if let Some(exact) = entry.route().and_then(|route| location.match_route(route)) {
        let query_ok = entry
            .query_requirement()
            .map(|required| location.query.contains(required))
            .unwrap_or(true);
        if query_ok {
            out.push(Candidate {
                top_level,
                entry,
                depth,
                position: current,
                exact,
            });
        }
    }

    for child in &entry.children {
        collect_candidates(catalog, list, location, top_level, child, depth + 1, position, out);
    }
}

/// Menu tree as the actor should see it in the sidebar.
///
/// Group headers (no path) whose children were all filtered out are dropped.
pub fn visible_menu(catalog: &ModuleCatalog, tree: &[MenuEntry], list: &PermissionList) -> Vec<MenuEntry> {
    tree.iter()
        .filter_map(|entry| filter_entry(catalog, list, entry))
        .collect()
}

fn filter_entry(catalog: &ModuleCatalog, list: &PermissionList, entry: &MenuEntry) -> Option<MenuEntry> {
    if !is_entry_visible(catalog, list, entry) {
        return None;
    }

    let children: Vec<MenuEntry> = entry
        .children
        .iter()
        .filter_map(|child| filter_entry(catalog, list, child))
        .collect();

    if entry.path.is_none() && !entry.children.is_empty() && children.is_empty() {
        return None;
    }

    Some(MenuEntry {
        children,
        ..entry.clone()
    })
}

fn is_entry_visible(catalog: &ModuleCatalog, list: &PermissionList, entry: &MenuEntry) -> bool {
    entry
        .module
        .as_deref()
        .map(|module| can_view(catalog, list, &canonical_key(module)))
        .unwrap_or(true)
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}
