use hr_access::authz::AuthzEngine;
use hr_access::models::menu::{ActiveMenu, MenuEntry};
use hr_access::models::permission::{PermissionEntry, PermissionList};

fn grants(modules: &[&str]) -> PermissionList {
    modules
        .iter()
        .map(|module| PermissionEntry::new(*module, ["view"]))
        .collect()
}

fn active(top: &str, sub: Option<&str>) -> ActiveMenu {
    ActiveMenu {
        active_top_level: Some(top.to_string()),
        active_sub_entry: sub.map(str::to_string),
    }
}

#[test]
fn longer_prefix_wins_over_ancestor() {
    let engine = AuthzEngine::hr_default();
    let tree = vec![MenuEntry::new("staff")
        .with_path("/staff")
        .with_module("staff")
        .with_children(vec![MenuEntry::new("attendance")
            .with_path("/staff/attendance")
            .with_module("attendance")])];
    let list = grants(&["staff", "attendance"]);

    let result = engine.resolve_active_menu("/staff/attendance/today", "", &tree, &list);
    assert_eq!(result, active("staff", Some("attendance")));
}

#[test]
fn longer_prefix_wins_across_top_level_entries() {
    let engine = AuthzEngine::hr_default();
    let tree = vec![
        MenuEntry::new("staff").with_path("/staff"),
        MenuEntry::new("attendance").with_path("/staff/attendance"),
    ];

    let result = engine.resolve_active_menu("/staff/attendance/today", "", &tree, &PermissionList::new());
    assert_eq!(result, active("attendance", None));
}

#[test]
fn duplicate_paths_pick_the_first_registered_entry() {
    let engine = AuthzEngine::hr_default();
    let tree = vec![
        MenuEntry::new("performance").with_path("/performance"),
        MenuEntry::new("performance_copy").with_path("/performance"),
    ];

    for _ in 0..3 {
        let result = engine.resolve_active_menu("/performance", "", &tree, &PermissionList::new());
        assert_eq!(result, active("performance", None));
    }
}

#[test]
fn exact_match_outranks_longer_prefix_match() {
    let engine = AuthzEngine::hr_default();
    let tree = vec![
        MenuEntry::new("section").with_path("/section///////"),
        MenuEntry::new("page").with_path("/section/page"),
    ];

    let result = engine.resolve_active_menu("/section/page", "", &tree, &PermissionList::new());
    assert_eq!(result, active("page", None));
}

#[test]
fn trailing_slashes_are_ignored() {
    let engine = AuthzEngine::hr_default();
    let tree = vec![MenuEntry::new("goals").with_path("/performance/goals/")];

    let result = engine.resolve_active_menu("/performance/goals", "", &tree, &PermissionList::new());
    assert_eq!(result, active("goals", None));
}

#[test]
fn prefix_must_end_on_a_segment_boundary() {
    let engine = AuthzEngine::hr_default();
    let tree = vec![MenuEntry::new("staff").with_path("/staff")];

    let result = engine.resolve_active_menu("/staffing", "", &tree, &PermissionList::new());
    assert_eq!(result, ActiveMenu::default());
}

#[test]
fn query_requirement_selects_report_entry() {
    let engine = AuthzEngine::hr_default();
    let list = grants(&["reports", "payroll", "attendance"]);

    let payroll = engine.active_menu("/reports", "type=payroll", &list);
    assert_eq!(payroll, active("reports", Some("payroll_report")));

    let inline = engine.active_menu("/reports?type=attendance", "", &list);
    assert_eq!(inline, active("reports", Some("attendance_report")));

    let plain = engine.active_menu("/reports", "", &list);
    assert_eq!(plain, active("reports", None));
}

#[test]
fn invisible_entries_are_pruned_with_their_subtree() {
    let engine = AuthzEngine::hr_default();
    let list = grants(&["reports", "attendance"]);

    // payroll is not viewable, so its report entry cannot win
    let result = engine.active_menu("/reports", "type=payroll", &list);
    assert_eq!(result, active("reports", None));

    // the whole payroll group is hidden
    let result = engine.active_menu("/payroll/payslips", "", &list);
    assert_eq!(result, ActiveMenu::default());
}

#[test]
fn untagged_entries_always_match() {
    let engine = AuthzEngine::hr_default();

    let result = engine.active_menu("/profile/", "", &PermissionList::new());
    assert_eq!(result, active("profile", None));
}

#[test]
fn group_header_shows_when_any_child_is_visible() {
    let engine = AuthzEngine::hr_default();
    let list = grants(&["candidates"]);

    let menu = engine.visible_menu(&list);
    let interview = menu
        .iter()
        .find(|entry| entry.key == "interview")
        .expect("recruitment group should be visible");
    let children: Vec<&str> = interview.children.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(children, ["candidates"]);

    let active = engine.active_menu("/interview/candidates/42", "", &list);
    assert_eq!(active.active_top_level.as_deref(), Some("interview"));
    assert_eq!(active.active_sub_entry.as_deref(), Some("candidates"));
}

#[test]
fn visible_menu_hides_groups_without_visible_children() {
    let engine = AuthzEngine::hr_default();

    let menu = engine.visible_menu(&grants(&["dashboard"]));
    let keys: Vec<&str> = menu.iter().map(|entry| entry.key.as_str()).collect();
    assert_eq!(keys, ["dashboard", "profile"]);
}

#[test]
fn child_grant_alone_keeps_nested_entry_reachable() {
    let engine = AuthzEngine::hr_default();
    let list = grants(&["attendance"]);

    let result = engine.active_menu("/staff/attendance", "", &list);
    assert_eq!(result, active("staff", Some("attendance")));

    let menu = engine.visible_menu(&list);
    let staff = menu
        .iter()
        .find(|entry| entry.key == "staff")
        .expect("staff group should be visible through attendance");
    let children: Vec<&str> = staff.children.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(children, ["attendance"]);
}
