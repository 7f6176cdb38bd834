use serde_json::{json, Value};

use hr_access::authz::{Actor, AuthzEngine, CustomRole, PermissionSource};
use hr_access::catalog::{defaults, CatalogConfig};
use hr_access::models::permission::{PermissionEntry, PermissionList};

fn engine() -> AuthzEngine {
    AuthzEngine::hr_default()
}

#[test]
fn sentinel_role_sees_everything_despite_malformed_records() {
    let engine = engine();
    let actor = Actor::new("SUPER_ADMIN")
        .with_direct_permissions(json!(42))
        .with_sidebar_permissions(json!([{"module": 7}]));

    let list = engine.resolve(&actor);
    for module in engine.catalog().modules() {
        assert!(engine.can_view(&list, &module.key), "cannot view {}", module.key);
        for action in engine.catalog().actions() {
            assert!(
                engine.has_action(&list, &module.key, action),
                "missing {} on {}",
                action,
                module.key
            );
        }
    }
}

#[test]
fn normalizing_a_canonical_list_is_idempotent() -> anyhow::Result<()> {
    let engine = engine();
    let once = engine.normalize(
        &json!(["staff_view", "job_openings.create", "Payroll.Edit", "start_interview"]),
        "Manager",
    );
    let as_raw: Value = serde_json::to_value(&once)?;
    let twice = engine.normalize(&as_raw, "Manager");
    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn sources_are_unioned_not_replaced() {
    let engine = engine();
    let actor = Actor::new("Employee")
        .with_sidebar_permissions(json!([{"module": "announcements", "actions": ["view"]}]))
        .with_direct_permissions(json!([{"module": "announcements", "actions": ["create"]}]));

    let resolution = engine.resolve_detailed(&actor, None);
    assert_eq!(
        resolution.permissions.to_entries(),
        vec![PermissionEntry::new("announcements", ["create", "view"])]
    );
    assert_eq!(
        resolution.sources,
        vec![PermissionSource::Sidebar, PermissionSource::Direct]
    );
}

#[test]
fn parent_grant_expands_to_children() {
    let engine = engine();
    let actor = Actor::new("Manager").with_direct_permissions(json!(["interview.view"]));

    let list = engine.resolve(&actor);
    assert!(engine.can_view(&list, "candidates"));
    assert!(engine.can_view(&list, "job_openings"));
    assert!(engine.can_view(&list, "offer_letter"));
}

#[test]
fn unexpanded_parent_grant_does_not_reveal_children() {
    let engine = engine();
    let list = engine.normalize(&json!(["interview.view"]), "Manager");

    assert!(engine.can_view(&list, "interview"));
    assert!(!engine.can_view(&list, "candidates"));
}

#[test]
fn child_grant_reveals_parent_group_but_not_parent_action() {
    let engine = engine();
    let actor = Actor::new("Manager").with_direct_permissions(json!(["candidates.view"]));

    let list = engine.resolve(&actor);
    assert!(!engine.has_action(&list, "interview", "view"));
    assert!(engine.can_view(&list, "interview"));
    assert!(!engine.can_view(&list, "payroll"));
}

#[test]
fn dotted_and_underscored_tokens_agree() {
    let engine = engine();
    let dotted = engine.normalize(&json!(["job_openings.view"]), "Manager");
    let underscored = engine.normalize(&json!(["job_openings_view"]), "Manager");

    let expected: PermissionList = vec![PermissionEntry::new("job_openings", ["view"])].into();
    assert_eq!(dotted, expected);
    assert_eq!(underscored, expected);
}

#[test]
fn garbage_tokens_do_not_disturb_valid_ones() {
    let engine = engine();
    let list = engine.normalize(&json!(["???", "staff_view"]), "Manager");

    assert_eq!(list.to_entries(), vec![PermissionEntry::new("staff", ["view"])]);
}

#[test]
fn comma_separated_string_is_accepted() {
    let engine = engine();
    let list = engine.normalize(&json!("staff_view, payroll.export ,"), "Manager");

    assert!(list.contains("staff", "view"));
    assert!(list.contains("payroll", "export"));
    assert_eq!(list.len(), 2);
}

#[test]
fn role_defaults_apply_only_when_records_are_empty() {
    let engine = engine();

    let bare = engine.resolve_detailed(&Actor::new("Manager"), None);
    assert_eq!(bare.sources, vec![PermissionSource::RoleDefault]);
    assert!(bare.permissions.contains("leave_requests", "approve"));

    let granted = engine.resolve_detailed(
        &Actor::new("Manager").with_direct_permissions(json!(["staff_view"])),
        None,
    );
    assert!(!granted.permissions.contains("leave_requests", "approve"));
}

#[test]
fn garbage_only_source_resolves_to_no_access() {
    let engine = engine();
    let actor = Actor::new("Employee").with_direct_permissions(json!(["???"]));

    let resolution = engine.resolve_detailed(&actor, None);
    assert!(resolution.permissions.is_empty());
    assert!(resolution.sources.is_empty());
    assert!(!engine.can_view(&resolution.permissions, "dashboard"));
}

#[test]
fn template_listing_a_parent_without_actions_grants_nothing() {
    let engine = engine();
    let actor = Actor::new("Payroll Clerk").with_custom_role(CustomRole::inline(json!([
        {"module": "payroll", "actions": []}
    ])));

    let list = engine.resolve(&actor);
    assert!(list.is_empty());
    assert!(!engine.can_view(&list, "payroll"));
    assert!(!engine.can_view(&list, "payslips"));
    assert!(!engine.can_view(&list, "salary_structure"));
}

#[test]
fn unrestricted_token_grants_full_access_for_its_source() {
    let engine = engine();
    let actor = Actor::new("Manager").with_direct_permissions(json!(["staff_view", "*"]));

    let resolution = engine.resolve_detailed(&actor, None);
    assert!(resolution.unrestricted);
    assert!(engine.has_action(&resolution.permissions, "payroll", "process"));
}

#[test]
fn inline_custom_role_template_is_merged() {
    let engine = engine();
    let actor = Actor::new("Employee")
        .with_sidebar_permissions(json!(["dashboard"]))
        .with_custom_role(CustomRole::inline(json!([
            {"module": "learning", "actions": ["view", "create"]}
        ])));

    let list = engine.resolve(&actor);
    assert!(list.contains("dashboard", "view"));
    assert!(list.contains("learning", "create"));
    assert!(list.contains("courses", "view"));
    assert!(!list.contains("courses", "create"));
}

#[test]
fn fuzzy_fallback_can_be_disabled() -> anyhow::Result<()> {
    let token = json!(["payroll_manager_access"]);

    let lenient = engine().normalize(&token, "Manager");
    assert!(lenient.contains("payroll", "view"));

    let (catalog, mut rules) = CatalogConfig::default().build()?;
    rules.fuzzy_fallback = false;
    let strict = AuthzEngine::new(catalog, rules, defaults::menu());
    assert!(strict.normalize(&token, "Manager").is_empty());

    Ok(())
}
