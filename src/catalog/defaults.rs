//! Built-in HR module catalog, role defaults and sidebar menu.
//!
//! Everything here is plain data. A deployment can replace any part of it
//! with a JSON file (see `config.rs`); nothing mutates it at runtime.

use std::collections::BTreeMap;

use crate::authz::{actions, roles};
use crate::models::menu::MenuEntry;
use crate::models::permission::PermissionEntry;

use super::{ModuleSpec, SpecialGrant};

pub const CRUD: [&str; 4] = [actions::VIEW, actions::CREATE, actions::UPDATE, actions::DELETE];

pub fn modules() -> Vec<ModuleSpec> {
    vec![
        ModuleSpec::leaf("dashboard", "Dashboard"),
        ModuleSpec::parent("staff", "Staff", &["attendance", "leave_requests"]),
        ModuleSpec::leaf("attendance", "Attendance"),
        ModuleSpec::leaf("leave_requests", "Leave Requests"),
        ModuleSpec::parent(
            "payroll",
            "Payroll",
            &["salary_structure", "payslips"],
        ),
        ModuleSpec::parent(
            "interview",
            "Recruitment",
            &["job_openings", "candidates", "offer_letter"],
        ),
        ModuleSpec::parent("performance", "Performance", &["goals", "appraisals"]),
        ModuleSpec::parent("learning", "Learning", &["courses", "certifications"]),
        ModuleSpec::leaf("company-policy", "Company Policy"),
        ModuleSpec::leaf("announcements", "Announcements"),
        ModuleSpec::leaf("reports", "Reports"),
        ModuleSpec::parent("settings", "Settings", &["roles", "departments"]),
    ]
}

pub fn actions() -> Vec<String> {
    [
        "view",
        "read",
        "create",
        "update",
        "delete",
        "approve",
        "reject",
        "export",
        "import",
        "process",
        "publish",
        "schedule",
        "start_interview",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Verbs accepted by the old `module_action` encoding.
pub fn legacy_actions() -> Vec<String> {
    [
        actions::VIEW,
        actions::CREATE,
        actions::UPDATE,
        actions::DELETE,
        actions::APPROVE,
        actions::EXPORT,
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn action_aliases() -> BTreeMap<String, String> {
    pairs(&[("edit", "update"), ("add", "create"), ("remove", "delete")])
}

pub fn module_aliases() -> BTreeMap<String, String> {
    pairs(&[
        ("employees", "staff"),
        ("employee", "staff"),
        ("policies", "company-policy"),
        ("policy", "company-policy"),
        ("company_policies", "company-policy"),
        ("company_policy", "company-policy"),
        ("jobs", "job_openings"),
        ("job_opening", "job_openings"),
        ("candidate", "candidates"),
        ("offers", "offer_letter"),
        ("offer_letters", "offer_letter"),
        ("interviews", "interview"),
        ("recruitment", "interview"),
        ("leave", "leave_requests"),
        ("leaves", "leave_requests"),
        ("payslip", "payslips"),
        ("announcement", "announcements"),
        ("report", "reports"),
        ("training", "learning"),
    ])
}

/// Compound identifiers that do not follow `module_action`.
pub fn special_tokens() -> BTreeMap<String, SpecialGrant> {
    [
        ("start_interview", "candidates", actions::START_INTERVIEW),
        ("interview_start", "candidates", actions::START_INTERVIEW),
        ("schedule_interview", "interview", "schedule"),
        ("run_payroll", "payroll", "process"),
        ("approve_leave", "leave_requests", "approve"),
    ]
    .into_iter()
    .map(|(token, module, action)| {
        (
            token.to_string(),
            SpecialGrant {
                module: module.to_string(),
                action: action.to_string(),
            },
        )
    })
    .collect()
}

pub fn sentinel_role() -> String {
    roles::SUPER_ADMIN.to_string()
}

pub fn sidebar_role() -> String {
    roles::EMPLOYEE.to_string()
}

pub fn unrestricted_tokens() -> Vec<String> {
    ["*", "all", "full_access"].into_iter().map(String::from).collect()
}

/// Grants applied to system roles whose records carry no permissions at all.
pub fn role_defaults() -> BTreeMap<String, Vec<PermissionEntry>> {
    let mut defaults = BTreeMap::new();

    let admin = [
        "dashboard",
        "staff",
        "attendance",
        "leave_requests",
        "payroll",
        "interview",
        "performance",
        "learning",
        "company-policy",
        "announcements",
        "reports",
    ]
    .into_iter()
    .map(|module| PermissionEntry::new(module, CRUD))
    .collect();
    defaults.insert(roles::ADMIN.to_string(), admin);

    defaults.insert(
        roles::MANAGER.to_string(),
        vec![
            PermissionEntry::new("dashboard", ["view"]),
            PermissionEntry::new("staff", ["view"]),
            PermissionEntry::new("attendance", ["view", "approve"]),
            PermissionEntry::new("leave_requests", ["view", "approve", "reject"]),
            PermissionEntry::new("performance", ["view", "update"]),
            PermissionEntry::new("announcements", ["view"]),
            PermissionEntry::new("reports", ["view"]),
        ],
    );

    defaults.insert(
        roles::EMPLOYEE.to_string(),
        vec![
            PermissionEntry::new("dashboard", ["view"]),
            PermissionEntry::new("announcements", ["view"]),
            PermissionEntry::new("company-policy", ["view"]),
        ],
    );

    defaults
}

pub fn menu() -> Vec<MenuEntry> {
    vec![
        MenuEntry::new("dashboard")
            .with_label("Dashboard")
            .with_path("/dashboard")
            .with_module("dashboard"),
        MenuEntry::new("staff")
            .with_label("Staff")
            .with_path("/staff")
            .with_module("staff")
            .with_children(vec![
                MenuEntry::new("attendance")
                    .with_label("Attendance")
                    .with_path("/staff/attendance")
                    .with_module("attendance"),
                MenuEntry::new("leave_requests")
                    .with_label("Leave Requests")
                    .with_path("/staff/leave")
                    .with_module("leave_requests"),
            ]),
        MenuEntry::new("payroll")
            .with_label("Payroll")
            .with_path("/payroll")
            .with_module("payroll")
            .with_children(vec![
                MenuEntry::new("salary_structure")
                    .with_label("Salary Structure")
                    .with_path("/payroll/salary-structure")
                    .with_module("salary_structure"),
                MenuEntry::new("payslips")
                    .with_label("Payslips")
                    .with_path("/payroll/payslips")
                    .with_module("payslips"),
            ]),
        MenuEntry::new("interview")
            .with_label("Recruitment")
            .with_module("interview")
            .with_children(vec![
                MenuEntry::new("job_openings")
                    .with_label("Job Openings")
                    .with_path("/interview/job-openings")
                    .with_module("job_openings"),
                MenuEntry::new("candidates")
                    .with_label("Candidates")
                    .with_path("/interview/candidates")
                    .with_module("candidates"),
                MenuEntry::new("offer_letter")
                    .with_label("Offer Letters")
                    .with_path("/interview/offer-letters")
                    .with_module("offer_letter"),
            ]),
        MenuEntry::new("performance")
            .with_label("Performance")
            .with_path("/performance")
            .with_module("performance")
            .with_children(vec![
                MenuEntry::new("goals")
                    .with_label("Goals")
                    .with_path("/performance/goals")
                    .with_module("goals"),
                MenuEntry::new("appraisals")
                    .with_label("Appraisals")
                    .with_path("/performance/appraisals")
                    .with_module("appraisals"),
            ]),
        MenuEntry::new("learning")
            .with_label("Learning")
            .with_path("/learning")
            .with_module("learning")
            .with_children(vec![
                MenuEntry::new("courses")
                    .with_label("Courses")
                    .with_path("/learning/courses")
                    .with_module("courses"),
                MenuEntry::new("certifications")
                    .with_label("Certifications")
                    .with_path("/learning/certifications")
                    .with_module("certifications"),
            ]),
        MenuEntry::new("company-policy")
            .with_label("Company Policy")
            .with_path("/company-policy")
            .with_module("company-policy"),
        MenuEntry::new("announcements")
            .with_label("Announcements")
            .with_path("/announcements")
            .with_module("announcements"),
        MenuEntry::new("reports")
            .with_label("Reports")
            .with_path("/reports")
            .with_module("reports")
            .with_children(vec![
                MenuEntry::new("attendance_report")
                    .with_label("Attendance Report")
                    .with_path("/reports?type=attendance")
                    .with_module("attendance"),
                MenuEntry::new("payroll_report")
                    .with_label("Payroll Report")
                    .with_path("/reports?type=payroll")
                    .with_module("payroll"),
            ]),
        MenuEntry::new("settings")
            .with_label("Settings")
            .with_module("settings")
            .with_children(vec![
                MenuEntry::new("roles")
                    .with_label("Roles")
                    .with_path("/settings/roles")
                    .with_module("roles"),
                MenuEntry::new("departments")
                    .with_label("Departments")
                    .with_path("/settings/departments")
                    .with_module("departments"),
            ]),
        MenuEntry::new("profile")
            .with_label("My Profile")
            .with_path("/profile"),
    ]
}

fn pairs(items: &[(&str, &str)]) -> BTreeMap<String, String> {
    items
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}
