//! Property-based tests for entity validation.
//!
//! Uses proptest to verify that:
//! - Non-empty names within the length bound always pass
//! - Over-long names always fail
//! - type_id/status_id outside {0, 1, 2} always fail
//! - Unknown status values always render a fallback label, never panic

use proptest::prelude::*;
use trackstar::model::{Issue, IssueStatus, IssueType, Project};
use trackstar::validation::{IssueValidator, ProjectValidator};

fn valid_issue(name: &str) -> Issue {
    Issue::new(1, name)
}

proptest! {
    #[test]
    fn reasonable_project_names_pass(name in "[a-zA-Z0-9 ]{1,255}") {
        prop_assume!(!name.trim().is_empty());
        let project = Project::new(name, "a description");
        prop_assert!(ProjectValidator::validate(&project).is_ok());
    }

    #[test]
    fn over_long_project_names_fail(len in 256usize..600) {
        let project = Project::new("x".repeat(len), "a description");
        let errors = ProjectValidator::validate(&project).unwrap_err();
        prop_assert!(errors.iter().any(|e| e.field == "name"));
    }

    #[test]
    fn issue_type_outside_enumeration_fails(type_id in prop_oneof![-50i64..0, 3i64..50]) {
        let mut issue = valid_issue("typed");
        issue.type_id = type_id;
        let errors = IssueValidator::validate(&issue).unwrap_err();
        prop_assert!(errors.iter().any(|e| e.field == "type_id"));
    }

    #[test]
    fn issue_status_outside_enumeration_fails(status_id in prop_oneof![-50i64..0, 3i64..50]) {
        let mut issue = valid_issue("statused");
        issue.status_id = status_id;
        let errors = IssueValidator::validate(&issue).unwrap_err();
        prop_assert!(errors.iter().any(|e| e.field == "status_id"));
    }

    #[test]
    fn known_enumeration_values_pass(type_id in 0i64..3, status_id in 0i64..3) {
        let mut issue = valid_issue("in range");
        issue.type_id = type_id;
        issue.status_id = status_id;
        prop_assert!(IssueValidator::validate(&issue).is_ok());
    }

    #[test]
    fn unknown_status_renders_fallback_label(status_id in prop_oneof![i64::MIN..0, 3i64..i64::MAX]) {
        let mut issue = valid_issue("stale");
        issue.status_id = status_id;
        let text = issue.status_text();
        prop_assert!(text.contains("unknown status"));
        prop_assert!(text.contains(&status_id.to_string()));
    }

    #[test]
    fn known_status_renders_its_label(status_id in 0i64..3) {
        let mut issue = valid_issue("labelled");
        issue.status_id = status_id;
        let expected = IssueStatus::from_id(status_id).unwrap().label();
        prop_assert_eq!(issue.status_text(), expected);
    }

    #[test]
    fn known_type_renders_its_label(type_id in 0i64..3) {
        let mut issue = valid_issue("typed label");
        issue.type_id = type_id;
        let expected = IssueType::from_id(type_id).unwrap().label();
        prop_assert_eq!(issue.type_text(), expected);
    }
}

#[test]
fn status_99_fallback_contains_the_raw_value() {
    let mut issue = valid_issue("spec case");
    issue.status_id = 99;
    assert_eq!(issue.status_text(), "unknown status (99)");
}
