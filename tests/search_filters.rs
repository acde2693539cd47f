//! Search semantics: substring matching for string fields, exact matching
//! for id fields, and the hard project scope on issue listings.

mod common;

use common::{fixtures, test_db};
use trackstar::model::Issue;
use trackstar::service::{IssueService, ProjectService};
use trackstar::storage::{IssueFilters, ProjectFilters};

#[test]
fn project_name_filter_matches_substrings() {
    let mut store = test_db();
    fixtures::saved_project(&mut store, "Website refresh");
    fixtures::saved_project(&mut store, "Mobile website");
    fixtures::saved_project(&mut store, "Data pipeline");

    let identity = fixtures::identity();
    let roles = fixtures::roles();
    let service = ProjectService::new(&mut store, &identity, &roles);

    let found = service
        .search(&ProjectFilters {
            name: Some("website".to_string()),
            ..ProjectFilters::default()
        })
        .unwrap();
    // SQLite LIKE is case-insensitive for ASCII.
    assert_eq!(found.len(), 2);
}

#[test]
fn project_user_filter_matches_exactly() {
    let mut store = test_db();
    fixtures::saved_project(&mut store, "Owned");

    let identity = fixtures::identity();
    let roles = fixtures::roles();
    let service = ProjectService::new(&mut store, &identity, &roles);

    assert_eq!(
        service
            .search(&ProjectFilters {
                create_user_id: Some(1),
                ..ProjectFilters::default()
            })
            .unwrap()
            .len(),
        1
    );
    assert!(
        service
            .search(&ProjectFilters {
                create_user_id: Some(12),
                ..ProjectFilters::default()
            })
            .unwrap()
            .is_empty()
    );
}

#[test]
fn combined_project_filters_are_conjunctive() {
    let mut store = test_db();
    fixtures::saved_project(&mut store, "Alpha");
    fixtures::saved_project(&mut store, "Alphabet");

    let identity = fixtures::identity();
    let roles = fixtures::roles();
    let service = ProjectService::new(&mut store, &identity, &roles);

    let found = service
        .search(&ProjectFilters {
            name: Some("Alpha".to_string()),
            description: Some("Alphabet".to_string()),
            ..ProjectFilters::default()
        })
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Alphabet");
}

#[test]
fn issue_search_is_always_scoped_to_the_project() {
    let mut store = test_db();
    let p1 = fixtures::saved_project(&mut store, "First");
    let p2 = fixtures::saved_project(&mut store, "Second");

    let identity = fixtures::identity();
    {
        let mut service = IssueService::new(&mut store, &identity);
        for (project_id, name) in [(p1, "login bug"), (p1, "signup bug"), (p2, "login bug")] {
            let mut issue = Issue::new(project_id, name);
            service.save(&mut issue).unwrap();
        }
    }

    let service = IssueService::new(&mut store, &identity);

    // No filters: everything in p1, nothing from p2.
    let all_p1 = service.search(p1, &IssueFilters::default()).unwrap();
    assert_eq!(all_p1.len(), 2);
    assert!(all_p1.iter().all(|i| i.project_id == p1));

    // A name filter matching rows in both projects still honors the scope.
    let login_p1 = service
        .search(
            p1,
            &IssueFilters {
                name: Some("login".to_string()),
                ..IssueFilters::default()
            },
        )
        .unwrap();
    assert_eq!(login_p1.len(), 1);
    assert_eq!(login_p1[0].project_id, p1);
}

#[test]
fn issue_filters_combine_exact_and_substring_matching() {
    let mut store = test_db();
    let project_id = fixtures::saved_project(&mut store, "Filtered");

    let identity = fixtures::identity();
    {
        let mut service = IssueService::new(&mut store, &identity);

        let mut bug = Issue::new(project_id, "crash on save");
        bug.type_id = 0;
        bug.status_id = 1;
        bug.owner_id = Some(4);
        service.save(&mut bug).unwrap();

        let mut task = Issue::new(project_id, "crash course docs");
        task.type_id = 2;
        service.save(&mut task).unwrap();
    }

    let service = IssueService::new(&mut store, &identity);

    let by_type = service
        .search(
            project_id,
            &IssueFilters {
                name: Some("crash".to_string()),
                type_id: Some(0),
                ..IssueFilters::default()
            },
        )
        .unwrap();
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[0].name, "crash on save");

    let by_owner = service
        .search(
            project_id,
            &IssueFilters {
                owner_id: Some(4),
                status_id: Some(1),
                ..IssueFilters::default()
            },
        )
        .unwrap();
    assert_eq!(by_owner.len(), 1);
}

#[test]
fn empty_filters_return_all_projects() {
    let mut store = test_db();
    fixtures::saved_project(&mut store, "A");
    fixtures::saved_project(&mut store, "B");

    let identity = fixtures::identity();
    let roles = fixtures::roles();
    let service = ProjectService::new(&mut store, &identity, &roles);
    assert_eq!(service.search(&ProjectFilters::default()).unwrap().len(), 2);
}
