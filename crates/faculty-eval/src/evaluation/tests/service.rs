use super::common::*;
use crate::evaluation::domain::{FacultyId, Review, ReviewId};
use crate::evaluation::repository::RepositoryError;
use crate::evaluation::service::{ReviewFilter, ReviewServiceError};
use crate::evaluation::Ratings;
use serde_json::json;

#[test]
fn submission_is_scored_from_valid_ratings() {
    let (service, repository) = build_service(Vec::new(), Vec::new());
    let mut input = submission(
        ("Dr. Smith", "Physics"),
        ratings(&[
            ("conceptExplanation", json!(5)),
            ("classTiming", json!(4)),
            ("innovation", json!(0)),
        ]),
    );
    input.overall_evaluation = Some(1.0);

    let stored = service.submit(input).expect("submission accepted");

    assert!(stored.id.0.starts_with("rev-"));
    assert_eq!(stored.overall_evaluation, Some(4.5));
    assert_eq!(stored.ratings.len(), 3);
    assert_eq!(stored.suggestions, "More worked examples");
    assert!(repository.stored(&stored.id.0).is_some());
}

#[test]
fn submission_without_ratings_keeps_supplied_overall() {
    let (service, _) = build_service(Vec::new(), Vec::new());
    let mut input = submission(("Dr. Smith", "Physics"), Ratings::new());
    input.overall_evaluation = Some(3.8);

    let stored = service.submit(input).expect("submission accepted");

    assert_eq!(stored.overall_evaluation, Some(3.8));
}

#[test]
fn submission_requires_faculty_identity() {
    let (service, _) = build_service(Vec::new(), Vec::new());

    let err = service
        .submit(submission(("  ", "Physics"), scores(&[4])))
        .expect_err("blank name rejected");
    assert!(matches!(err, ReviewServiceError::Invalid(_)));

    let err = service
        .submit(submission(("Dr. Smith", ""), scores(&[4])))
        .expect_err("blank department rejected");
    assert!(matches!(err, ReviewServiceError::Invalid(_)));
}

#[test]
fn submissions_receive_distinct_ids() {
    let (service, _) = build_service(Vec::new(), Vec::new());

    let first = service
        .submit(submission(("Dr. Smith", "Physics"), scores(&[4])))
        .expect("first");
    let second = service
        .submit(submission(("Dr. Smith", "Physics"), scores(&[4])))
        .expect("second");

    assert_ne!(first.id, second.id);
}

#[test]
fn update_rescores_and_keeps_identity() {
    let original = review("r1", ("Dr. Smith", "Physics"), scores(&[2, 2]), Some(2.0));
    let created_at = original.created_at;
    let (service, repository) = build_service(vec![original], Vec::new());

    let updated = service
        .update(
            &ReviewId::from("r1"),
            submission(("Dr. Smith", "Physics"), scores(&[5, 4, 4])),
        )
        .expect("update succeeds");

    assert_eq!(updated.id, ReviewId::from("r1"));
    assert_eq!(updated.created_at, created_at);
    assert_eq!(updated.overall_evaluation, Some(4.3));
    assert_eq!(updated.student_identifier, "ADM-2021-044");
    assert_eq!(
        repository.stored("r1").and_then(|review| review.overall_evaluation),
        Some(4.3)
    );
}

#[test]
fn update_of_missing_review_is_not_found() {
    let (service, repository) = build_service(Vec::new(), Vec::new());

    let err = service
        .update(
            &ReviewId::from("missing"),
            submission(("Dr. Smith", "Physics"), scores(&[4])),
        )
        .expect_err("missing review");

    assert!(matches!(
        err,
        ReviewServiceError::Repository(RepositoryError::NotFound)
    ));
    assert!(repository.replace_calls().is_empty());
}

#[test]
fn delete_removes_and_reports_missing() {
    let (service, repository) = build_service(
        vec![review("r1", ("Dr. Smith", "Physics"), scores(&[4]), Some(4.0))],
        Vec::new(),
    );

    let removed = service.delete(&ReviewId::from("r1")).expect("delete");
    assert_eq!(removed.id, ReviewId::from("r1"));
    assert!(repository.stored("r1").is_none());

    let err = service
        .delete(&ReviewId::from("r1"))
        .expect_err("already deleted");
    assert!(matches!(
        err,
        ReviewServiceError::Repository(RepositoryError::NotFound)
    ));
    assert!(matches!(
        service.get(&ReviewId::from("r1")),
        Err(ReviewServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn filter_matches_normalised_faculty_and_optional_branch() {
    let mut other_branch = review("r2", ("dr. smith", "PHYSICS"), scores(&[3]), Some(3.0));
    other_branch.branch_semester = Some("ECE-3".to_string());
    let (service, _) = build_service(
        vec![
            review("r1", ("Dr. Smith", "Physics"), scores(&[4]), Some(4.0)),
            other_branch,
            review("r3", ("Dr. Iyer", "Math"), scores(&[5]), Some(5.0)),
        ],
        Vec::new(),
    );

    let all = service
        .filter(&ReviewFilter {
            faculty_name: "Dr. Smith ".to_string(),
            faculty_department: "physics".to_string(),
            branch_semester: None,
        })
        .expect("filter");
    let ids: Vec<&str> = all.iter().map(|review| review.id.0.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2"]);

    let narrowed = service
        .filter(&ReviewFilter {
            faculty_name: "Dr. Smith".to_string(),
            faculty_department: "Physics".to_string(),
            branch_semester: Some(" ECE-3 ".to_string()),
        })
        .expect("filter");
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].id, ReviewId::from("r2"));
}

#[test]
fn filter_accepts_legacy_field_names() {
    let filter: ReviewFilter = serde_json::from_value(json!({
        "teacherName": "Dr. Smith",
        "teacherDepartment": "Physics"
    }))
    .expect("legacy filter body");

    assert_eq!(filter.faculty_name, "Dr. Smith");
    assert_eq!(filter.branch_semester, None);
}

#[test]
fn import_keeps_stored_scores_and_fills_blank_ids() {
    let (service, repository) = build_service(Vec::new(), Vec::new());
    let unnamed = review(" ", ("Dr. Smith", "Physics"), scores(&[5, 5]), Some(1.7));
    let legacy = review("legacy-1", ("Dr. Smith", "Physics"), scores(&[4]), Some(1.2));

    let imported = service.import(vec![legacy, unnamed]).expect("import");

    assert_eq!(imported, 2);
    let listed: Vec<Review> = service.list().expect("list");
    assert_eq!(listed[0].overall_evaluation, Some(1.2));
    assert!(listed[1].id.0.starts_with("rev-"));
    assert_eq!(listed[1].overall_evaluation, Some(1.7));
    assert!(repository.stored("legacy-1").is_some());

    let err = service
        .import(vec![review("legacy-1", ("Dr. Smith", "Physics"), scores(&[4]), None)])
        .expect_err("duplicate id");
    assert!(matches!(
        err,
        ReviewServiceError::Repository(RepositoryError::Conflict)
    ));
}

#[test]
fn submissions_after_import_skip_imported_ids() {
    let (service, _) = build_service(Vec::new(), Vec::new());
    let first = service
        .submit(submission(("Dr. Smith", "Physics"), scores(&[4])))
        .expect("first submit");
    assert_eq!(first.id, ReviewId::from("rev-000001"));

    service
        .import(vec![
            review("rev-000002", ("Dr. Smith", "Physics"), scores(&[3]), Some(3.0)),
            review("rev-000040", ("Dr. Smith", "Physics"), scores(&[5]), Some(5.0)),
            review("rev-x", ("Dr. Smith", "Physics"), scores(&[5]), Some(5.0)),
        ])
        .expect("import");

    let next = service
        .submit(submission(("Dr. Smith", "Physics"), scores(&[4])))
        .expect("submit after import");
    assert_eq!(next.id, ReviewId::from("rev-000041"));
    assert_eq!(service.list().expect("list").len(), 5);
}

#[test]
fn roster_registration_validates_and_rejects_duplicates() {
    let (service, _) = build_service(Vec::new(), vec![member("Dr. Smith", "Physics")]);

    let err = service
        .register_faculty(member(" ", "Physics"))
        .expect_err("blank name");
    assert!(matches!(err, ReviewServiceError::Invalid(_)));

    let err = service
        .register_faculty(member("dr. smith", "PHYSICS"))
        .expect_err("duplicate");
    assert!(matches!(
        err,
        ReviewServiceError::Repository(RepositoryError::Conflict)
    ));

    let iyer = service
        .register_faculty(member("Dr. Iyer", "Math"))
        .expect("new member");
    assert!(iyer.id.0.starts_with("fac-"));
    assert_eq!(service.roster().expect("roster").len(), 2);
}

#[test]
fn renaming_a_roster_entry_rematches_drifted_reviews() {
    let (service, _) = build_service(
        vec![review("r1", ("Dr S. Rao", "Physics"), scores(&[4]), Some(4.0))],
        Vec::new(),
    );
    let registered = service
        .register_faculty(member("Dr. Rao", "Physics"))
        .expect("register");
    assert_eq!(registered.id, FacultyId::from("fac-000001"));
    assert!(!service.roster_ratings().expect("ratings")[0].has_reviews);

    let renamed = service
        .update_faculty(&registered.id, member("dr s. rao", "Physics"))
        .expect("rename");
    assert_eq!(renamed.id, registered.id);

    let summaries = service.roster_ratings().expect("ratings");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].faculty_id, Some(registered.id.clone()));
    assert_eq!(summaries[0].review_count, 1);
    assert!(summaries[0].has_reviews);
}

#[test]
fn roster_update_rejects_missing_invalid_and_clashing_entries() {
    let (service, _) = build_service(Vec::new(), Vec::new());
    let smith = service
        .register_faculty(member("Dr. Smith", "Physics"))
        .expect("smith");
    service
        .register_faculty(member("Dr. Iyer", "Math"))
        .expect("iyer");

    let err = service
        .update_faculty(&FacultyId::from("fac-999999"), member("Dr. Smith", "Physics"))
        .expect_err("unknown id");
    assert!(matches!(
        err,
        ReviewServiceError::Repository(RepositoryError::NotFound)
    ));

    let err = service
        .update_faculty(&smith.id, member("Dr. Smith", " "))
        .expect_err("blank department");
    assert!(matches!(err, ReviewServiceError::Invalid(_)));

    let err = service
        .update_faculty(&smith.id, member("DR. IYER", "math"))
        .expect_err("takes another entry's identity");
    assert!(matches!(
        err,
        ReviewServiceError::Repository(RepositoryError::Conflict)
    ));
}

#[test]
fn department_listing_and_removal() {
    let (service, _) = build_service(Vec::new(), Vec::new());
    let smith = service
        .register_faculty(member("Dr. Smith", "Physics"))
        .expect("smith");
    service
        .register_faculty(member("Dr. Bose", " physics "))
        .expect("bose");
    service
        .register_faculty(member("Dr. Iyer", "Math"))
        .expect("iyer");

    let physics = service.faculty_in_department("PHYSICS").expect("physics");
    let names: Vec<&str> = physics.iter().map(|member| member.name.as_str()).collect();
    assert_eq!(names, vec!["Dr. Smith", "Dr. Bose"]);
    assert!(service
        .faculty_in_department("Chemistry")
        .expect("chemistry")
        .is_empty());

    let removed = service.remove_faculty(&smith.id).expect("remove");
    assert_eq!(removed.name, "Dr. Smith");
    assert_eq!(service.faculty_in_department("physics").expect("physics").len(), 1);
    assert!(matches!(
        service.remove_faculty(&smith.id),
        Err(ReviewServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn roster_import_skips_bad_rows_and_keeps_supplied_ids() {
    let (service, _) = build_service(Vec::new(), Vec::new());
    let mut exported = member("Dr. Smith", "Physics");
    exported.id = FacultyId::from("fac-000010");

    let registered = service
        .import_roster(vec![
            exported,
            member("dr. smith", "physics"),
            member("Dr. Iyer", ""),
            member("Dr. Bose", "Math"),
        ])
        .expect("import roster");

    assert_eq!(registered, 2);
    let roster = service.roster().expect("roster");
    assert_eq!(roster[0].id, FacultyId::from("fac-000010"));
    assert_eq!(roster[1].name, "Dr. Bose");
    let issued: u64 = roster[1]
        .id
        .0
        .strip_prefix("fac-")
        .and_then(|digits| digits.parse().ok())
        .expect("issued id");
    assert!(issued > 10);
}

#[test]
fn roster_and_reviewed_faculty_views_differ_on_unmatched_reviews() {
    let (service, _) = build_service(
        vec![
            review("r1", ("Dr. Smith", "Physics"), scores(&[4]), Some(4.0)),
            review("r2", ("Dr. Guest", "Physics"), scores(&[5]), Some(5.0)),
        ],
        vec![member("Dr. Smith", "Physics"), member("Dr. Iyer", "Math")],
    );

    let roster_view = service.roster_ratings().expect("roster ratings");
    let names: Vec<&str> = roster_view
        .iter()
        .map(|summary| summary.faculty_name.as_str())
        .collect();
    assert_eq!(names, vec!["Dr. Smith", "Dr. Iyer"]);

    let reviewed_view = service.faculty_ratings().expect("faculty ratings");
    let names: Vec<&str> = reviewed_view
        .iter()
        .map(|summary| summary.faculty_name.as_str())
        .collect();
    assert_eq!(names, vec!["Dr. Guest", "Dr. Smith"]);
}

#[test]
fn discrepancy_listing_does_not_write() {
    let (service, repository) = build_service(
        vec![review("r1", ("Dr. Smith", "Physics"), scores(&[4, 4]), Some(2.7))],
        Vec::new(),
    );

    let reports = service.discrepancies().expect("discrepancies");

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].calculated, 4.0);
    assert!(repository.replace_calls().is_empty());
}
