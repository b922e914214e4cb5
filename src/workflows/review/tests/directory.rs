use super::common::*;
use crate::workflows::review::directory::{ApplicantDirectory, FetchError};
use crate::workflows::review::domain::{
    ApplicantId, ApplicantStatus, FilterCriteria, LocationFilter,
};

#[test]
fn newest_load_wins_regardless_of_completion_order() {
    let mut directory = ApplicantDirectory::new();
    let first = directory.begin_load();
    let second = directory.begin_load();

    let count = directory
        .complete_load(
            second,
            Ok(vec![
                applicant(1, "Jane Doe", ApplicantStatus::Pending),
                applicant(2, "John Otieno", ApplicantStatus::Vetted),
            ]),
        )
        .expect("newest load applies");
    assert_eq!(count, 2);

    // The older response arrives late and must be discarded.
    match directory.complete_load(first, Ok(vec![applicant(3, "Stale Entry", ApplicantStatus::Pending)])) {
        Err(FetchError::Superseded) => {}
        other => panic!("expected superseded, got {other:?}"),
    }
    assert_eq!(directory.len(), 2);
    assert!(directory.get(ApplicantId(1)).is_some());
    assert!(directory.get(ApplicantId(3)).is_none());
}

#[test]
fn transport_failure_keeps_the_previous_working_set() {
    let mut directory = ApplicantDirectory::new();
    let ticket = directory.begin_load();
    directory
        .complete_load(ticket, Ok(default_listing()))
        .expect("initial load applies");
    assert!(!directory.sync_status().stale);

    let ticket = directory.begin_load();
    match directory.complete_load(ticket, Err(status_error("/api/applications"))) {
        Err(FetchError::Transport(_)) => {}
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(directory.len(), 2, "previous records survive the failure");
    assert!(directory.sync_status().stale);

    let ticket = directory.begin_load();
    directory
        .complete_load(ticket, Ok(default_listing()))
        .expect("recovery load applies");
    assert!(!directory.sync_status().stale);
}

#[test]
fn blank_query_returns_the_full_set_in_order() {
    let mut directory = ApplicantDirectory::new();
    let ticket = directory.begin_load();
    directory
        .complete_load(ticket, Ok(default_listing()))
        .expect("load applies");

    let all = directory.search("   ");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, ApplicantId(1));
    assert_eq!(all[1].id, ApplicantId(2));
}

#[test]
fn search_matches_name_email_and_phone() {
    let mut directory = ApplicantDirectory::new();
    let ticket = directory.begin_load();
    directory
        .complete_load(ticket, Ok(default_listing()))
        .expect("load applies");

    // Case-insensitive over names and emails.
    let by_name = directory.search("JANE");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, ApplicantId(1));

    let by_email = directory.search("john.otieno@agency");
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].id, ApplicantId(2));

    // Phone numbers match on the raw digits.
    let by_phone = directory.search("0700000002");
    assert_eq!(by_phone.len(), 1);
    assert_eq!(by_phone[0].id, ApplicantId(2));

    assert!(directory.search("nobody").is_empty());
}

#[test]
fn location_facets_include_all_and_other_buckets() {
    let mut directory = ApplicantDirectory::new();
    let ticket = directory.begin_load();
    directory
        .complete_load(
            ticket,
            Ok(vec![
                located(applicant(1, "Jane Doe", ApplicantStatus::Pending), "Nairobi"),
                located(applicant(2, "John Otieno", ApplicantStatus::Vetted), "nairobi"),
                located(applicant(3, "Amina Hassan", ApplicantStatus::Pending), "Mombasa"),
                applicant(4, "No Location", ApplicantStatus::Pending),
            ]),
        )
        .expect("load applies");

    let facets = directory.location_facets();
    let summary: Vec<(&str, usize)> = facets
        .iter()
        .map(|facet| (facet.label.as_str(), facet.count))
        .collect();
    assert_eq!(
        summary,
        vec![("all", 4), ("nairobi", 2), ("mombasa", 1), ("other", 1)]
    );
    assert_eq!(facets[1].display_label(), "Nairobi");
}

#[test]
fn structured_filter_requires_set_flags_and_location() {
    let mut nairobi_cat = located(applicant(1, "Jane Doe", ApplicantStatus::Pending), "Nairobi");
    nairobi_cat.has_cat = true;
    let mut mombasa_cat = located(applicant(2, "Amina Hassan", ApplicantStatus::Pending), "Mombasa");
    mombasa_cat.has_cat = true;
    let nairobi_plain = located(applicant(3, "John Otieno", ApplicantStatus::Pending), "Nairobi");

    let mut directory = ApplicantDirectory::new();
    let ticket = directory.begin_load();
    directory
        .complete_load(ticket, Ok(vec![nairobi_cat, mombasa_cat, nairobi_plain]))
        .expect("load applies");

    let criteria = FilterCriteria {
        has_cat: true,
        location: LocationFilter::named("Nairobi"),
        ..FilterCriteria::default()
    };
    let matched = directory.filter(&criteria);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, ApplicantId(1));

    // An unset flag places no constraint.
    let everyone_in_nairobi = directory.filter(&FilterCriteria {
        location: LocationFilter::named("nairobi"),
        ..FilterCriteria::default()
    });
    assert_eq!(everyone_in_nairobi.len(), 2);
}

#[test]
fn status_filter_and_upsert_preserve_order() {
    let mut directory = ApplicantDirectory::new();
    let ticket = directory.begin_load();
    directory
        .complete_load(ticket, Ok(default_listing()))
        .expect("load applies");

    assert_eq!(directory.with_status(Some(ApplicantStatus::Vetted)).len(), 1);
    assert_eq!(directory.with_status(None).len(), 2);

    let mut updated = applicant(1, "Jane Doe", ApplicantStatus::Vetted);
    updated.current_location = Some("Nairobi".to_string());
    assert!(directory.upsert(updated));
    assert_eq!(directory.records()[0].status, ApplicantStatus::Vetted);

    // Unknown ids are not inserted.
    assert!(!directory.upsert(applicant(9, "Ghost", ApplicantStatus::Pending)));
    assert_eq!(directory.len(), 2);
}

#[test]
fn soft_delete_is_undone_by_the_next_load() {
    let mut directory = ApplicantDirectory::new();
    let ticket = directory.begin_load();
    directory
        .complete_load(ticket, Ok(default_listing()))
        .expect("load applies");

    assert!(directory.remove(ApplicantId(1)));
    assert!(!directory.remove(ApplicantId(1)));
    assert_eq!(directory.len(), 1);

    let ticket = directory.begin_load();
    directory
        .complete_load(ticket, Ok(default_listing()))
        .expect("reload applies");
    assert!(directory.get(ApplicantId(1)).is_some(), "server copy returns");
}
