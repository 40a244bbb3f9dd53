//! List projection behaviour through the backend query path: combined
//! filters, phase-priority ordering, and pagination.

use chrono::NaiveDate;
use grantdesk_core::backend::{BatchQuery, MockBackend, SubmissionBackend};
use grantdesk_core::catalog::{BatchKind, Phase};
use grantdesk_core::listing::SortKey;
use grantdesk_core::wizard::Draft;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn kind_filter_and_search_combine_with_and() {
    let mut backend = MockBackend::with_sample_data();
    let mut query = BatchQuery::first_page(10);
    query.filter.kind = Some(BatchKind::Review);
    query.filter.search = Some("结题".into());

    let page = backend.list_batches(&query, date(2025, 2, 15)).expect("list");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, "batch-3");
}

#[test]
fn search_is_case_insensitive_on_name_and_description() {
    let mut backend = MockBackend::with_sample_data();
    let mut draft = Draft::new();
    draft.set("name", "AI Frontier Review");
    draft.set("category", "开放课题");
    draft.set("kind", "评审批次");
    draft.set("description", "International AI review batch");
    draft.set("start_date", "2025-02-01");
    draft.set("end_date", "2025-02-28");
    let id = backend.create_batch(&draft).expect("create");

    let mut query = BatchQuery::first_page(10);
    query.filter.search = Some("ai frontier".into());
    let page = backend.list_batches(&query, date(2025, 2, 15)).expect("list");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, id);
}

#[test]
fn phase_filter_narrows_to_the_derived_window() {
    let mut backend = MockBackend::with_sample_data();
    let now = date(2025, 2, 15);

    let mut query = BatchQuery::first_page(10);
    query.filter.phase = Some(Phase::Ended);
    let page = backend.list_batches(&query, now).expect("list");
    assert!(page.items.iter().all(|batch| batch.phase(now) == Phase::Ended));
    assert!(page.items.iter().any(|batch| batch.id == "batch-3"));
}

#[test]
fn in_progress_batches_sort_ahead_regardless_of_dates() {
    let mut backend = MockBackend::with_sample_data();
    let now = date(2025, 2, 15);
    let mut query = BatchQuery::first_page(10);
    query.sort = SortKey::StartDate;

    let page = backend.list_batches(&query, now).expect("list");
    let ranks: Vec<u8> = page
        .items
        .iter()
        .map(|batch| batch.phase(now).sort_rank())
        .collect();
    let mut sorted = ranks.clone();
    sorted.sort_unstable();
    assert_eq!(ranks, sorted);
    assert_eq!(page.items[0].phase(now), Phase::InProgress);
}

#[test]
fn pagination_splits_and_clamps() {
    let mut backend = MockBackend::with_sample_data();
    let now = date(2025, 2, 15);

    let mut query = BatchQuery::first_page(3);
    let first = backend.list_batches(&query, now).expect("list");
    assert_eq!(first.items.len(), 3);
    assert_eq!(first.total, 4);
    assert_eq!(first.page_count(), 2);

    query.page = 2;
    let second = backend.list_batches(&query, now).expect("list");
    assert_eq!(second.items.len(), 1);

    query.page = 9;
    let past_end = backend.list_batches(&query, now).expect("list");
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total, 4);
}
