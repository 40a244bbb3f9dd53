//! Expert notification dispatch through the typed request handoff.

use grantdesk_core::backend::{BackendError, MockBackend, SubmissionBackend};
use grantdesk_core::notify::{dispatch, DispatchError, NotificationRequest};

#[test]
fn dispatch_reaches_selected_experts() {
    let mut backend = MockBackend::with_sample_data();
    let experts = backend.list_experts(1, 10).expect("experts");
    let ids: Vec<String> = experts.items.iter().map(|expert| expert.id.clone()).collect();

    let mut request = NotificationRequest::new("batch-3", ids);
    request.subject = "结题评审邀请".into();
    request.body = "请于12月20日前完成线上评审打分。".into();

    let delivered = dispatch(&mut backend, &request).expect("dispatch");
    assert_eq!(delivered, experts.total);
}

#[test]
fn incomplete_request_never_reaches_the_backend() {
    let mut backend = MockBackend::with_sample_data();
    // A backend failure is armed; validation must trip before it fires.
    backend.fail_next(BackendError::Unavailable("armed".into()));

    let request = NotificationRequest::new("batch-3", vec!["exp-1".into()]);
    match dispatch(&mut backend, &request) {
        Err(DispatchError::Invalid(errors)) => {
            assert!(errors.contains_key("subject"));
            assert!(errors.contains_key("body"));
        }
        other => panic!("expected validation failure, got ok={}", other.is_ok()),
    }

    // The armed failure is still pending, proving no call went through.
    let result = backend.list_experts(1, 10);
    assert!(matches!(result, Err(BackendError::Unavailable(_))));
}

#[test]
fn unknown_batch_surfaces_as_backend_error() {
    let mut backend = MockBackend::with_sample_data();
    let mut request = NotificationRequest::new("batch-404", vec!["exp-1".into()]);
    request.subject = "邀请".into();
    request.body = "内容".into();

    match dispatch(&mut backend, &request) {
        Err(DispatchError::Backend(BackendError::NotFound(id))) => assert_eq!(id, "batch-404"),
        other => panic!("expected not-found, got ok={}", other.is_ok()),
    }
}
