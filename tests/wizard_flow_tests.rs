//! End-to-end wizard flows against the mock backend: create and edit
//! batches, create projects under a batch, and recover from backend
//! failures without losing the draft.

use grantdesk_core::backend::{BackendError, MockBackend, SubmissionBackend};
use grantdesk_core::catalog::{BatchKind, FormGenerationType, PublishState};
use grantdesk_core::forms::{ApplicationWizard, BatchWizard, GENERATION_TYPE_KEY};
use grantdesk_core::wizard::{SubmitError, WizardPhase};
use serde_json::json;

fn fill_valid_batch(wizard: &mut BatchWizard) {
    let controller = wizard.controller_mut();
    controller.update_field("name", "2026年度校级科研项目申报");
    controller.update_field("code", "XK-2026-01");
    controller.update_field("category", "校级科研项目");
    controller.update_field("start_date", "2026-02-01");
    controller.update_field("end_date", "2026-03-15");
    assert!(controller.go_next());

    controller.update_field("publish_state", "已发布");
    controller.update_field("per_person_cap", 2);
    assert!(controller.go_next());

    controller.push_item("materials", json!({"name": "项目申报书", "required": true}));
    assert!(controller.go_next());

    controller.push_item(
        "department_limits",
        json!({"department": "计算机学院", "cap": 10}),
    );
    assert!(controller.go_next());
}

#[test]
fn batch_creation_walks_every_step_and_persists() {
    let mut backend = MockBackend::new();
    let mut wizard = BatchWizard::new_create(BatchKind::Application);
    fill_valid_batch(&mut wizard);

    let id = wizard.submit(&mut backend).expect("submit");
    assert!(wizard.controller().is_completed());

    let record = backend.get_batch(&id).expect("get");
    assert_eq!(record.name, "2026年度校级科研项目申报");
    assert_eq!(record.publish_state, PublishState::Published);
    assert_eq!(record.per_person_cap, 2);
    assert_eq!(record.materials.len(), 1);
    assert_eq!(record.department_limits[0].department, "计算机学院");
}

#[test]
fn backend_outage_keeps_the_draft_and_allows_retry() {
    let mut backend = MockBackend::new();
    let mut wizard = BatchWizard::new_create(BatchKind::Application);
    fill_valid_batch(&mut wizard);

    backend.fail_next(BackendError::Unavailable("mock outage".into()));
    let result = wizard.submit(&mut backend);
    assert!(matches!(result, Err(SubmitError::Backend(_))));
    assert_eq!(wizard.controller().phase(), WizardPhase::Editing);
    assert_eq!(
        wizard.controller().draft().str_field("name"),
        Some("2026年度校级科研项目申报")
    );

    let id = wizard.submit(&mut backend).expect("retry");
    assert!(backend.get_batch(&id).is_ok());
}

#[test]
fn submit_reopens_the_step_that_went_stale() {
    let mut backend = MockBackend::new();
    let mut wizard = BatchWizard::new_create(BatchKind::Review);
    fill_valid_batch(&mut wizard);

    // Jump back to the completed first step and break the date range.
    wizard.controller_mut().go_to_step(0);
    wizard.controller_mut().update_field("end_date", "2026-01-01");
    wizard.controller_mut().go_to_step(4);

    match wizard.submit(&mut backend) {
        Err(SubmitError::Validation {
            step_index, errors, ..
        }) => {
            assert_eq!(step_index, 0);
            assert_eq!(wizard.controller().current_index(), 0);
            assert!(errors.contains_key("end_date"));
        }
        other => panic!("expected validation failure, got ok={}", other.is_ok()),
    }
}

#[test]
fn editing_a_batch_overwrites_the_stored_record() {
    let mut backend = MockBackend::with_sample_data();
    let record = backend.get_batch("batch-2").expect("seed record");

    let mut wizard = BatchWizard::new_edit(&record);
    wizard.controller_mut().update_field("name", "青年教师科研启动基金（延期）");
    wizard.controller_mut().update_field("end_date", "2025-06-30");

    let id = wizard.submit(&mut backend).expect("submit edit");
    assert_eq!(id, "batch-2");
    let updated = backend.get_batch("batch-2").expect("get");
    assert_eq!(updated.name, "青年教师科研启动基金（延期）");
    assert_eq!(updated.end_date.to_string(), "2025-06-30");
}

#[test]
fn offline_template_application_submits_with_attachments() {
    let mut backend = MockBackend::with_sample_data();
    let mut wizard = ApplicationWizard::new_create("batch-1");

    wizard.update_field("title", "面向边缘计算的任务调度研究");
    wizard.update_field("leader", "周琳");
    wizard.update_field(GENERATION_TYPE_KEY, "线下模板化");
    assert!(wizard.controller_mut().go_next());

    wizard.controller_mut().push_item(
        "team_members",
        json!({"name": "周琳", "role": "负责人", "department": "计算机学院"}),
    );
    assert!(wizard.controller_mut().go_next());

    wizard.controller_mut().push_item(
        "budget_items",
        json!({"item": "设备费", "amount": 15000}),
    );
    assert!(wizard.controller_mut().go_next());

    wizard.controller_mut().push_item(
        "attachments",
        json!({"file_name": "申报书-周琳.docx", "material_name": "项目申报书"}),
    );
    assert!(wizard.controller_mut().go_next());

    let id = wizard.submit(&mut backend).expect("submit");
    let page = backend.list_projects(Some("batch-1"), 1, 10).expect("list");
    let created = page
        .items
        .iter()
        .find(|project| project.id == id)
        .expect("created project");
    assert_eq!(created.generation_type, FormGenerationType::OfflineTemplate);
    assert_eq!(created.attachments.len(), 1);
}

#[test]
fn missing_attachments_block_the_offline_template_flow() {
    let mut backend = MockBackend::with_sample_data();
    let mut wizard = ApplicationWizard::new_create("batch-1");

    wizard.update_field("title", "空附件提交");
    wizard.update_field("leader", "测试");
    wizard.update_field(GENERATION_TYPE_KEY, "线下模板化");

    match wizard.submit(&mut backend) {
        Err(SubmitError::Validation { errors, .. }) => {
            // Earlier steps fail first; drive them to completion and hit
            // the attachment gate.
            assert!(!errors.is_empty());
        }
        other => panic!("expected validation failure, got ok={}", other.is_ok()),
    }

    wizard.controller_mut().push_item(
        "team_members",
        json!({"name": "测试", "role": "负责人"}),
    );
    match wizard.submit(&mut backend) {
        Err(SubmitError::Validation { step_id, .. }) => assert_eq!(step_id, "upload"),
        other => panic!("expected attachment gate, got ok={}", other.is_ok()),
    }
}
