//! Step registry and validators for the project application wizard.
//!
//! The step list is a pure function of the 申请书生成方式 field and is
//! re-resolved every time that field changes; completion survives by step
//! id (never by position).

use serde_json::{json, Value};

use crate::backend::{BackendError, SubmissionBackend};
use crate::catalog::{FormGenerationType, ProjectRecord};
use crate::wizard::{
    Draft, ErrorMap, FieldKind, FieldSpec, StepDef, SubmitError, WizardController,
};

/// Draft key holding the generation-type display label.
pub const GENERATION_TYPE_KEY: &str = "generation_type";

pub const STEP_BASIC: &str = "basic";
pub const STEP_TEAM: &str = "team";
pub const STEP_BUDGET: &str = "budget";
pub const STEP_CONTENT: &str = "content";
pub const STEP_COLLAB: &str = "collab";
pub const STEP_UPLOAD: &str = "upload";
pub const STEP_CONFIRM: &str = "confirm";

/// Resolves the ordered step list for a generation type.
pub fn application_steps(generation_type: FormGenerationType) -> Vec<StepDef> {
    let mut steps = vec![basic_step(), team_step(), budget_step()];
    steps.push(match generation_type {
        FormGenerationType::Online => content_step(),
        FormGenerationType::Collaborative => collab_step(),
        FormGenerationType::OfflineTemplate => upload_step(),
    });
    steps.push(StepDef::new(STEP_CONFIRM, "确认提交", vec![]));
    steps
}

fn basic_step() -> StepDef {
    StepDef::new(
        STEP_BASIC,
        "基本信息",
        vec![
            FieldSpec::new("title", "项目名称", FieldKind::Text),
            FieldSpec::new("leader", "项目负责人", FieldKind::Text),
            FieldSpec::new("department", "所属部门", FieldKind::Text).optional(),
            FieldSpec::new("description", "项目简介", FieldKind::MultilineText).optional(),
            FieldSpec::new(
                GENERATION_TYPE_KEY,
                "申请书生成方式",
                FieldKind::Choice(vec!["全流程在线生成", "智能协同生成", "线下模板化"]),
            ),
        ],
    )
    .with_validator(validate_basic)
}

fn team_step() -> StepDef {
    StepDef::new(
        STEP_TEAM,
        "团队成员",
        vec![FieldSpec::new(
            "team_members",
            "成员列表",
            FieldKind::Collection(vec![
                FieldSpec::new("name", "姓名", FieldKind::Text),
                FieldSpec::new("role", "角色", FieldKind::Text),
                FieldSpec::new("department", "部门", FieldKind::Text).optional(),
            ]),
        )],
    )
    .with_validator(validate_team)
}

fn budget_step() -> StepDef {
    StepDef::new(
        STEP_BUDGET,
        "预算编制",
        vec![FieldSpec::new(
            "budget_items",
            "预算明细",
            FieldKind::Collection(vec![
                FieldSpec::new("item", "科目", FieldKind::Text),
                FieldSpec::new("amount", "金额（元）", FieldKind::Integer),
                FieldSpec::new("note", "备注", FieldKind::Text).optional(),
            ]),
        )],
    )
    .with_validator(validate_budget)
}

fn content_step() -> StepDef {
    StepDef::new(
        STEP_CONTENT,
        "正文信息",
        vec![FieldSpec::new("body", "申请书正文", FieldKind::MultilineText)],
    )
    .with_validator(validate_content)
}

fn collab_step() -> StepDef {
    // Collaborative drafting happens in an external session; the wizard
    // only records the session reference.
    StepDef::new(
        STEP_COLLAB,
        "协同编辑",
        vec![FieldSpec::new("collab_session", "协同会话", FieldKind::Text).optional()],
    )
}

fn upload_step() -> StepDef {
    StepDef::new(
        STEP_UPLOAD,
        "附件材料",
        vec![FieldSpec::new(
            "attachments",
            "附件列表",
            FieldKind::Collection(vec![
                FieldSpec::new("file_name", "文件名", FieldKind::Text),
                FieldSpec::new("material_name", "对应材料", FieldKind::Text).optional(),
            ]),
        )],
    )
    .with_validator(validate_upload)
}

fn validate_basic(draft: &Draft) -> ErrorMap {
    let mut errors = ErrorMap::new();
    if draft.str_field("title").is_none() {
        errors.insert("title".into(), "项目名称不能为空".into());
    }
    if draft.str_field("leader").is_none() {
        errors.insert("leader".into(), "项目负责人不能为空".into());
    }
    if draft
        .str_field(GENERATION_TYPE_KEY)
        .and_then(FormGenerationType::from_label)
        .is_none()
    {
        errors.insert(GENERATION_TYPE_KEY.into(), "请选择申请书生成方式".into());
    }
    errors
}

fn validate_team(draft: &Draft) -> ErrorMap {
    let mut errors = ErrorMap::new();
    let members = draft.items("team_members");
    if members.is_empty() {
        errors.insert("team_members".into(), "请至少添加一位团队成员".into());
        return errors;
    }
    for (index, member) in members.iter().enumerate() {
        let name = member
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if name.is_empty() {
            errors.insert(
                "team_members".into(),
                format!("第 {} 位成员缺少姓名", index + 1),
            );
            break;
        }
    }
    errors
}

fn validate_budget(draft: &Draft) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for (index, item) in draft.items("budget_items").iter().enumerate() {
        let label = item
            .get("item")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if label.is_empty() {
            errors.insert(
                "budget_items".into(),
                format!("第 {} 条预算缺少科目名称", index + 1),
            );
            break;
        }
        let amount = item.get("amount").and_then(Value::as_f64);
        if amount.map_or(true, |value| value < 0.0) {
            errors.insert(
                "budget_items".into(),
                format!("预算科目 {label} 的金额必须是非负数"),
            );
            break;
        }
    }
    errors
}

fn validate_content(draft: &Draft) -> ErrorMap {
    let mut errors = ErrorMap::new();
    if draft.str_field("body").is_none() {
        errors.insert("body".into(), "申请书正文不能为空".into());
    }
    errors
}

fn validate_upload(draft: &Draft) -> ErrorMap {
    let mut errors = ErrorMap::new();
    if draft.items("attachments").is_empty() {
        errors.insert("attachments".into(), "请上传至少一个附件".into());
    }
    errors
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ApplicationWizardMode {
    Create { batch_id: String },
    Edit { id: String },
}

/// Wizard for creating or editing a project application under a batch.
///
/// Wraps the generic controller so that changing the generation-type field
/// immediately re-resolves the step list.
pub struct ApplicationWizard {
    controller: WizardController,
    mode: ApplicationWizardMode,
}

impl ApplicationWizard {
    pub fn new_create(batch_id: impl Into<String>) -> Self {
        let default_type = FormGenerationType::Online;
        let draft = Draft::from_fields([(GENERATION_TYPE_KEY, json!(default_type.label()))]);
        Self {
            controller: WizardController::new(application_steps(default_type), draft),
            mode: ApplicationWizardMode::Create {
                batch_id: batch_id.into(),
            },
        }
    }

    pub fn new_edit(record: &ProjectRecord) -> Self {
        let mut draft = Draft::from_fields([
            ("title", json!(record.title)),
            ("leader", json!(record.leader)),
            ("department", json!(record.department)),
            ("description", json!(record.description)),
            (GENERATION_TYPE_KEY, json!(record.generation_type.label())),
        ]);
        for member in &record.team_members {
            draft.push_item(
                "team_members",
                json!({
                    "name": member.name,
                    "role": member.role,
                    "department": member.department,
                }),
            );
        }
        for item in &record.budget_items {
            draft.push_item(
                "budget_items",
                json!({"item": item.item, "amount": item.amount, "note": item.note}),
            );
        }
        for attachment in &record.attachments {
            draft.push_item(
                "attachments",
                json!({
                    "file_name": attachment.file_name,
                    "material_name": attachment.material_name,
                    "size_bytes": attachment.size_bytes,
                }),
            );
        }
        Self {
            controller: WizardController::new(
                application_steps(record.generation_type),
                draft,
            ),
            mode: ApplicationWizardMode::Edit {
                id: record.id.clone(),
            },
        }
    }

    pub fn controller(&self) -> &WizardController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut WizardController {
        &mut self.controller
    }

    /// Merges a field into the draft; updating the generation-type field
    /// re-resolves the step list on the spot so the registry can never
    /// desynchronize from the draft.
    pub fn update_field(&mut self, key: &str, value: impl Into<Value>) {
        self.controller.update_field(key, value);
        if key == GENERATION_TYPE_KEY {
            let resolved = self
                .controller
                .draft()
                .str_field(GENERATION_TYPE_KEY)
                .and_then(FormGenerationType::from_label)
                .unwrap_or(FormGenerationType::Online);
            self.controller.replace_steps(application_steps(resolved));
        }
    }

    pub fn submit(
        &mut self,
        backend: &mut dyn SubmissionBackend,
    ) -> Result<String, SubmitError<BackendError>> {
        let mode = self.mode.clone();
        self.controller.submit(|draft| match &mode {
            ApplicationWizardMode::Create { batch_id } => backend.create_project(batch_id, draft),
            ApplicationWizardMode::Edit { id } => {
                backend.update_project(id, draft).map(|_| id.clone())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_template_puts_attachments_at_index_three() {
        let steps = application_steps(FormGenerationType::OfflineTemplate);
        assert_eq!(steps[3].title, "附件材料");
        let steps = application_steps(FormGenerationType::Online);
        assert_eq!(steps[3].title, "正文信息");
    }

    #[test]
    fn changing_generation_type_reresolves_steps() {
        let mut wizard = ApplicationWizard::new_create("batch-1");
        assert_eq!(wizard.controller().steps()[3].id, STEP_CONTENT);

        wizard.update_field(GENERATION_TYPE_KEY, "线下模板化");
        assert_eq!(wizard.controller().steps()[3].id, STEP_UPLOAD);
        assert_eq!(wizard.controller().steps().len(), 5);
    }

    #[test]
    fn completion_survives_type_change_for_shared_steps() {
        let mut wizard = ApplicationWizard::new_create("batch-1");
        wizard.update_field("title", "知识图谱研究");
        wizard.update_field("leader", "李明");
        assert!(wizard.controller_mut().go_next());
        assert!(wizard.controller().is_step_completed(STEP_BASIC));

        wizard.update_field(GENERATION_TYPE_KEY, "智能协同生成");
        assert!(wizard.controller().is_step_completed(STEP_BASIC));
        // Position stayed on the shared "team" step after re-resolution.
        assert_eq!(wizard.controller().current_index(), 1);
    }
}
