//! Step registry and validators for the batch configuration wizard.

use once_cell::sync::Lazy;
use serde_json::json;

use crate::backend::{BackendError, SubmissionBackend};
use crate::catalog::{BatchKind, BatchRecord};
use crate::wizard::{
    Draft, ErrorMap, FieldKind, FieldSpec, StepDef, SubmitError, WizardController,
};

/// Stable step ids; navigation and completion tracking key off these.
pub const STEP_BASIC: &str = "basic";
pub const STEP_CONFIG: &str = "config";
pub const STEP_MATERIALS: &str = "materials";
pub const STEP_LIMITS: &str = "limits";
pub const STEP_CONFIRM: &str = "confirm";

static BATCH_STEPS: Lazy<Vec<StepDef>> = Lazy::new(|| {
    vec![
        StepDef::new(
            STEP_BASIC,
            "基本信息",
            vec![
                FieldSpec::new("name", "批次名称", FieldKind::Text),
                FieldSpec::new("code", "批次编号", FieldKind::Text).optional(),
                FieldSpec::new(
                    "kind",
                    "批次类型",
                    FieldKind::Choice(vec!["申报批次", "评审批次"]),
                ),
                FieldSpec::new("category", "项目类别", FieldKind::Text),
                FieldSpec::new("description", "批次说明", FieldKind::MultilineText).optional(),
                FieldSpec::new("start_date", "开始日期", FieldKind::Date),
                FieldSpec::new("end_date", "结束日期", FieldKind::Date),
            ],
        )
        .with_validator(validate_basic),
        StepDef::new(
            STEP_CONFIG,
            "申报配置",
            vec![
                FieldSpec::new(
                    "publish_state",
                    "发布状态",
                    FieldKind::Choice(vec!["草稿", "已发布"]),
                ),
                FieldSpec::new(
                    "visibility",
                    "可见范围",
                    FieldKind::Choice(vec!["公开", "私有"]),
                ),
                FieldSpec::new("per_person_cap", "每人限报数量", FieldKind::Integer),
                FieldSpec::new("requires_approval", "是否需要部门审批", FieldKind::Flag),
                FieldSpec::new("approver", "审批负责人", FieldKind::Text).optional(),
            ],
        )
        .with_validator(validate_config),
        StepDef::new(
            STEP_MATERIALS,
            "申报材料",
            vec![FieldSpec::new(
                "materials",
                "材料清单",
                FieldKind::Collection(vec![
                    FieldSpec::new("name", "材料名称", FieldKind::Text),
                    FieldSpec::new("required", "是否必交", FieldKind::Flag),
                    FieldSpec::new("description", "材料说明", FieldKind::Text).optional(),
                ]),
            )],
        )
        .with_validator(validate_materials),
        StepDef::new(
            STEP_LIMITS,
            "名额分配",
            vec![FieldSpec::new(
                "department_limits",
                "部门限额",
                FieldKind::Collection(vec![
                    FieldSpec::new("department", "部门名称", FieldKind::Text),
                    FieldSpec::new("cap", "限报名额", FieldKind::Integer),
                ]),
            )
            .optional()],
        )
        .with_validator(validate_limits),
        StepDef::new(STEP_CONFIRM, "确认提交", vec![]),
    ]
});

/// The (static) batch wizard step list.
pub fn batch_steps() -> Vec<StepDef> {
    BATCH_STEPS.clone()
}

fn validate_basic(draft: &Draft) -> ErrorMap {
    let mut errors = ErrorMap::new();
    if draft.str_field("name").is_none() {
        errors.insert("name".into(), "批次名称不能为空".into());
    }
    if draft.str_field("category").is_none() {
        errors.insert("category".into(), "项目类别不能为空".into());
    }
    if draft
        .str_field("kind")
        .map_or(true, |kind| !matches!(kind, "申报批次" | "评审批次"))
    {
        errors.insert("kind".into(), "请选择批次类型".into());
    }

    let start = draft.date_field("start_date");
    let end = draft.date_field("end_date");
    if start.is_none() {
        errors.insert("start_date".into(), "请填写开始日期（YYYY-MM-DD）".into());
    }
    if end.is_none() {
        errors.insert("end_date".into(), "请填写结束日期（YYYY-MM-DD）".into());
    }
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.insert("end_date".into(), "结束日期不能早于开始日期".into());
        }
    }
    errors
}

fn validate_config(draft: &Draft) -> ErrorMap {
    let mut errors = ErrorMap::new();
    if let Some(cap) = draft.int_field("per_person_cap") {
        if cap < 1 {
            errors.insert("per_person_cap".into(), "每人限报数量至少为 1".into());
        }
    }
    // The approver only matters while the approval toggle is on; a stale
    // value left behind after switching the toggle off is not validated.
    if draft.flag("requires_approval") && draft.str_field("approver").is_none() {
        errors.insert("approver".into(), "开启部门审批后需指定审批负责人".into());
    }
    errors
}

fn validate_materials(draft: &Draft) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for (index, item) in draft.items("materials").iter().enumerate() {
        let name = item
            .get("name")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if name.is_empty() {
            errors.insert(
                "materials".into(),
                format!("第 {} 条材料缺少名称", index + 1),
            );
            break;
        }
    }
    errors
}

fn validate_limits(draft: &Draft) -> ErrorMap {
    let mut errors = ErrorMap::new();
    let mut seen = std::collections::BTreeSet::new();
    for item in draft.items("department_limits") {
        let department = item
            .get("department")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if department.is_empty() {
            errors.insert("department_limits".into(), "部门名称不能为空".into());
            break;
        }
        if !seen.insert(department.to_string()) {
            errors.insert(
                "department_limits".into(),
                format!("部门 {department} 的限额重复配置"),
            );
            break;
        }
        if item.get("cap").and_then(serde_json::Value::as_u64).is_none() {
            errors.insert(
                "department_limits".into(),
                format!("部门 {department} 的限额必须是非负整数"),
            );
            break;
        }
    }
    errors
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BatchWizardMode {
    Create,
    Edit { id: String },
}

/// Wizard for creating or editing an application/review batch.
pub struct BatchWizard {
    controller: WizardController,
    mode: BatchWizardMode,
}

impl BatchWizard {
    /// Fresh draft pre-seeded with the defaults the configuration page
    /// starts from.
    pub fn new_create(kind: BatchKind) -> Self {
        let draft = Draft::from_fields([
            ("kind", json!(kind.label())),
            ("publish_state", json!("草稿")),
            ("visibility", json!("公开")),
            ("per_person_cap", json!(1)),
            ("requires_approval", json!(false)),
        ]);
        Self {
            controller: WizardController::new(batch_steps(), draft),
            mode: BatchWizardMode::Create,
        }
    }

    /// Draft pre-filled from an existing record for editing.
    pub fn new_edit(record: &BatchRecord) -> Self {
        let mut draft = Draft::from_fields([
            ("name", json!(record.name)),
            ("code", json!(record.code)),
            ("kind", json!(record.kind.label())),
            ("category", json!(record.category)),
            ("description", json!(record.description)),
            ("start_date", json!(record.start_date.to_string())),
            ("end_date", json!(record.end_date.to_string())),
            ("publish_state", json!(record.publish_state.label())),
            ("visibility", json!(record.visibility.label())),
            ("per_person_cap", json!(record.per_person_cap)),
            ("requires_approval", json!(record.requires_approval)),
        ]);
        for material in &record.materials {
            draft.push_item(
                "materials",
                json!({
                    "name": material.name,
                    "required": material.required,
                    "description": material.description,
                }),
            );
        }
        for limit in &record.department_limits {
            draft.push_item(
                "department_limits",
                json!({"department": limit.department, "cap": limit.cap}),
            );
        }
        Self {
            controller: WizardController::new(batch_steps(), draft),
            mode: BatchWizardMode::Edit {
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

    /// Submits through the backend, creating or updating depending on how
    /// the wizard was opened. Returns the batch id.
    pub fn submit(
        &mut self,
        backend: &mut dyn SubmissionBackend,
    ) -> Result<String, SubmitError<BackendError>> {
        let mode = self.mode.clone();
        self.controller.submit(|draft| match &mode {
            BatchWizardMode::Create => backend.create_batch(draft),
            BatchWizardMode::Edit { id } => {
                backend.update_batch(id, draft).map(|_| id.clone())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_step_zero_advances() {
        let mut wizard = BatchWizard::new_create(BatchKind::Application);
        let controller = wizard.controller_mut();
        controller.update_field("name", "2025 Batch");
        controller.update_field("category", "校级科研项目");
        controller.update_field("start_date", "2025-02-01");
        controller.update_field("end_date", "2025-03-01");
        assert!(controller.go_next());
        assert_eq!(controller.current_index(), 1);
    }

    #[test]
    fn inverted_dates_block_step_zero() {
        let mut wizard = BatchWizard::new_create(BatchKind::Application);
        let controller = wizard.controller_mut();
        controller.update_field("name", "日期颠倒");
        controller.update_field("category", "校级科研项目");
        controller.update_field("start_date", "2025-03-01");
        controller.update_field("end_date", "2025-02-01");
        assert!(!controller.go_next());
        assert_eq!(controller.current_index(), 0);
        assert!(controller
            .errors()
            .get("end_date")
            .is_some_and(|message| message.contains("不能早于开始日期")));
    }

    #[test]
    fn approver_only_required_while_toggle_is_on() {
        let mut wizard = BatchWizard::new_create(BatchKind::Application);
        let controller = wizard.controller_mut();
        controller.update_field("requires_approval", true);
        let errors = controller.validate_step(1);
        assert!(errors.contains_key("approver"));

        // Toggle off: the stale (absent) approver is no longer validated.
        controller.update_field("requires_approval", false);
        let errors = controller.validate_step(1);
        assert!(!errors.contains_key("approver"));
    }

    #[test]
    fn duplicate_department_limits_are_rejected() {
        let mut wizard = BatchWizard::new_create(BatchKind::Review);
        let controller = wizard.controller_mut();
        controller.push_item("department_limits", json!({"department": "计算机学院", "cap": 10}));
        controller.push_item("department_limits", json!({"department": "计算机学院", "cap": 5}));
        let errors = controller.validate_step(3);
        assert!(errors
            .get("department_limits")
            .is_some_and(|message| message.contains("重复")));
    }
}
