//! In-memory backend used while no real service exists.
//!
//! Mirrors the behaviour the UI currently assumes: every call resolves
//! after a fixed delay, ids are assigned sequentially, and nothing is
//! persisted across restarts. Tests construct it with zero latency and can
//! inject a failure to exercise the toast path.

use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;

use crate::catalog::{
    BatchKind, BatchRecord, BudgetItem, DepartmentLimit, ExpertInfo, FormGenerationType,
    Material, ProjectRecord, ProjectState, PublishState, TeamMember, Visibility,
};
use crate::listing::{paginate, project_batches, Page};
use crate::notify::NotificationRequest;
use crate::wizard::Draft;

use super::{BackendError, BatchQuery, SubmissionBackend};

pub struct MockBackend {
    batches: Vec<BatchRecord>,
    projects: Vec<ProjectRecord>,
    experts: Vec<ExpertInfo>,
    next_id: u32,
    latency: Duration,
    fail_next: Option<BackendError>,
}

impl MockBackend {
    /// Empty backend with no latency; the default for tests.
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
            projects: Vec::new(),
            experts: Vec::new(),
            next_id: 1,
            latency: Duration::ZERO,
            fail_next: None,
        }
    }

    /// Backend pre-loaded with the deterministic sample set the browsing
    /// views were designed against.
    pub fn with_sample_data() -> Self {
        let mut backend = Self::new();
        backend.batches = sample_batches();
        backend.projects = sample_projects();
        backend.experts = sample_experts();
        backend.next_id = 100;
        backend
    }

    /// Simulated network delay applied to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_latency(&mut self, latency: Duration) {
        self.latency = latency;
    }

    /// Makes the next call fail with the given error, then recover.
    pub fn fail_next(&mut self, error: BackendError) {
        self.fail_next = Some(error);
    }

    fn settle(&mut self) -> Result<(), BackendError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        match self.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn assign_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{}", self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionBackend for MockBackend {
    fn create_batch(&mut self, draft: &Draft) -> Result<String, BackendError> {
        self.settle()?;
        let id = self.assign_id("batch");
        let record = batch_from_draft(&id, draft)?;
        tracing::debug!(id = %record.id, name = %record.name, "mock batch created");
        self.batches.push(record);
        Ok(id)
    }

    fn update_batch(&mut self, id: &str, draft: &Draft) -> Result<(), BackendError> {
        self.settle()?;
        let updated = batch_from_draft(id, draft)?;
        let slot = self
            .batches
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        let project_count = slot.project_count;
        *slot = updated;
        slot.project_count = project_count;
        Ok(())
    }

    fn delete_batch(&mut self, id: &str) -> Result<(), BackendError> {
        self.settle()?;
        let before = self.batches.len();
        self.batches.retain(|record| record.id != id);
        if self.batches.len() == before {
            return Err(BackendError::NotFound(id.to_string()));
        }
        self.projects.retain(|project| project.batch_id != id);
        Ok(())
    }

    fn get_batch(&mut self, id: &str) -> Result<BatchRecord, BackendError> {
        self.settle()?;
        self.batches
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(id.to_string()))
    }

    fn list_batches(
        &mut self,
        query: &BatchQuery,
        now: NaiveDate,
    ) -> Result<Page<BatchRecord>, BackendError> {
        self.settle()?;
        let visible: Vec<BatchRecord> =
            project_batches(&self.batches, &query.filter, query.sort, now)
                .into_iter()
                .cloned()
                .collect();
        Ok(paginate(&visible, query.page, query.page_size))
    }

    fn create_project(&mut self, batch_id: &str, draft: &Draft) -> Result<String, BackendError> {
        self.settle()?;
        if !self.batches.iter().any(|batch| batch.id == batch_id) {
            return Err(BackendError::NotFound(batch_id.to_string()));
        }
        let id = self.assign_id("proj");
        let record = project_from_draft(&id, batch_id, draft)?;
        self.projects.push(record);
        if let Some(batch) = self.batches.iter_mut().find(|batch| batch.id == batch_id) {
            batch.project_count += 1;
        }
        Ok(id)
    }

    fn update_project(&mut self, id: &str, draft: &Draft) -> Result<(), BackendError> {
        self.settle()?;
        let batch_id = self
            .projects
            .iter()
            .find(|project| project.id == id)
            .map(|project| project.batch_id.clone())
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        let updated = project_from_draft(id, &batch_id, draft)?;
        if let Some(slot) = self.projects.iter_mut().find(|project| project.id == id) {
            *slot = updated;
        }
        Ok(())
    }

    fn delete_project(&mut self, id: &str) -> Result<(), BackendError> {
        self.settle()?;
        let batch_id = self
            .projects
            .iter()
            .find(|project| project.id == id)
            .map(|project| project.batch_id.clone())
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        self.projects.retain(|project| project.id != id);
        if let Some(batch) = self.batches.iter_mut().find(|batch| batch.id == batch_id) {
            batch.project_count = batch.project_count.saturating_sub(1);
        }
        Ok(())
    }

    fn list_projects(
        &mut self,
        batch_id: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Page<ProjectRecord>, BackendError> {
        self.settle()?;
        let visible: Vec<ProjectRecord> = self
            .projects
            .iter()
            .filter(|project| batch_id.map_or(true, |id| project.batch_id == id))
            .cloned()
            .collect();
        Ok(paginate(&visible, page, page_size))
    }

    fn list_experts(
        &mut self,
        page: usize,
        page_size: usize,
    ) -> Result<Page<ExpertInfo>, BackendError> {
        self.settle()?;
        Ok(paginate(&self.experts, page, page_size))
    }

    fn notify_experts(&mut self, request: &NotificationRequest) -> Result<usize, BackendError> {
        self.settle()?;
        if !self.batches.iter().any(|batch| batch.id == request.batch_id) {
            return Err(BackendError::NotFound(request.batch_id.clone()));
        }
        let known = request
            .expert_ids
            .iter()
            .filter(|id| self.experts.iter().any(|expert| &expert.id == *id))
            .count();
        Ok(known)
    }
}

fn required_str(draft: &Draft, key: &str) -> Result<String, BackendError> {
    draft
        .str_field(key)
        .map(str::to_string)
        .ok_or_else(|| BackendError::Rejected(format!("缺少必填字段 {key}")))
}

fn required_date(draft: &Draft, key: &str) -> Result<NaiveDate, BackendError> {
    draft
        .date_field(key)
        .ok_or_else(|| BackendError::Rejected(format!("字段 {key} 不是有效日期")))
}

fn batch_from_draft(id: &str, draft: &Draft) -> Result<BatchRecord, BackendError> {
    let kind = match draft.str_field("kind") {
        Some("评审批次") => BatchKind::Review,
        _ => BatchKind::Application,
    };
    let publish_state = match draft.str_field("publish_state") {
        Some("已发布") => PublishState::Published,
        _ => PublishState::Draft,
    };
    let visibility = match draft.str_field("visibility") {
        Some("私有") => Visibility::Private,
        _ => Visibility::Public,
    };

    let materials = draft
        .items("materials")
        .iter()
        .filter_map(material_from_value)
        .collect();
    let department_limits = draft
        .items("department_limits")
        .iter()
        .filter_map(|value| {
            Some(DepartmentLimit {
                department: value.get("department")?.as_str()?.to_string(),
                cap: value.get("cap")?.as_u64()? as u32,
            })
        })
        .collect();

    Ok(BatchRecord {
        id: id.to_string(),
        name: required_str(draft, "name")?,
        code: draft.str_field("code").unwrap_or_default().to_string(),
        category: required_str(draft, "category")?,
        kind,
        description: draft
            .str_field("description")
            .unwrap_or_default()
            .to_string(),
        start_date: required_date(draft, "start_date")?,
        end_date: required_date(draft, "end_date")?,
        publish_state,
        visibility,
        per_person_cap: draft.int_field("per_person_cap").unwrap_or(1).max(1) as u32,
        requires_approval: draft.flag("requires_approval"),
        materials,
        department_limits,
        project_count: 0,
    })
}

fn material_from_value(value: &Value) -> Option<Material> {
    let mut material = Material::new(
        value.get("name")?.as_str()?,
        value.get("required").and_then(Value::as_bool).unwrap_or(true),
    );
    if let Some(description) = value.get("description").and_then(Value::as_str) {
        if !description.trim().is_empty() {
            material = material.with_description(description);
        }
    }
    Some(material)
}

fn project_from_draft(
    id: &str,
    batch_id: &str,
    draft: &Draft,
) -> Result<ProjectRecord, BackendError> {
    let generation_type = draft
        .str_field("generation_type")
        .and_then(FormGenerationType::from_label)
        .unwrap_or(FormGenerationType::Online);

    let team_members = draft
        .items("team_members")
        .iter()
        .filter_map(|value| {
            Some(TeamMember {
                name: value.get("name")?.as_str()?.to_string(),
                role: value
                    .get("role")
                    .and_then(Value::as_str)
                    .unwrap_or("成员")
                    .to_string(),
                department: value
                    .get("department")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect();
    let budget_items = draft
        .items("budget_items")
        .iter()
        .filter_map(|value| {
            Some(BudgetItem {
                item: value.get("item")?.as_str()?.to_string(),
                amount: value.get("amount")?.as_f64()?,
                note: value
                    .get("note")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect();
    let attachments = draft
        .items("attachments")
        .iter()
        .filter_map(|value| {
            Some(crate::catalog::Attachment::new(
                value.get("file_name")?.as_str()?,
                value
                    .get("material_name")
                    .and_then(Value::as_str)
                    .unwrap_or_default(),
                value.get("size_bytes").and_then(Value::as_u64).unwrap_or(0),
            ))
        })
        .collect();

    Ok(ProjectRecord {
        id: id.to_string(),
        batch_id: batch_id.to_string(),
        title: required_str(draft, "title")?,
        leader: required_str(draft, "leader")?,
        department: draft
            .str_field("department")
            .unwrap_or_default()
            .to_string(),
        description: draft
            .str_field("description")
            .unwrap_or_default()
            .to_string(),
        generation_type,
        state: ProjectState::Submitted,
        submitted_on: today(),
        team_members,
        budget_items,
        attachments,
    })
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn sample_batches() -> Vec<BatchRecord> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    vec![
        BatchRecord {
            id: "batch-1".into(),
            name: "2025年度校级科研项目申报".into(),
            code: "XK-2025-01".into(),
            category: "校级科研项目".into(),
            kind: BatchKind::Application,
            description: "面向全校教师的年度校级科研项目申报批次".into(),
            start_date: date(2025, 2, 1),
            end_date: date(2025, 3, 1),
            publish_state: PublishState::Published,
            visibility: Visibility::Public,
            per_person_cap: 1,
            requires_approval: true,
            materials: vec![
                Material::new("项目申报书", true),
                Material::new("预算明细表", true),
                Material::new("前期成果证明", false).with_description("已有成果的佐证材料"),
            ],
            department_limits: vec![
                DepartmentLimit {
                    department: "计算机学院".into(),
                    cap: 20,
                },
                DepartmentLimit {
                    department: "机械工程学院".into(),
                    cap: 15,
                },
            ],
            project_count: 12,
        },
        BatchRecord {
            id: "batch-2".into(),
            name: "青年教师科研启动基金".into(),
            code: "QN-2025-02".into(),
            category: "青年基金".into(),
            kind: BatchKind::Application,
            description: "支持入职三年内青年教师的启动经费申报".into(),
            start_date: date(2025, 4, 1),
            end_date: date(2025, 5, 15),
            publish_state: PublishState::Published,
            visibility: Visibility::Public,
            per_person_cap: 1,
            requires_approval: false,
            materials: vec![Material::new("项目申报书", true)],
            department_limits: Vec::new(),
            project_count: 5,
        },
        BatchRecord {
            id: "batch-3".into(),
            name: "2024年度结题项目评审".into(),
            code: "PS-2024-09".into(),
            category: "结题评审".into(),
            kind: BatchKind::Review,
            description: "对2024年度到期项目组织专家结题评审".into(),
            start_date: date(2024, 12, 1),
            end_date: date(2024, 12, 31),
            publish_state: PublishState::Published,
            visibility: Visibility::Private,
            per_person_cap: 5,
            requires_approval: false,
            materials: vec![Material::new("结题报告", true)],
            department_limits: Vec::new(),
            project_count: 30,
        },
        BatchRecord {
            id: "batch-4".into(),
            name: "重点实验室开放课题评审".into(),
            code: "PS-2025-01".into(),
            category: "开放课题".into(),
            kind: BatchKind::Review,
            description: "重点实验室开放课题的立项评审批次".into(),
            start_date: date(2025, 2, 10),
            end_date: date(2025, 2, 25),
            publish_state: PublishState::Draft,
            visibility: Visibility::Private,
            per_person_cap: 3,
            requires_approval: true,
            materials: Vec::new(),
            department_limits: Vec::new(),
            project_count: 8,
        },
    ]
}

fn sample_projects() -> Vec<ProjectRecord> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    vec![
        ProjectRecord {
            id: "proj-1".into(),
            batch_id: "batch-1".into(),
            title: "基于知识图谱的科研数据治理研究".into(),
            leader: "李明".into(),
            department: "计算机学院".into(),
            description: "构建校级科研数据知识图谱并研究治理方法".into(),
            generation_type: FormGenerationType::Online,
            state: ProjectState::UnderReview,
            submitted_on: date(2025, 2, 12),
            team_members: vec![
                TeamMember {
                    name: "李明".into(),
                    role: "负责人".into(),
                    department: "计算机学院".into(),
                },
                TeamMember {
                    name: "王芳".into(),
                    role: "成员".into(),
                    department: "计算机学院".into(),
                },
            ],
            budget_items: vec![
                BudgetItem {
                    item: "设备费".into(),
                    amount: 30000.0,
                    note: None,
                },
                BudgetItem {
                    item: "差旅费".into(),
                    amount: 8000.0,
                    note: Some("学术会议".into()),
                },
            ],
            attachments: Vec::new(),
        },
        ProjectRecord {
            id: "proj-2".into(),
            batch_id: "batch-1".into(),
            title: "新型复合材料疲劳特性分析".into(),
            leader: "张伟".into(),
            department: "机械工程学院".into(),
            description: "针对新型复合材料开展疲劳寿命建模".into(),
            generation_type: FormGenerationType::OfflineTemplate,
            state: ProjectState::Submitted,
            submitted_on: date(2025, 2, 20),
            team_members: vec![TeamMember {
                name: "张伟".into(),
                role: "负责人".into(),
                department: "机械工程学院".into(),
            }],
            budget_items: vec![BudgetItem {
                item: "材料费".into(),
                amount: 20000.0,
                note: None,
            }],
            attachments: vec![crate::catalog::Attachment::new(
                "申报书-张伟.docx",
                "项目申报书",
                1_048_576,
            )],
        },
    ]
}

fn sample_experts() -> Vec<ExpertInfo> {
    vec![
        ExpertInfo {
            id: "exp-1".into(),
            name: "陈国华".into(),
            title: "教授".into(),
            institution: "华东理工大学".into(),
            field: "人工智能".into(),
            email: "chen.gh@example.edu.cn".into(),
        },
        ExpertInfo {
            id: "exp-2".into(),
            name: "刘晓燕".into(),
            title: "研究员".into(),
            institution: "中科院自动化所".into(),
            field: "模式识别".into(),
            email: "liu.xy@example.ac.cn".into(),
        },
        ExpertInfo {
            id: "exp-3".into(),
            name: "赵建军".into(),
            title: "副教授".into(),
            institution: "同济大学".into(),
            field: "机械设计".into(),
            email: "zhao.jj@example.edu.cn".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch_draft() -> Draft {
        let mut draft = Draft::new();
        draft.set("name", "测试批次");
        draft.set("category", "校级科研项目");
        draft.set("kind", "申报批次");
        draft.set("start_date", "2025-02-01");
        draft.set("end_date", "2025-03-01");
        draft.push_item("materials", json!({"name": "项目申报书", "required": true}));
        draft
    }

    #[test]
    fn create_then_get_round_trips_the_draft() {
        let mut backend = MockBackend::new();
        let id = backend.create_batch(&batch_draft()).expect("create");
        let record = backend.get_batch(&id).expect("get");
        assert_eq!(record.name, "测试批次");
        assert_eq!(record.materials.len(), 1);
        assert_eq!(record.kind, BatchKind::Application);
    }

    #[test]
    fn injected_failure_hits_once_then_recovers() {
        let mut backend = MockBackend::new();
        backend.fail_next(BackendError::Unavailable("mock outage".into()));
        assert!(backend.create_batch(&batch_draft()).is_err());
        assert!(backend.create_batch(&batch_draft()).is_ok());
    }

    #[test]
    fn deleting_a_batch_drops_its_projects() {
        let mut backend = MockBackend::with_sample_data();
        backend.delete_batch("batch-1").expect("delete");
        let page = backend.list_projects(Some("batch-1"), 1, 10).expect("list");
        assert_eq!(page.total, 0);
    }

    #[test]
    fn notify_counts_only_known_experts() {
        let mut backend = MockBackend::with_sample_data();
        let mut request = NotificationRequest::new(
            "batch-3",
            vec!["exp-1".into(), "exp-9".into()],
        );
        request.subject = "评审邀请".into();
        request.body = "请完成评审。".into();
        let delivered = backend.notify_experts(&request).expect("notify");
        assert_eq!(delivered, 1);
    }
}
