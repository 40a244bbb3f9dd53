use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{derive_phase, Phase};

/// Distinguishes application (申报) batches from review (评审) batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchKind {
    Application,
    Review,
}

impl BatchKind {
    pub fn label(&self) -> &'static str {
        match self {
            BatchKind::Application => "申报批次",
            BatchKind::Review => "评审批次",
        }
    }
}

/// Publication state chosen when a batch is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishState {
    Draft,
    Published,
}

impl PublishState {
    pub fn label(&self) -> &'static str {
        match self {
            PublishState::Draft => "草稿",
            PublishState::Published => "已发布",
        }
    }
}

/// Who can see a published batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn label(&self) -> &'static str {
        match self {
            Visibility::Public => "公开",
            Visibility::Private => "私有",
        }
    }
}

/// A required or optional submission material configured on a batch.
///
/// Ids are generated client-side when the row is added, so rows stay
/// addressable while the draft is being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Material {
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            required,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Per-department submission cap. Unique by department name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentLimit {
    pub department: String,
    pub cap: u32,
}

/// A batch as returned by the backend list queries. Read-only from the
/// wizard's point of view; edits go through a fresh draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: String,
    pub name: String,
    pub code: String,
    pub category: String,
    pub kind: BatchKind,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub publish_state: PublishState,
    pub visibility: Visibility,
    pub per_person_cap: u32,
    pub requires_approval: bool,
    pub materials: Vec<Material>,
    pub department_limits: Vec<DepartmentLimit>,
    pub project_count: u32,
}

impl BatchRecord {
    /// Phase of this batch at the given instant. Always derived, never
    /// stored, so views cannot drift apart.
    pub fn phase(&self, now: NaiveDate) -> Phase {
        derive_phase(now, self.start_date, self.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_rows_get_distinct_ids() {
        let a = Material::new("申报书", true);
        let b = Material::new("汇报PPT", false).with_description("评审现场使用");
        assert_ne!(a.id, b.id);
        assert!(b.description.is_some());
    }
}
