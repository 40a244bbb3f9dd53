use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the application document (申请书) for a project is produced.
///
/// The project wizard resolves its step list from this field, so the value
/// lives in the draft and the registry is re-derived whenever it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormGenerationType {
    /// 全流程在线生成: the document body is written inside the wizard.
    Online,
    /// 智能协同生成: a shared editing session produces the document.
    Collaborative,
    /// 线下模板化: a template is filled offline and uploaded as attachments.
    OfflineTemplate,
}

impl FormGenerationType {
    pub fn label(&self) -> &'static str {
        match self {
            FormGenerationType::Online => "全流程在线生成",
            FormGenerationType::Collaborative => "智能协同生成",
            FormGenerationType::OfflineTemplate => "线下模板化",
        }
    }

    /// Parses the display label back into the variant. Drafts store the
    /// label because that is what the selection control captures.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "全流程在线生成" => Some(FormGenerationType::Online),
            "智能协同生成" => Some(FormGenerationType::Collaborative),
            "线下模板化" => Some(FormGenerationType::OfflineTemplate),
            _ => None,
        }
    }
}

/// Review outcome of a submitted project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectState {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl ProjectState {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectState::Submitted => "已提交",
            ProjectState::UnderReview => "评审中",
            ProjectState::Approved => "已立项",
            ProjectState::Rejected => "未通过",
        }
    }
}

/// A research team member line item on a project draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    pub department: String,
}

/// One budget row on a project draft. Amounts are stored in yuan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub item: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Metadata of an uploaded attachment. Only the metadata is modelled;
/// file storage itself is out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub file_name: String,
    pub material_name: String,
    pub size_bytes: u64,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        material_name: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            material_name: material_name.into(),
            size_bytes,
        }
    }
}

/// A project application as returned by backend list queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub batch_id: String,
    pub title: String,
    pub leader: String,
    pub department: String,
    pub description: String,
    pub generation_type: FormGenerationType,
    pub state: ProjectState,
    pub submitted_on: NaiveDate,
    pub team_members: Vec<TeamMember>,
    pub budget_items: Vec<BudgetItem>,
    pub attachments: Vec<Attachment>,
}

impl ProjectRecord {
    /// Sum of all budget rows.
    pub fn total_budget(&self) -> f64 {
        self.budget_items.iter().map(|item| item.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_type_labels_round_trip() {
        for kind in [
            FormGenerationType::Online,
            FormGenerationType::Collaborative,
            FormGenerationType::OfflineTemplate,
        ] {
            assert_eq!(FormGenerationType::from_label(kind.label()), Some(kind));
        }
        assert_eq!(FormGenerationType::from_label("手写"), None);
    }
}
