//! Expert notification dispatch.
//!
//! Expert selection travels from the assignment views to the send page as
//! a typed [`NotificationRequest`] rather than loose string keys in a
//! session store, so the contract between pages is explicit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::backend::{BackendError, SubmissionBackend};

/// Typed handoff carrying everything the notification page needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub batch_id: String,
    pub expert_ids: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl NotificationRequest {
    pub fn new(batch_id: impl Into<String>, expert_ids: Vec<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            expert_ids,
            subject: String::new(),
            body: String::new(),
        }
    }

    /// Field-keyed validation mirroring the wizard error contract: empty
    /// map means the request may be dispatched.
    pub fn validate(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();
        if self.batch_id.trim().is_empty() {
            errors.insert("batch_id".into(), "请选择评审批次".into());
        }
        if self.expert_ids.is_empty() {
            errors.insert("expert_ids".into(), "请至少选择一位评审专家".into());
        }
        if self.subject.trim().is_empty() {
            errors.insert("subject".into(), "通知标题不能为空".into());
        }
        if self.body.trim().is_empty() {
            errors.insert("body".into(), "通知内容不能为空".into());
        }
        errors
    }
}

/// Validates and dispatches a notification through the backend.
///
/// Validation failures are returned as the field-keyed error map;
/// operation failures bubble up as [`BackendError`] for the toast path.
pub fn dispatch(
    backend: &mut dyn SubmissionBackend,
    request: &NotificationRequest,
) -> Result<usize, DispatchError> {
    let errors = request.validate();
    if !errors.is_empty() {
        return Err(DispatchError::Invalid(errors));
    }
    let delivered = backend.notify_experts(request)?;
    tracing::info!(
        batch_id = %request.batch_id,
        delivered,
        "review notification dispatched"
    );
    Ok(delivered)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    Invalid(BTreeMap<String, String>),
    Backend(BackendError),
}

impl From<BackendError> for DispatchError {
    fn from(err: BackendError) -> Self {
        DispatchError::Backend(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_reports_every_missing_field() {
        let request = NotificationRequest::new("", Vec::new());
        let errors = request.validate();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains_key("expert_ids"));
    }

    #[test]
    fn filled_request_passes_validation() {
        let mut request =
            NotificationRequest::new("batch-1", vec!["exp-1".into(), "exp-2".into()]);
        request.subject = "评审邀请".into();
        request.body = "请于本周内完成线上评审。".into();
        assert!(request.validate().is_empty());
    }
}
