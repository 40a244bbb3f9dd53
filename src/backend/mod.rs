//! Submission backend seam.
//!
//! Wizard pages and list views only ever talk to [`SubmissionBackend`];
//! the bundled [`MockBackend`] stands in for the real service with
//! in-memory records and simulated latency, so a live implementation is a
//! drop-in replacement with no UI changes.

pub mod mock;

use chrono::NaiveDate;
use thiserror::Error;

use crate::catalog::{BatchRecord, ExpertInfo, ProjectRecord};
use crate::listing::{BatchFilter, Page, SortKey};
use crate::notify::NotificationRequest;
use crate::wizard::Draft;

pub use mock::MockBackend;

/// Operation failures surfaced to the user as a dismissable toast. Always
/// recoverable; the draft under submission is never consumed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("服务暂不可用，请稍后重试: {0}")]
    Unavailable(String),
    #[error("记录不存在: {0}")]
    NotFound(String),
    #[error("提交被拒绝: {0}")]
    Rejected(String),
}

/// Paged list query for batch views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchQuery {
    pub filter: BatchFilter,
    pub sort: SortKey,
    pub page: usize,
    pub page_size: usize,
}

impl BatchQuery {
    pub fn first_page(page_size: usize) -> Self {
        Self {
            filter: BatchFilter::default(),
            sort: SortKey::default(),
            page: 1,
            page_size,
        }
    }
}

/// The create/update/delete/list contract every page assumes.
///
/// `now` is passed explicitly wherever phase derivation is involved, so
/// query results are reproducible in tests.
pub trait SubmissionBackend {
    fn create_batch(&mut self, draft: &Draft) -> Result<String, BackendError>;
    fn update_batch(&mut self, id: &str, draft: &Draft) -> Result<(), BackendError>;
    fn delete_batch(&mut self, id: &str) -> Result<(), BackendError>;
    fn get_batch(&mut self, id: &str) -> Result<BatchRecord, BackendError>;
    fn list_batches(
        &mut self,
        query: &BatchQuery,
        now: NaiveDate,
    ) -> Result<Page<BatchRecord>, BackendError>;

    fn create_project(&mut self, batch_id: &str, draft: &Draft) -> Result<String, BackendError>;
    fn update_project(&mut self, id: &str, draft: &Draft) -> Result<(), BackendError>;
    fn delete_project(&mut self, id: &str) -> Result<(), BackendError>;
    fn list_projects(
        &mut self,
        batch_id: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Page<ProjectRecord>, BackendError>;

    fn list_experts(&mut self, page: usize, page_size: usize)
        -> Result<Page<ExpertInfo>, BackendError>;

    /// Dispatches a review notification, returning how many experts were
    /// reached.
    fn notify_experts(&mut self, request: &NotificationRequest) -> Result<usize, BackendError>;
}
