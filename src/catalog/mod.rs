//! Domain catalog: batches, projects, experts, and phase derivation.

pub mod batch;
pub mod expert;
pub mod project;
pub mod status;

pub use batch::{
    BatchKind, BatchRecord, DepartmentLimit, Material, PublishState, Visibility,
};
pub use expert::ExpertInfo;
pub use project::{
    Attachment, BudgetItem, FormGenerationType, ProjectRecord, ProjectState, TeamMember,
};
pub use status::{derive_phase, Phase};
