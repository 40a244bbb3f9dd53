use serde::{Deserialize, Serialize};

/// A reviewing expert available for batch assignment and notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertInfo {
    pub id: String,
    pub name: String,
    pub title: String,
    pub institution: String,
    pub field: String,
    pub email: String,
}
