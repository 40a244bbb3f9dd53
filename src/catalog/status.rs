use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a batch relative to its submission window.
///
/// Every card, table, and filter derives the displayed phase through
/// [`derive_phase`] so the same dates can never render differently across
/// views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    InProgress,
    Ended,
}

impl Phase {
    /// Display label shown to administrators.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::NotStarted => "未开始",
            Phase::InProgress => "进行中",
            Phase::Ended => "已结束",
        }
    }

    /// Ordering rank used by list views: running batches first, upcoming
    /// batches second, finished batches last.
    pub fn sort_rank(&self) -> u8 {
        match self {
            Phase::InProgress => 0,
            Phase::NotStarted => 1,
            Phase::Ended => 2,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derives the phase of a submission window at the given instant.
pub fn derive_phase(now: NaiveDate, start: NaiveDate, end: NaiveDate) -> Phase {
    if now < start {
        Phase::NotStarted
    } else if now > end {
        Phase::Ended
    } else {
        Phase::InProgress
    }
}
