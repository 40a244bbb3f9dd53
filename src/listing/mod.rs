//! Projection of backend query results into filtered, sorted, paginated
//! views, plus the selection state feeding batch-action bars. Nothing in
//! here mutates records.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{BatchKind, BatchRecord, Phase};

/// Discrete and free-text filters for batch views. Active filters combine
/// with logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchFilter {
    /// Case-insensitive substring matched against name and description.
    pub search: Option<String>,
    pub kind: Option<BatchKind>,
    pub phase: Option<Phase>,
    pub category: Option<String>,
}

impl BatchFilter {
    pub fn matches(&self, record: &BatchRecord, now: NaiveDate) -> bool {
        if let Some(kind) = self.kind {
            if record.kind != kind {
                return false;
            }
        }
        if let Some(phase) = self.phase {
            if record.phase(now) != phase {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &record.category != category {
                return false;
            }
        }
        if let Some(term) = self.search.as_deref() {
            let term = term.trim().to_lowercase();
            if !term.is_empty() {
                let name = record.name.to_lowercase();
                let description = record.description.to_lowercase();
                if !name.contains(&term) && !description.contains(&term) {
                    return false;
                }
            }
        }
        true
    }
}

/// User-selected sort applied within equal-phase groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Name,
    StartDate,
    EndDate,
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::StartDate
    }
}

/// Filters and orders batches for display. Phase priority dominates
/// (进行中, then 未开始, then 已结束); the sort key breaks ties inside each
/// phase group.
pub fn project_batches<'a>(
    records: &'a [BatchRecord],
    filter: &BatchFilter,
    sort: SortKey,
    now: NaiveDate,
) -> Vec<&'a BatchRecord> {
    let mut visible: Vec<&BatchRecord> = records
        .iter()
        .filter(|record| filter.matches(record, now))
        .collect();
    visible.sort_by(|a, b| {
        let rank = a.phase(now).sort_rank().cmp(&b.phase(now).sort_rank());
        rank.then_with(|| match sort {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::StartDate => a.start_date.cmp(&b.start_date),
            SortKey::EndDate => a.end_date.cmp(&b.end_date),
        })
    });
    visible
}

/// One page of a projected result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }
}

/// Slices a projected list into the requested page (1-based).
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let total = items.len();
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    Page {
        items: items[start..end].to_vec(),
        total,
        page,
        page_size,
    }
}

/// Selected row/card ids backing the batch-actions bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.ids.insert(id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PublishState, Visibility};

    fn batch(id: &str, name: &str, kind: BatchKind, start: (i32, u32, u32), end: (i32, u32, u32)) -> BatchRecord {
        BatchRecord {
            id: id.into(),
            name: name.into(),
            code: format!("PC-{id}"),
            category: "校级科研项目".into(),
            kind,
            description: format!("{name}的申报与评审"),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            publish_state: PublishState::Published,
            visibility: Visibility::Public,
            per_person_cap: 1,
            requires_approval: false,
            materials: Vec::new(),
            department_limits: Vec::new(),
            project_count: 0,
        }
    }

    #[test]
    fn phase_priority_dominates_sort_key() {
        let now = NaiveDate::from_ymd_opt(2025, 2, 15).unwrap();
        let records = vec![
            batch("1", "甲 ended", BatchKind::Application, (2025, 1, 1), (2025, 1, 31)),
            batch("2", "乙 upcoming", BatchKind::Application, (2025, 3, 1), (2025, 3, 31)),
            batch("3", "丙 running", BatchKind::Application, (2025, 2, 1), (2025, 2, 28)),
        ];
        let sorted = project_batches(&records, &BatchFilter::default(), SortKey::Name, now);
        let ids: Vec<&str> = sorted.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn selection_supports_toggle_select_all_clear() {
        let mut selection = Selection::new();
        selection.toggle("a");
        selection.toggle("b");
        selection.toggle("a");
        assert!(selection.is_selected("b"));
        assert_eq!(selection.len(), 1);

        selection.select_all(["a", "b", "c"]);
        assert_eq!(selection.len(), 3);
        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn pagination_clamps_out_of_range_pages() {
        let items: Vec<u32> = (0..7).collect();
        let page = paginate(&items, 2, 3);
        assert_eq!(page.items, vec![3, 4, 5]);
        assert_eq!(page.page_count(), 3);

        let past_end = paginate(&items, 9, 3);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 7);
    }
}
