// ── List view ──
//
// Maps pagination and sort interaction back into the store, and decides
// which actions each row offers.

use std::sync::Arc;

use super::store::ListStore;
use super::table::{Sort, SortOrder, TableState};
use crate::model::{RecordStatus, RowAction, TransitionKind};
use crate::resource::{Resource, ResourceKind};

/// Page position summary for footers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based current page.
    pub page: u32,
    /// At least 1, even for an empty result.
    pub page_count: u32,
    /// 1-based index of the first visible row; 0 when empty.
    pub first_item: u64,
    pub last_item: u64,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct ListView {
    store: Arc<ListStore>,
    kind: ResourceKind,
}

impl ListView {
    pub fn new(store: Arc<ListStore>, kind: ResourceKind) -> Self {
        Self { store, kind }
    }

    pub fn store(&self) -> &Arc<ListStore> {
        &self.store
    }

    fn update(&self, f: impl FnOnce(&mut TableState)) {
        let mut table = self.store.table();
        f(&mut table);
        self.store.set_table_data(table);
    }

    /// Jump to a 1-based page. Values below 1 clamp to 1.
    pub fn go_to_page(&self, ui_page: u32) {
        self.update(|t| t.page_index = ui_page.max(1) - 1);
    }

    pub fn next_page(&self, total: u64) {
        let info = self.page_info(total);
        if info.page < info.page_count {
            self.go_to_page(info.page + 1);
        }
    }

    pub fn prev_page(&self) {
        let current = self.store.table().page_index + 1;
        self.go_to_page(current.saturating_sub(1));
    }

    /// Change the page size. Always returns to the first page.
    pub fn set_page_size(&self, page_size: u32) {
        self.update(|t| {
            t.page_size = page_size.max(1);
            t.page_index = 0;
        });
    }

    /// Replace the sort. Ordering itself happens server-side.
    pub fn set_sort(&self, sort: Sort) {
        self.update(|t| t.sort = sort);
    }

    /// Cycle through the entity's sort keys and orders:
    /// key₁ asc → key₁ desc → key₂ asc → … → unsorted.
    pub fn cycle_sort(&self) {
        let keys = self.kind.sort_keys();
        let current = self.store.table().sort;
        let position = current
            .key
            .as_deref()
            .and_then(|k| keys.iter().position(|candidate| *candidate == k));

        let next = match (position, current.order) {
            (Some(i), SortOrder::Ascend) => Sort::new(keys[i], SortOrder::Descend),
            (Some(i), SortOrder::Descend) => match keys.get(i + 1) {
                Some(key) => Sort::new(*key, SortOrder::Ascend),
                None => Sort::default(),
            },
            _ => keys
                .first()
                .map_or_else(Sort::default, |key| Sort::new(*key, SortOrder::Ascend)),
        };
        self.set_sort(next);
    }

    pub fn page_info(&self, total: u64) -> PageInfo {
        let table = self.store.table();
        page_info(&table, total)
    }

    /// Actions a row offers, given its current state.
    pub fn row_actions<R: Resource>(&self, record: &R) -> Vec<RowAction> {
        debug_assert_eq!(R::KIND, self.kind);
        row_actions(record)
    }
}

pub fn page_info(table: &TableState, total: u64) -> PageInfo {
    let size = u64::from(table.page_size.max(1));
    let page_count = u32::try_from(total.div_ceil(size).max(1)).unwrap_or(u32::MAX);
    let page = table.page_index.saturating_add(1);
    let offset = u64::from(table.page_index) * size;
    let (first_item, last_item) = if offset >= total {
        (0, 0)
    } else {
        (offset + 1, (offset + size).min(total))
    };
    PageInfo {
        page,
        page_count,
        first_item,
        last_item,
        total,
    }
}

/// Edit and delete are always offered. Transitions are offered only when
/// the entity supports them and the record is not already in the target
/// state.
pub fn row_actions<R: Resource>(record: &R) -> Vec<RowAction> {
    let mut actions = vec![RowAction::Edit, RowAction::Delete];
    let status = record.status();
    let pinned = record.is_pinned();

    for transition in R::KIND.transitions() {
        let offered = match transition {
            TransitionKind::Publish => status != Some(RecordStatus::Published),
            TransitionKind::Archive => status != Some(RecordStatus::Archived),
            TransitionKind::Pin => pinned == Some(false),
            TransitionKind::Unpin => pinned == Some(true),
        };
        if offered {
            actions.push(RowAction::from(*transition));
        }
    }
    actions
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Announcement, Role, Violation};

    fn view() -> ListView {
        ListView::new(Arc::new(ListStore::default()), ResourceKind::Announcements)
    }

    #[test]
    fn page_size_change_resets_index() {
        let view = view();
        view.go_to_page(5);
        assert_eq!(view.store().table().page_index, 4);
        view.set_page_size(25);
        assert_eq!(view.store().table().page_index, 0);
        view.go_to_page(3);
        view.set_page_size(25);
        assert_eq!(view.store().table().page_index, 0, "same size still resets");
    }

    #[test]
    fn go_to_page_clamps_to_one() {
        let view = view();
        view.go_to_page(0);
        assert_eq!(view.store().table().page_index, 0);
    }

    #[test]
    fn page_info_ranges() {
        let view = view();
        view.go_to_page(3);
        let info = view.page_info(25);
        assert_eq!(info.page, 3);
        assert_eq!(info.page_count, 3);
        assert_eq!((info.first_item, info.last_item), (21, 25));
        assert_eq!(view.page_info(0).page_count, 1);
    }

    #[test]
    fn cycle_sort_walks_keys() {
        let view = view();
        view.cycle_sort();
        assert_eq!(view.store().table().sort, Sort::new("createdAt", SortOrder::Ascend));
        view.cycle_sort();
        assert_eq!(view.store().table().sort, Sort::new("createdAt", SortOrder::Descend));
        view.cycle_sort();
        assert_eq!(view.store().table().sort, Sort::new("publishAt", SortOrder::Ascend));
    }

    #[test]
    fn published_pinned_announcement_actions() {
        let record: Announcement = serde_json::from_value(serde_json::json!({
            "id": 1, "title": "t", "status": "Published", "isPinned": true, "pinnedOrder": 1
        }))
        .unwrap();
        assert_eq!(
            row_actions(&record),
            vec![RowAction::Edit, RowAction::Delete, RowAction::Unpin, RowAction::Archive]
        );
    }

    #[test]
    fn draft_announcement_actions() {
        let record: Announcement =
            serde_json::from_value(serde_json::json!({ "id": 1, "title": "t" })).unwrap();
        assert_eq!(
            row_actions(&record),
            vec![
                RowAction::Edit,
                RowAction::Delete,
                RowAction::Publish,
                RowAction::Pin,
                RowAction::Archive
            ]
        );
    }

    #[test]
    fn violations_and_roles_offer_only_their_transitions() {
        let v: Violation = serde_json::from_value(serde_json::json!({
            "id": 1, "referenceNumber": "V-1", "title": "t", "status": "Archived"
        }))
        .unwrap();
        assert_eq!(row_actions(&v), vec![RowAction::Edit, RowAction::Delete]);

        let r: Role = serde_json::from_value(serde_json::json!({ "id": 1, "name": "Editors" }))
            .unwrap();
        assert_eq!(row_actions(&r), vec![RowAction::Edit, RowAction::Delete]);
    }
}
