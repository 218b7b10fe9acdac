// ── Filter/table state store ──
//
// Pure state for one list instance: pagination, sort, filters. No I/O and
// no validation. Subscribers are notified through a `watch` channel.

use tokio::sync::watch;
use tracing::trace;

use super::filter::FilterState;
use super::table::TableState;

/// Everything a list's request parameters are derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    pub table: TableState,
    pub filters: FilterState,
}

/// Table and filter state for one list. Share it as `Arc<ListStore>`.
#[derive(Debug)]
pub struct ListStore {
    state: watch::Sender<ListState>,
    default_filters: FilterState,
}

impl ListStore {
    pub fn new(table: TableState, default_filters: FilterState) -> Self {
        let default_filters = default_filters.cleaned();
        let (state, _) = watch::channel(ListState {
            table,
            filters: default_filters.clone(),
        });
        Self {
            state,
            default_filters,
        }
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self::new(TableState::with_page_size(page_size), FilterState::new())
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub fn table(&self) -> TableState {
        self.state.borrow().table.clone()
    }

    pub fn filters(&self) -> FilterState {
        self.state.borrow().filters.clone()
    }

    pub fn default_filters(&self) -> &FilterState {
        &self.default_filters
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Replace the table state wholesale.
    pub fn set_table_data(&self, next: TableState) {
        self.state.send_if_modified(|state| {
            if state.table == next {
                return false;
            }
            trace!(?next, "table state");
            state.table = next;
            true
        });
    }

    /// Merge `partial` into the committed filters. Entries that clean to
    /// nothing remove their key. Resets to the first page.
    pub fn patch_filters(&self, partial: FilterState) {
        self.commit_filters(|filters| filters.patch(partial));
    }

    /// Replace the committed filters with the cleaned `next`. Resets to
    /// the first page.
    pub fn replace_filters(&self, next: FilterState) {
        let next = next.cleaned();
        self.commit_filters(|filters| *filters = next);
    }

    /// Restore the list's default filters. Resets to the first page.
    pub fn clear_filters(&self) {
        let defaults = self.default_filters.clone();
        self.commit_filters(|filters| *filters = defaults);
    }

    fn commit_filters(&self, apply: impl FnOnce(&mut FilterState)) {
        self.state.send_if_modified(|state| {
            let mut filters = state.filters.clone();
            apply(&mut filters);
            if filters == state.filters && state.table.page_index == 0 {
                return false;
            }
            trace!(?filters, "filters committed");
            state.filters = filters;
            state.table.page_index = 0;
            true
        });
    }
}

impl Default for ListStore {
    fn default() -> Self {
        Self::new(TableState::default(), FilterState::new())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::list::filter::FilterValue;

    #[test]
    fn filter_commit_resets_page() {
        let store = ListStore::default();
        store.set_table_data(TableState {
            page_index: 4,
            ..TableState::default()
        });
        store.patch_filters(FilterState::new().with("Search", FilterValue::text("flood")));
        let state = store.snapshot();
        assert_eq!(state.table.page_index, 0);
        assert_eq!(
            state.filters.get("Search"),
            Some(&FilterValue::text("flood"))
        );
    }

    #[test]
    fn clear_restores_defaults() {
        let defaults = FilterState::new().with("Status", FilterValue::Choice("Published".into()));
        let store = ListStore::new(TableState::default(), defaults.clone());
        store.replace_filters(FilterState::new().with("Search", FilterValue::text("x")));
        assert!(store.filters().get("Status").is_none());
        store.clear_filters();
        assert_eq!(store.filters(), defaults);
    }

    #[tokio::test]
    async fn subscribers_see_changes_and_no_ops_are_silent() {
        let store = ListStore::default();
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.set_table_data(TableState::default());
        assert!(!rx.has_changed().unwrap());

        store.set_table_data(TableState::with_page_size(25));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().table.page_size, 25);
    }
}
