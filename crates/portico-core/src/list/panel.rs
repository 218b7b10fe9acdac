// ── Filter panel ──
//
// An uncommitted draft of the filter state. Edits never touch the store
// until `submit`; `dismiss` throws the draft away.

use super::filter::{FilterState, FilterValue, parse_filter};
use super::store::ListStore;
use crate::resource::{FilterField, ResourceKind};

#[derive(Debug, Clone)]
pub struct FilterPanel {
    kind: ResourceKind,
    draft: Option<FilterState>,
}

impl FilterPanel {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind, draft: None }
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn fields(&self) -> &'static [FilterField] {
        self.kind.filter_fields()
    }

    /// Copy the committed filters into a fresh draft.
    pub fn open(&mut self, store: &ListStore) {
        self.draft = Some(store.filters());
    }

    pub fn draft(&self) -> Option<&FilterState> {
        self.draft.as_ref()
    }

    /// Draft value of `key` as editable text.
    pub fn value_text(&self, key: &str) -> String {
        self.draft
            .as_ref()
            .and_then(|d| d.get(key))
            .map(FilterValue::display)
            .unwrap_or_default()
    }

    /// Set a typed draft value. No-op while closed.
    pub fn set(&mut self, key: &str, value: FilterValue) {
        if let Some(draft) = self.draft.as_mut() {
            draft.insert(key, value);
        }
    }

    /// Parse `raw` according to the field's kind and store it in the draft.
    /// Blank text clears the field.
    pub fn set_raw(&mut self, key: &str, raw: &str) -> Result<(), String> {
        let field = self
            .kind
            .filter_field(key)
            .ok_or_else(|| format!("unknown filter `{key}`"))?;
        let parsed = parse_filter(field, raw)?;
        if let Some(draft) = self.draft.as_mut() {
            match parsed {
                Some(value) => draft.insert(field.key, value),
                None => {
                    draft.remove(field.key);
                }
            }
        }
        Ok(())
    }

    /// Clean the draft and commit it wholesale, then close.
    pub fn submit(&mut self, store: &ListStore) {
        if let Some(draft) = self.draft.take() {
            store.replace_filters(draft.cleaned());
        }
    }

    /// Restore the store's default filters and close.
    pub fn clear(&mut self, store: &ListStore) {
        store.clear_filters();
        self.draft = None;
    }

    /// Close without committing.
    pub fn dismiss(&mut self) {
        self.draft = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::list::table::TableState;

    #[test]
    fn dismiss_leaves_store_untouched() {
        let store = ListStore::default();
        let mut panel = FilterPanel::new(ResourceKind::News);
        panel.open(&store);
        panel.set_raw("Search", "budget").unwrap();
        panel.dismiss();
        assert!(store.filters().is_empty());
        assert!(!panel.is_open());
    }

    #[test]
    fn submit_cleans_and_replaces() {
        let store = ListStore::default();
        store.patch_filters(FilterState::new().with("Author", FilterValue::text("Ng")));
        store.set_table_data(TableState {
            page_index: 2,
            ..TableState::default()
        });

        let mut panel = FilterPanel::new(ResourceKind::News);
        panel.open(&store);
        assert_eq!(panel.value_text("Author"), "Ng");
        panel.set_raw("author", "").unwrap();
        panel.set("Search", FilterValue::text("  parks  "));
        panel.set_raw("tags", "civic, , parks").unwrap();
        panel.submit(&store);

        let state = store.snapshot();
        assert_eq!(state.table.page_index, 0);
        assert!(state.filters.get("Author").is_none());
        assert_eq!(state.filters.get("Search"), Some(&FilterValue::text("parks")));
        assert_eq!(
            state.filters.get("Tags"),
            Some(&FilterValue::List(vec!["civic".into(), "parks".into()]))
        );
    }

    #[test]
    fn bad_input_is_reported_and_not_stored() {
        let store = ListStore::default();
        let mut panel = FilterPanel::new(ResourceKind::Violations);
        panel.open(&store);
        assert!(panel.set_raw("Severity", "extreme").is_err());
        assert!(panel.set_raw("Nope", "x").is_err());
        assert!(panel.draft().unwrap().is_empty());
    }
}
