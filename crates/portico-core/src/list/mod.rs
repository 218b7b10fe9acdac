// ── List state ──
//
// Everything between the user and the fetch key: table state, filters,
// their projection into request parameters, and the interaction layers
// (list view, filter panel) that write back into the store.

pub mod filter;
pub mod panel;
pub mod params;
pub mod store;
pub mod table;
pub mod view;

pub use filter::{FilterState, FilterValue, parse_filter};
pub use panel::FilterPanel;
pub use params::RequestParams;
pub use store::{ListState, ListStore};
pub use table::{DEFAULT_PAGE_SIZE, Sort, SortOrder, TableState};
pub use view::{ListView, PageInfo, page_info, row_actions};
