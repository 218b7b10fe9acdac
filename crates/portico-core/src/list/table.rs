// ── Table state ──
//
// Pagination and sort for one list instance. Page index is 0-based here;
// the wire and the UI both speak 1-based page numbers.

use strum::Display;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum SortOrder {
    #[strum(serialize = "asc")]
    Ascend,
    #[strum(serialize = "desc")]
    Descend,
    #[default]
    #[strum(serialize = "none")]
    None,
}

impl SortOrder {
    /// Wire value for `SortOrder=`, absent when unsorted.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Self::Ascend => Some("asc"),
            Self::Descend => Some("desc"),
            Self::None => None,
        }
    }

    /// ascend → descend → none → ascend.
    pub fn cycle(self) -> Self {
        match self {
            Self::Ascend => Self::Descend,
            Self::Descend => Self::None,
            Self::None => Self::Ascend,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Sort {
    pub key: Option<String>,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            key: Some(key.into()),
            order,
        }
    }

    pub fn is_active(&self) -> bool {
        self.key.is_some() && self.order != SortOrder::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableState {
    pub page_index: u32,
    pub page_size: u32,
    pub sort: Sort,
}

impl TableState {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort: Sort::default(),
        }
    }
}
