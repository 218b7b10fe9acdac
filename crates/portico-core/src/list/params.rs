// ── Request parameters ──
//
// Pure projection of (TableState, FilterState, filter field table) into the
// query shape list endpoints expect. Never mutated after derivation.

use std::fmt;

use url::form_urlencoded;

use super::filter::{FilterState, FilterValue};
use super::table::TableState;
use crate::form::format_datetime;
use crate::resource::{FilterField, FilterKind};

pub const PAGE_NUMBER: &str = "PageNumber";
pub const PAGE_SIZE: &str = "PageSize";
pub const SORT_BY: &str = "SortBy";
pub const SORT_ORDER: &str = "SortOrder";

/// Ordered query pairs. Repeated keys carry array filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RequestParams(Vec<(String, String)>);

impl RequestParams {
    /// Derive the query for one list state.
    ///
    /// Filter keys found in `fields` are renamed to their query parameter;
    /// unknown keys pass through verbatim. Values that clean to nothing are
    /// omitted.
    pub fn derive(table: &TableState, filters: &FilterState, fields: &[FilterField]) -> Self {
        let mut pairs = vec![
            (
                PAGE_NUMBER.to_owned(),
                table.page_index.saturating_add(1).to_string(),
            ),
            (PAGE_SIZE.to_owned(), table.page_size.max(1).to_string()),
        ];

        if let (Some(key), Some(order)) = (&table.sort.key, table.sort.order.as_param()) {
            pairs.push((SORT_BY.to_owned(), key.clone()));
            pairs.push((SORT_ORDER.to_owned(), order.to_owned()));
        }

        for (key, value) in filters.iter() {
            let Some(value) = value.clone().clean() else {
                continue;
            };
            let field = fields.iter().find(|f| f.key == key);
            push_filter(&mut pairs, key, field, value);
        }

        Self(pairs)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Copy with the page position replaced (1-based page number).
    pub fn with_page(&self, page_number: u32, page_size: u32) -> Self {
        let mut pairs: Vec<(String, String)> = self
            .0
            .iter()
            .filter(|(k, _)| k != PAGE_NUMBER && k != PAGE_SIZE)
            .cloned()
            .collect();
        pairs.insert(0, (PAGE_SIZE.to_owned(), page_size.to_string()));
        pairs.insert(0, (PAGE_NUMBER.to_owned(), page_number.to_string()));
        Self(pairs)
    }

    /// Query string with pairs sorted, so equal criteria always produce the
    /// same string regardless of insertion order.
    pub fn canonical_query(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.0.iter().collect();
        sorted.sort();
        let mut ser = form_urlencoded::Serializer::new(String::new());
        for (k, v) in sorted {
            ser.append_pair(k, v);
        }
        ser.finish()
    }

    /// Fetch key: endpoint path plus canonical query.
    pub fn cache_key(&self, path: &str) -> String {
        format!("{path}?{}", self.canonical_query())
    }
}

impl fmt::Display for RequestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_query())
    }
}

fn push_filter(
    pairs: &mut Vec<(String, String)>,
    key: &str,
    field: Option<&FilterField>,
    value: FilterValue,
) {
    let param = field.map_or(key, |f| f.param);
    match value {
        FilterValue::Text(s) | FilterValue::Choice(s) => pairs.push((param.to_owned(), s)),
        FilterValue::Flag(b) => pairs.push((param.to_owned(), b.to_string())),
        FilterValue::Date(d) => pairs.push((param.to_owned(), format_datetime(&d))),
        FilterValue::DateRange { from, to } => {
            let (from_key, to_key) = match field.map(|f| f.kind) {
                Some(FilterKind::DateRange { from, to }) => (from.to_owned(), to.to_owned()),
                _ => (format!("{key}From"), format!("{key}To")),
            };
            if let Some(from) = from {
                pairs.push((from_key, format_datetime(&from)));
            }
            if let Some(to) = to {
                pairs.push((to_key, format_datetime(&to)));
            }
        }
        FilterValue::Number(n) => pairs.push((param.to_owned(), n.to_string())),
        FilterValue::List(items) => {
            pairs.extend(items.into_iter().map(|item| (param.to_owned(), item)));
        }
        FilterValue::Reference(id) => pairs.push((param.to_owned(), id.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::list::table::{Sort, SortOrder};
    use crate::resource::ResourceKind;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn pairs(params: &RequestParams) -> Vec<(&str, &str)> {
        params
            .pairs()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn search_is_renamed_and_page_is_one_based() {
        let table = TableState {
            page_index: 0,
            page_size: 10,
            sort: Sort::default(),
        };
        let filters = FilterState::new().with("Search", FilterValue::text("flood"));
        let params = RequestParams::derive(
            &table,
            &filters,
            ResourceKind::Announcements.filter_fields(),
        );
        assert_eq!(
            pairs(&params),
            vec![("PageNumber", "1"), ("PageSize", "10"), ("SearchTerm", "flood")]
        );
    }

    #[test]
    fn blank_search_is_omitted() {
        for blank in ["", "   ", "\t"] {
            let filters = FilterState::new().with("Search", FilterValue::text(blank));
            let params = RequestParams::derive(
                &TableState::default(),
                &filters,
                ResourceKind::News.filter_fields(),
            );
            assert!(params.get("SearchTerm").is_none(), "{blank:?}");
        }
    }

    #[test]
    fn sort_only_when_ordered() {
        let mut table = TableState::default();
        table.sort = Sort::new("title", SortOrder::None);
        let params = RequestParams::derive(&table, &FilterState::new(), &[]);
        assert!(params.get(SORT_BY).is_none());

        table.sort.order = SortOrder::Descend;
        let params = RequestParams::derive(&table, &FilterState::new(), &[]);
        assert_eq!(params.get(SORT_BY), Some("title"));
        assert_eq!(params.get(SORT_ORDER), Some("desc"));
    }

    #[test]
    fn dates_lists_and_unknown_keys() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let filters = FilterState::new()
            .with("PublishDate", FilterValue::DateRange { from: Some(from), to: None })
            .with("Tags", FilterValue::List(vec!["civic".into(), "parks".into()]))
            .with("Custom", FilterValue::Number(5));
        let params = RequestParams::derive(
            &TableState::default(),
            &filters,
            ResourceKind::News.filter_fields(),
        );
        assert_eq!(params.get("PublishFrom"), Some("2026-01-01T00:00:00.000Z"));
        assert!(params.get("PublishTo").is_none());
        assert_eq!(params.get_all("Tags").collect::<Vec<_>>(), vec!["civic", "parks"]);
        assert_eq!(params.get("Custom"), Some("5"));
    }

    #[test]
    fn cache_key_ignores_insertion_order() {
        let fields = ResourceKind::Announcements.filter_fields();
        let a = FilterState::new()
            .with("Status", FilterValue::Choice("Draft".into()))
            .with("Search", FilterValue::text("x"));
        let b = FilterState::new()
            .with("Search", FilterValue::text("x"))
            .with("Status", FilterValue::Choice("Draft".into()));
        let table = TableState::default();
        assert_eq!(
            RequestParams::derive(&table, &a, fields).cache_key("announcements"),
            RequestParams::derive(&table, &b, fields).cache_key("announcements"),
        );
    }

    #[test]
    fn with_page_replaces_position() {
        let params = RequestParams::derive(
            &TableState::default(),
            &FilterState::new().with("Search", FilterValue::text("x")),
            ResourceKind::Roles.filter_fields(),
        )
        .with_page(3, 50);
        assert_eq!(
            pairs(&params),
            vec![("PageNumber", "3"), ("PageSize", "50"), ("SearchTerm", "x")]
        );
    }
}
