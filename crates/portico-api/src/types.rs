//! Wire types shared by every list endpoint.
//!
//! Record bodies are left generic; `portico-core` decodes them into
//! per-entity schemas.

use serde::{Deserialize, Serialize};

/// Page envelope returned by all list endpoints: `{ items, totalItems }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
        }
    }
}

/// Body for `POST {path}/{id}/publish`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_at: Option<String>,
}

/// Body for `POST {path}/{id}/pin`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinBody {
    pub pinned_order: u32,
}
