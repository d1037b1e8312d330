//! Pagination utilities for LogicMonitor list endpoints.
//!
//! List endpoints page with `offset`/`size` and answer in one of two
//! envelopes: `{"items": [...], "total": n}` (v3) or
//! `{"data": {"items": [...], "total": n}, "status": ...}` (v1/v2).

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// A page of results from a list endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages, when the server reports one.
    pub total: Option<u64>,
    /// Offset this page was requested at.
    pub offset: u32,
    /// Requested page size.
    pub size: u32,
    /// Whether another request could return more items.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a new page from items and pagination info.
    ///
    /// A page has more after it when it is full and, if a total is known,
    /// the total lies beyond it.
    #[must_use]
    pub fn new(items: Vec<T>, offset: u32, size: u32, total: Option<u64>) -> Self {
        let end = u64::from(offset) + items.len() as u64;
        let full = !items.is_empty() && items.len() >= size as usize;
        let has_more = full && total.map_or(true, |t| end < t);
        Self {
            items,
            total,
            offset,
            size,
            has_more,
        }
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            size: self.size,
            has_more: self.has_more,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Options shared by every list request.
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Items per request.
    pub size: u32,
    /// Comma-separated field projection; some endpoints ignore it.
    pub fields: Option<String>,
    /// Server-side filter expression, e.g. `name~"CPU"`.
    pub filter: Option<String>,
    /// Pause after each non-empty page.
    pub delay: Duration,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_PAGE_SIZE,
            fields: None,
            filter: None,
            delay: Duration::ZERO,
        }
    }
}

impl ListOptions {
    /// Query parameters for the page at `offset`.
    pub fn page_query(&self, offset: u32) -> PageQuery<'_> {
        PageQuery {
            format: "json",
            size: self.size,
            offset,
            fields: self.fields.as_deref(),
            filter: self.filter.as_deref(),
        }
    }
}

/// Query string of one list request.
#[derive(Debug, Clone, Serialize)]
pub struct PageQuery<'a> {
    pub format: &'static str,
    pub size: u32,
    pub offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a str>,
}

/// Items and counters pulled out of a list response.
#[derive(Debug, Clone, Default)]
pub struct ListEnvelope {
    pub items: Vec<Value>,
    pub total: Option<u64>,
    pub search_id: Option<String>,
}

impl ListEnvelope {
    /// Extract items from either envelope shape.
    ///
    /// A missing or non-array `items` yields no items. Totals that are zero
    /// or negative are treated as unknown.
    pub fn from_value(mut payload: Value) -> Self {
        let body = if payload.get("data").map_or(false, Value::is_object) {
            payload["data"].take()
        } else {
            payload
        };

        let total = body
            .get("total")
            .and_then(Value::as_i64)
            .filter(|t| *t > 0)
            .map(|t| t as u64);
        let search_id = body
            .get("searchId")
            .and_then(Value::as_str)
            .map(str::to_string);

        let items = match body {
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        Self {
            items,
            total,
            search_id,
        }
    }

    /// Convert into a typed page. Entries that are not JSON objects are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns a parse error if an object does not match `T`.
    pub fn into_page<T: DeserializeOwned>(self, offset: u32, size: u32) -> Result<Page<T>> {
        let received = self.items.len();
        let mut items = Vec::with_capacity(received);
        for item in self.items {
            if item.is_object() {
                items.push(serde_json::from_value(item)?);
            }
        }
        if items.len() != received {
            tracing::debug!(
                dropped = received - items.len(),
                "Dropped non-object list entries"
            );
        }

        // Page bookkeeping counts what the server sent, not what was kept.
        let end = u64::from(offset) + received as u64;
        let has_more =
            received > 0 && received >= size as usize && self.total.map_or(true, |t| end < t);
        Ok(Page {
            items,
            total: self.total,
            offset,
            size,
            has_more,
        })
    }
}
