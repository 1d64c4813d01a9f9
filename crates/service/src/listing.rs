//! Shared machinery for filtered, paginated list endpoints.
//!
//! Handlers deserialize their query bag into a `ListOptions` plus an
//! entity-specific filter struct; services compile the filter into one
//! `sea_orm::Condition` and reuse it for both the count and the fetch so the
//! reported total can never drift from the returned page.

use sea_orm::Order;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Hard cap on related records attached to a hydrated view.
pub const RELATED_TAKE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl From<SortOrder> for Order {
    fn from(value: SortOrder) -> Self {
        match value {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

/// Pagination and sorting request, already coerced from query strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ListOptions {
    /// Clamp to sane values: page is 1-based, limit defaults to 10 and is
    /// capped at 100. Returns `(page, limit, offset)`.
    pub fn normalize(&self) -> (u64, u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        (page, limit, (page - 1) * limit)
    }

    /// Resolve the sort column against an allow list; anything unrecognized
    /// falls back to newest-first by creation time.
    pub fn sort<'a>(&'a self, allowed: &[&'a str], created_at: &'a str) -> (&'a str, Order) {
        let column = self
            .sort_by
            .as_deref()
            .filter(|c| allowed.contains(c))
            .unwrap_or(created_at);
        let order = self.sort_order.map(Order::from).unwrap_or(Order::Desc);
        (column, order)
    }
}

/// One page of results plus the metadata for the envelope.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn meta(&self) -> common::envelope::Meta {
        common::envelope::Meta { page: self.page, limit: self.limit, total: self.total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults() {
        let (page, limit, offset) = ListOptions::default().normalize();
        assert_eq!((page, limit, offset), (1, DEFAULT_LIMIT, 0));
    }

    #[test]
    fn normalize_clamps_zero_and_upper_bound() {
        let opts = ListOptions { page: Some(0), limit: Some(1000), ..Default::default() };
        let (page, limit, offset) = opts.normalize();
        assert_eq!((page, limit, offset), (1, MAX_LIMIT, 0));
    }

    #[test]
    fn offset_is_one_based() {
        let opts = ListOptions { page: Some(3), limit: Some(5), ..Default::default() };
        let (_, _, offset) = opts.normalize();
        assert_eq!(offset, 10);
    }

    #[test]
    fn unknown_sort_column_falls_back_to_created_at() {
        let opts = ListOptions {
            sort_by: Some("password_hash".into()),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let (col, order) = opts.sort(&["name", "email"], "created_at");
        assert_eq!(col, "created_at");
        assert_eq!(order, Order::Asc);
    }

    #[test]
    fn allowed_sort_column_is_honored() {
        let opts = ListOptions { sort_by: Some("name".into()), ..Default::default() };
        let (col, order) = opts.sort(&["name", "email"], "created_at");
        assert_eq!(col, "name");
        assert_eq!(order, Order::Desc);
    }
}
