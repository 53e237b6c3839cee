//! Paginated result container.

use serde::{Deserialize, Serialize};

/// One bounded, ordered slice of a collection plus the pagination
/// parameters used to produce it.
///
/// # Invariants
/// - `items.len() <= per_page`.
/// - `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32) -> Self {
        debug_assert!(items.len() <= per_page as usize);
        Self {
            items,
            page,
            per_page,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        page_offset(self.page, self.per_page)
    }
}

/// Computes the row offset for a 1-based page. `page == 0` is treated as 1.
pub fn page_offset(page: u32, per_page: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(per_page)
}
