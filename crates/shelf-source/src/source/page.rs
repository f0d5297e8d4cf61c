//! Pagination types for bulk reads.

use serde::{Deserialize, Serialize};

/// A `take`/`skip` window over a stable ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of items to return.
    pub take: usize,
    /// Number of items to skip.
    pub skip: usize,
}

impl PageRequest {
    /// Creates a page request.
    ///
    /// # Example
    ///
    /// ```
    /// use shelf_source::PageRequest;
    ///
    /// let page = PageRequest::new(1000, 0);
    /// assert_eq!(page.next().skip, 1000);
    /// ```
    pub fn new(take: usize, skip: usize) -> Self {
        Self { take, skip }
    }

    /// First page of the given size.
    pub fn first(take: usize) -> Self {
        Self::new(take, 0)
    }

    /// The page that follows this one.
    pub fn next(&self) -> Self {
        Self::new(self.take, self.skip + self.take)
    }
}

/// One page of results plus the total number of matching items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<E> {
    pub items: Vec<E>,
    pub total_count: usize,
}

impl<E> Page<E> {
    /// Creates a page.
    pub fn new(items: Vec<E>, total_count: usize) -> Self {
        Self { items, total_count }
    }

    /// An empty page.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Returns true if this page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if there may be more items after this page.
    ///
    /// A scan is over when the page is empty, shorter than requested, or
    /// reaches `total_count`.
    pub fn has_more(&self, request: &PageRequest) -> bool {
        !self.items.is_empty()
            && self.items.len() >= request.take
            && request.skip + self.items.len() < self.total_count
    }
}
