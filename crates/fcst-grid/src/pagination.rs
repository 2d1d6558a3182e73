//! Pagination view
//!
//! [`page`] slices a visible row sequence; [`Pagination`] holds the current
//! page and a page size restricted to an allowed set.

use serde::{Deserialize, Serialize};

/// Page sizes offered by default
pub const DEFAULT_PAGE_SIZES: &[usize] = &[10, 20, 50, 100];

/// Errors raised by pagination state changes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// Requested size is not in the allowed set
    #[error("page size {size} is not one of {allowed:?}")]
    UnsupportedPageSize {
        /// Requested size
        size: usize,
        /// Allowed sizes
        allowed: Vec<usize>,
    },

    /// No page sizes configured
    #[error("at least one page size must be allowed")]
    NoPageSizes,
}

/// Position and extent of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Rows across all pages
    pub total: usize,
    /// 1-indexed page number as requested
    pub page: usize,
    /// Rows per page
    pub size: usize,
    /// Number of non-empty pages
    pub pages: usize,
}

/// One page of rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSlice<T> {
    /// Rows on this page
    pub items: Vec<T>,
    /// Rows across all pages
    pub total: usize,
    /// 1-indexed page number as requested
    pub page: usize,
    /// Rows per page
    pub size: usize,
    /// Number of non-empty pages
    pub pages: usize,
}

impl<T> PageSlice<T> {
    /// Page metadata without the rows
    #[inline]
    #[must_use]
    pub fn info(&self) -> PageInfo {
        PageInfo {
            total: self.total,
            page: self.page,
            size: self.size,
            pages: self.pages,
        }
    }

    /// Check for an empty page
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slice page `page` (1-indexed) of `records`.
///
/// Page 0, pages past the end, and a zero size all yield an empty page
/// carrying the correct total.
#[must_use]
pub fn page<T: Clone>(records: &[T], page: usize, size: usize) -> PageSlice<T> {
    let total = records.len();
    let pages = if size == 0 { 0 } else { total.div_ceil(size) };
    let items = if page == 0 || page > pages {
        Vec::new()
    } else {
        let start = (page - 1) * size;
        let end = (start + size).min(total);
        records[start..end].to_vec()
    };
    PageSlice {
        items,
        total,
        page,
        size,
        pages,
    }
}

/// Current page and page size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    allowed: Vec<usize>,
    size: usize,
    page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            allowed: DEFAULT_PAGE_SIZES.to_vec(),
            size: DEFAULT_PAGE_SIZES[0],
            page: 1,
        }
    }
}

impl Pagination {
    /// Create pagination with a custom size set
    ///
    /// # Errors
    /// - `PaginationError::NoPageSizes` if `allowed` is empty
    /// - `PaginationError::UnsupportedPageSize` if `size` is not in `allowed`
    pub fn new(allowed: Vec<usize>, size: usize) -> Result<Self, PaginationError> {
        if allowed.is_empty() {
            return Err(PaginationError::NoPageSizes);
        }
        if !allowed.contains(&size) {
            return Err(PaginationError::UnsupportedPageSize { size, allowed });
        }
        Ok(Self {
            allowed,
            size,
            page: 1,
        })
    }

    /// Current page (1-indexed)
    #[inline]
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Current page size
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Allowed page sizes
    #[inline]
    #[must_use]
    pub fn allowed_sizes(&self) -> &[usize] {
        &self.allowed
    }

    /// Jump to a page. Out-of-range pages are allowed and render empty.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Change the page size and return to page 1
    ///
    /// # Errors
    /// - `PaginationError::UnsupportedPageSize` if `size` is not allowed
    pub fn set_page_size(&mut self, size: usize) -> Result<(), PaginationError> {
        if !self.allowed.contains(&size) {
            return Err(PaginationError::UnsupportedPageSize {
                size,
                allowed: self.allowed.clone(),
            });
        }
        self.size = size;
        self.page = 1;
        Ok(())
    }

    /// Slice the current page
    #[must_use]
    pub fn slice<T: Clone>(&self, records: &[T]) -> PageSlice<T> {
        page(records, self.page, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn pages_of_two_over_five_rows() {
        let rows = [0, 1, 2, 3, 4];
        let first = page(&rows, 1, 2);
        assert_eq!(first.items, vec![0, 1]);
        assert_eq!(first.pages, 3);
        assert_eq!(page(&rows, 3, 2).items, vec![4]);

        let past = page(&rows, 4, 2);
        assert!(past.is_empty());
        assert_eq!(past.total, 5);
    }

    #[test]
    fn page_zero_and_size_zero_are_empty() {
        let rows = [1, 2, 3];
        assert!(page(&rows, 0, 2).is_empty());
        let zero = page(&rows, 1, 0);
        assert!(zero.is_empty());
        assert_eq!(zero.info(), PageInfo { total: 3, page: 1, size: 0, pages: 0 });
    }

    #[test]
    fn size_change_resets_page() {
        let mut pagination = Pagination::default();
        pagination.set_page(4);
        pagination.set_page_size(50).unwrap();
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.size(), 50);
    }

    #[test]
    fn unsupported_size_rejected_and_state_kept() {
        let mut pagination = Pagination::default();
        pagination.set_page(2);
        let err = pagination.set_page_size(7).unwrap_err();
        assert!(matches!(err, PaginationError::UnsupportedPageSize { size: 7, .. }));
        assert_eq!(pagination.page(), 2);
        assert_eq!(pagination.size(), 10);
    }

    #[test]
    fn custom_sizes_validated() {
        assert_eq!(Pagination::new(Vec::new(), 10), Err(PaginationError::NoPageSizes));
        assert!(Pagination::new(vec![50, 100, 200], 10).is_err());
        assert_eq!(Pagination::new(vec![50, 100, 200], 50).unwrap().size(), 50);
    }

    proptest! {
        #[test]
        fn prop_past_last_page_is_empty(len in 0usize..60, size in 1usize..15, extra in 1usize..5) {
            let rows: Vec<usize> = (0..len).collect();
            let last = len.div_ceil(size);
            let slice = page(&rows, last + extra, size);
            prop_assert!(slice.items.is_empty());
            prop_assert_eq!(slice.total, len);
        }

        #[test]
        fn prop_pages_cover_every_row_once(len in 0usize..60, size in 1usize..15) {
            let rows: Vec<usize> = (0..len).collect();
            let pages = page(&rows, 1, size).pages;
            let joined: Vec<usize> = (1..=pages).flat_map(|p| page(&rows, p, size).items).collect();
            prop_assert_eq!(joined, rows);
        }
    }
}
