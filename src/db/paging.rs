//! Pagination primitives shared by the repositories.
//!
//! Sort keys are resolved per entity with a silent fallback to the
//! default column; an unknown `sortBy` never errors.

use sea_orm::Order;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

/// A page request as the repositories consume it. Pages are 0-based.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort_by: Option<String>,
    pub direction: SortDirection,
    pub search: Option<String>,
}

impl PageRequest {
    #[must_use]
    pub fn new(
        page: u64,
        size: u64,
        sort_by: Option<String>,
        direction: SortDirection,
        search: Option<String>,
    ) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort_by,
            direction,
            search,
        }
    }

    /// The search term, if it is non-blank.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE, None, SortDirection::default(), None)
    }
}

/// One page of results plus the derived pagination facts.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_number: u64,
    pub page_size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.page_number == 0
    }

    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.total_pages == 0 || self.page_number + 1 >= self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page_number: u64, total_pages: u64) -> Page<i32> {
        Page {
            content: Vec::new(),
            page_number,
            page_size: 2,
            total_elements: total_pages * 2,
            total_pages,
        }
    }

    #[test]
    fn first_and_last_flags() {
        assert!(page(0, 3).is_first());
        assert!(!page(0, 3).is_last());
        assert!(page(2, 3).is_last());
        assert!(!page(1, 3).is_first());
    }

    #[test]
    fn empty_result_is_both_first_and_last() {
        let p = page(0, 0);
        assert!(p.is_first());
        assert!(p.is_last());
    }

    #[test]
    fn size_is_clamped() {
        assert_eq!(
            PageRequest::new(0, 0, None, SortDirection::Asc, None).size,
            1
        );
        assert_eq!(
            PageRequest::new(0, 10_000, None, SortDirection::Asc, None).size,
            MAX_PAGE_SIZE
        );
    }

    #[test]
    fn blank_search_term_is_ignored() {
        let req = PageRequest::new(0, 10, None, SortDirection::Asc, Some("   ".into()));
        assert_eq!(req.search_term(), None);
    }
}
