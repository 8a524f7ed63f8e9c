//! Abstractions for page-number pagination.

use std::num::NonZeroU32;

use derive_more::Display;

/// Number of a page, starting from `1`.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PageNumber(NonZeroU32);

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Creates a new [`PageNumber`] if the provided `num` is positive.
    #[must_use]
    pub const fn new(num: u32) -> Option<Self> {
        match NonZeroU32::new(num) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Returns the [`u32`] representation of this [`PageNumber`].
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Resolved position of a page within a filtered collection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pagination {
    /// Page actually served, never exceeding [`Pagination::total_pages`].
    pub page: PageNumber,

    /// Maximum number of items on a page.
    pub page_size: NonZeroU32,

    /// Total number of items matching the filter, regardless of paging.
    pub total_count: u64,

    /// Total number of pages, at least `1` even for an empty collection.
    pub total_pages: u32,
}

impl Pagination {
    /// Resolves the [`Pagination`] for the `requested` page of a collection
    /// containing `total_count` items.
    ///
    /// Requesting a page beyond the last one resolves to the last page.
    #[must_use]
    pub fn clamped(
        requested: PageNumber,
        page_size: NonZeroU32,
        total_count: u64,
    ) -> Self {
        let total_pages = total_count
            .div_ceil(u64::from(page_size.get()))
            .max(1);
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
        let page = PageNumber::new(requested.get().min(total_pages))
            .unwrap_or(PageNumber::FIRST);

        Self {
            page,
            page_size,
            total_count,
            total_pages,
        }
    }

    /// Returns the number of items preceding the served page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.get() - 1) * u64::from(self.page_size.get())
    }

    /// Returns the maximum number of items on the served page.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.page_size.get()
    }
}

/// Single page of items along with its [`Pagination`].
#[derive(Clone, Debug)]
pub struct Page<T> {
    /// Items of this [`Page`].
    pub items: Vec<T>,

    /// [`Pagination`] this [`Page`] was served with.
    pub pagination: Pagination,
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU32;

    use super::{PageNumber, Pagination};

    fn page(n: u32) -> PageNumber {
        PageNumber::new(n).unwrap()
    }

    fn size(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn clamps_to_last_page() {
        let p = Pagination::clamped(page(7), size(9), 20);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.page, page(3));
        assert_eq!(p.offset(), 18);

        let p = Pagination::clamped(page(2), size(9), 20);
        assert_eq!(p.page, page(2));
        assert_eq!(p.offset(), 9);
    }

    #[test]
    fn divisible_count_has_no_trailing_page() {
        let p = Pagination::clamped(page(5), size(9), 18);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.page, page(2));
    }

    #[test]
    fn empty_collection_has_single_page() {
        let p = Pagination::clamped(page(4), size(9), 0);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.page, PageNumber::FIRST);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn rejects_zero_page() {
        assert_eq!(PageNumber::new(0), None);
        assert_eq!(PageNumber::default(), page(1));
    }
}
