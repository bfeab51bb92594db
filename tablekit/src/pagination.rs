//! Client-side pagination.

use std::ops::Range;

/// Page size used when a table does not pick one.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Current page and fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_index: usize,
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// Starts on the first page. A zero size is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages for `total` rows. Never less than one.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Row index range shown on the current page.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.page_index * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self, total: usize) -> bool {
        self.page_index + 1 < self.page_count(total)
    }

    pub fn first(&mut self) {
        self.page_index = 0;
    }

    pub fn previous(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }

    pub fn next(&mut self, total: usize) {
        if self.can_next(total) {
            self.page_index += 1;
        }
    }

    pub fn last(&mut self, total: usize) {
        self.page_index = self.page_count(total) - 1;
    }

    /// Jumps to a page, clamped to the last one.
    pub fn go_to(&mut self, page_index: usize, total: usize) {
        self.page_index = page_index.min(self.page_count(total) - 1);
    }

    /// Pulls the page index back in range after rows were removed.
    pub fn clamp(&mut self, total: usize) {
        let last = self.page_count(total) - 1;
        if self.page_index > last {
            self.page_index = last;
        }
    }

    /// `Page X of Y (Total N records)`.
    pub fn label(&self, total: usize) -> String {
        format!(
            "Page {} of {} (Total {} records)",
            self.page_index + 1,
            self.page_count(total),
            total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_rounds_up() {
        let pages = Pagination::new(25);
        assert_eq!(pages.page_count(120), 5);
        assert_eq!(pages.page_count(125), 5);
        assert_eq!(pages.page_count(126), 6);
        assert_eq!(pages.page_count(0), 1);
    }

    #[test]
    fn test_last_page_range() {
        let mut pages = Pagination::new(25);
        pages.last(120);
        assert_eq!(pages.page_index(), 4);
        assert_eq!(pages.range(120), 100..120);
        assert!(!pages.can_next(120));
        assert_eq!(pages.label(120), "Page 5 of 5 (Total 120 records)");
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut pages = Pagination::new(10);
        pages.last(95);
        assert_eq!(pages.page_index(), 9);
        pages.clamp(30);
        assert_eq!(pages.page_index(), 2);
    }

    #[test]
    fn test_previous_stops_at_first() {
        let mut pages = Pagination::new(10);
        pages.previous();
        assert_eq!(pages.page_index(), 0);
        pages.next(35);
        pages.next(35);
        assert_eq!(pages.page_index(), 2);
        pages.first();
        assert_eq!(pages.page_index(), 0);
    }
}
