use super::config::PaginationConfig;

/// Walks listing sections from 0 until the page limit or a run of empty pages
pub struct PageIterator {
    current_page: usize,
    empty_in_a_row: usize,
    config: PaginationConfig,
}

impl PageIterator {
    pub fn new(config: PaginationConfig) -> Self {
        Self {
            current_page: 0,
            empty_in_a_row: 0,
            config,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn has_reached_max(&self) -> bool {
        self.config.max_pages.is_some_and(|max| self.current_page >= max)
    }

    pub fn has_run_dry(&self) -> bool {
        self.empty_in_a_row >= self.config.empty_page_limit
    }

    pub fn is_done(&self) -> bool {
        self.has_reached_max() || self.has_run_dry()
    }

    /// Record whether the current page had records and move on
    pub fn advance(&mut self, page_was_empty: bool) {
        if page_was_empty {
            self.empty_in_a_row += 1;
        } else {
            self.empty_in_a_row = 0;
        }
        self.current_page += 1;
    }

    pub fn is_first_page(&self) -> bool {
        self.current_page == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_after_two_empty_pages_in_a_row() {
        let mut pages = PageIterator::new(PaginationConfig::new());
        pages.advance(true);
        pages.advance(false);
        pages.advance(true);
        assert!(!pages.is_done());
        pages.advance(true);
        assert!(pages.is_done());
        assert_eq!(pages.current_page(), 4);
    }

    #[test]
    fn test_stops_at_max_pages() {
        let mut pages = PageIterator::new(PaginationConfig::new().with_max_pages(1));
        assert!(pages.is_first_page());
        assert!(!pages.is_done());
        pages.advance(false);
        assert!(pages.has_reached_max());
    }
}
