/// Pages in a row that may come back empty before a listing counts as exhausted
pub const DEFAULT_EMPTY_PAGE_LIMIT: usize = 2;

/// Configuration for paginated listings
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub max_pages: Option<usize>,
    pub empty_page_limit: usize,
}

impl PaginationConfig {
    pub fn new() -> Self {
        Self {
            max_pages: None,
            empty_page_limit: DEFAULT_EMPTY_PAGE_LIMIT,
        }
    }

    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = Some(max);
        self
    }

    pub fn with_optional_max_pages(self, max: Option<usize>) -> Self {
        match max {
            Some(max) => self.with_max_pages(max),
            None => self,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self::new()
    }
}
