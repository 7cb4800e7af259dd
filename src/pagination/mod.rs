mod config;
mod iterator;

pub use config::{DEFAULT_EMPTY_PAGE_LIMIT, PaginationConfig};
pub use iterator::PageIterator;
