mod endpoints;

pub use endpoints::{DEFAULT_BASE_URL, FIRST_YEAR, WptEndpoints};
