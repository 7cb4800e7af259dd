mod client;
mod document;
pub mod envelope;
mod request;
mod retry;
pub mod testing;

pub use client::{HttpTransport, Transport};
pub use document::Document;
pub use request::{FetchRequest, Method};
pub use retry::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS, Fetcher, RetryPolicy};
