mod fetch_cache;
mod snapshot;

pub use fetch_cache::FetchCache;
pub use snapshot::SnapshotStore;
