mod engine;
mod lookups;

pub use engine::Reconciler;
pub use lookups::LookupRows;
