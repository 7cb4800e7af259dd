pub mod countries;
mod dev_scope;
pub mod settings;

pub use dev_scope::{DevScope, dev_scope};
pub use settings::{AppConfig, RunMode, ScraperSettings};
