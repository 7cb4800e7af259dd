pub mod connection;
pub mod journal;
pub mod ledger;
pub mod models;
pub mod players;
pub mod procedures;
pub mod setup;
pub mod tournaments;
pub mod unit_of_work;

pub use connection::{create_memory_pool, create_pool, get_connection, DbConn, DbPool};
pub use journal::Journal;
pub use models::*;
pub use setup::{ensure_schema, reset_database};
pub use unit_of_work::in_transaction;
