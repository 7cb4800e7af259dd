mod collection;
pub mod pattern;
pub mod players;
mod progress;
pub mod quality;
pub mod results;
pub mod rounds;
pub mod tournaments;
pub mod year;

pub use collection::{Collection, Identified, PlayerCollection, TournamentCollection};
pub use players::*;
pub use progress::{FetchProgress, RunSummary, Tally};
pub use tournaments::*;
