use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "World Padel Tour scraper")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Fetch what is due from the site and commit it to the database
    Scrape {
        /// Every season and the whole ranking listing
        #[arg(long)]
        full: bool,
        /// Only this tournament (repeatable)
        #[arg(long = "tournament", value_name = "ID")]
        tournaments: Vec<String>,
        /// Also this player (repeatable)
        #[arg(long = "player", value_name = "ID")]
        players: Vec<String>,
        #[arg(long)]
        skip_players: bool,
        #[arg(long)]
        skip_tournaments: bool,
    },
    /// Commit the development snapshots without touching the network
    Replay,
    /// Create the schema if missing
    InitDb,
    /// Drop every table and recreate the schema
    ResetDb,
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
