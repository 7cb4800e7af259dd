use anyhow::Result;

use wpt_scraper::cli::Command;
use wpt_scraper::services::scrape::ScrapeOptions;
use wpt_scraper::{
    handle_completions, handle_init_db, handle_replay, handle_reset_db, handle_scrape, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(command)
}

fn execute_command(command: Command) -> Result<()> {
    match command {
        Command::Scrape {
            full,
            tournaments,
            players,
            skip_players,
            skip_tournaments,
        } => handle_scrape(ScrapeOptions {
            full,
            tournament_ids: tournaments,
            player_ids: players,
            skip_players,
            skip_tournaments,
        }),
        Command::Replay => handle_replay(),
        Command::InitDb => handle_init_db(),
        Command::ResetDb => handle_reset_db(),
        Command::Completions { shell } => handle_completions(shell),
    }
}
