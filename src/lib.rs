pub mod api;
pub mod assemblers;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod http;
pub mod pagination;
pub mod reconcile;
pub mod services;
pub mod staleness;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::database::DbPool;
use crate::services::replay::ReplayService;
use crate::services::scrape::{ScrapeOptions, ScrapeService};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_scrape(options: ScrapeOptions) -> Result<()> {
    let config = AppConfig::from_env()?;
    let pool = open_database(&config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = ScrapeService::new(config, pool)?;
        service.run(&options).await.map(|_| ())
    })
}

pub fn handle_replay() -> Result<()> {
    let config = AppConfig::from_env()?;
    let pool = open_database(&config)?;
    let service = ReplayService::new(&config, pool)?;
    service.run().map(|_| ())
}

pub fn handle_init_db() -> Result<()> {
    let config = AppConfig::from_env()?;
    let pool = open_database(&config)?;
    let conn = database::get_connection(&pool)?;
    database::ensure_schema(&conn)
}

pub fn handle_reset_db() -> Result<()> {
    let config = AppConfig::from_env()?;
    let pool = open_database(&config)?;
    let conn = database::get_connection(&pool)?;
    database::reset_database(&conn)
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

fn open_database(config: &AppConfig) -> Result<DbPool> {
    log::info!("Using database {}", config.database_path);
    database::create_pool(&config.database_path)
}
