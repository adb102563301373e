//! Patients CLI - manage patient records from the terminal
//!
//! Every change is saved locally first, then mirrored to the configured
//! remote repository.

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::resolve_db_path;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::export::run_export;
use crate::commands::import::run_import;
use crate::commands::list::{run_list, run_show};
use crate::commands::search::run_search;
use crate::commands::stats::run_stats;
use crate::commands::sync::{run_pull, run_sync};
use crate::commands::update::run_update;
use crate::error::CliError;

const DEFAULT_LOG_DIRECTIVES: &str = "patients_core=info,patients_cli=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if let Commands::Completions { shell, output } = &command {
        return run_completions(*shell, output.as_deref());
    }

    let db_path = resolve_db_path(cli.db_path)?;

    match command {
        Commands::Add(args) => run_add(args, &db_path).await,
        Commands::Update(args) => run_update(args, &db_path).await,
        Commands::Delete { code, yes } => run_delete(&code, yes, &db_path).await,
        Commands::List { json } => run_list(json, &db_path),
        Commands::Show { code, json } => run_show(&code, json, &db_path),
        Commands::Search { query, field, json } => run_search(&query, field, json, &db_path),
        Commands::Stats { json } => run_stats(json, &db_path),
        Commands::Export { output, stdout } => run_export(output.as_deref(), stdout, &db_path),
        Commands::Import { path } => run_import(&path, &db_path).await,
        Commands::Sync => run_sync(&db_path).await,
        Commands::Pull => run_pull(&db_path).await,
        Commands::Config { command } => run_config(command, &db_path).await,
        Commands::Completions { .. } => Ok(()),
    }
}
