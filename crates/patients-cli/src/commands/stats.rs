use std::path::Path;

use crate::commands::common::open_service;
use crate::error::CliError;

pub fn run_stats(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let stats = open_service(db_path)?.stats();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Total:     {}", stats.total);
        println!("Active:    {}", stats.active);
        println!("Completed: {}", stats.completed);
    }

    Ok(())
}
