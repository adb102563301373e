use std::path::Path;

use crate::cli::SearchFieldArg;
use crate::commands::common::{format_patient_lines, open_service};
use crate::error::CliError;

pub fn run_search(
    query: &str,
    field: SearchFieldArg,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let service = open_service(db_path)?;
    let found = service
        .search(query, field.into())
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        for line in format_patient_lines(&found) {
            println!("{line}");
        }
    }

    Ok(())
}
