use std::path::Path;

use crate::commands::common::{open_service, report_sync};
use crate::error::CliError;

pub async fn run_import(input_path: &Path, db_path: &Path) -> Result<(), CliError> {
    let document = std::fs::read_to_string(input_path)?;
    let mut service = open_service(db_path)?;

    let imported = service.import_json(&document)?;
    println!("Imported {} patients", imported.value);
    report_sync(imported.sync).await;
    Ok(())
}
