use std::path::Path;

use crate::commands::common::{
    format_patient_details, format_patient_lines, normalize_patient_code, open_service,
};
use crate::error::CliError;

pub fn run_list(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path)?;
    let records = service.list();

    if as_json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else if records.is_empty() {
        eprintln!("No patients registered");
    } else {
        for line in format_patient_lines(records) {
            println!("{line}");
        }
    }

    Ok(())
}

pub fn run_show(code: &str, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let code = normalize_patient_code(code)?;
    let service = open_service(db_path)?;
    let record = service.find(&code)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        for line in format_patient_details(record) {
            println!("{line}");
        }
    }

    Ok(())
}
