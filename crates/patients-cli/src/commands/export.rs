use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use patients_core::export::suggested_export_file_name;

use crate::commands::common::open_service;
use crate::error::CliError;

pub fn run_export(
    output_path: Option<&Path>,
    to_stdout: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let service = open_service(db_path)?;
    let document = service.export_json()?;

    if to_stdout {
        let mut stdout = io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        writeln!(stdout)?;
        return Ok(());
    }

    let path = output_path.map_or_else(default_export_path, Path::to_path_buf);
    std::fs::write(&path, document)?;
    eprintln!("Exported {} patients", service.list().len());
    println!("{}", path.display());
    Ok(())
}

/// Export file name stamped with the current UTC date.
pub fn default_export_path() -> PathBuf {
    export_path_for(Utc::now().date_naive())
}

pub fn export_path_for(date: NaiveDate) -> PathBuf {
    PathBuf::from(suggested_export_file_name(date))
}
