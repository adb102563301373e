use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use patients_core::db::Database;
use patients_core::sync::{SyncHandle, SyncOutcome};
use patients_core::{Error as CoreError, PatientRecord, PatientService};

use crate::error::CliError;

pub const DB_PATH_ENV: &str = "PATIENTS_DB_PATH";

pub type Service = PatientService<Database>;

pub fn open_service(db_path: &Path) -> Result<Service, CliError> {
    Ok(PatientService::open_path(db_path)?)
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| env::var_os(DB_PATH_ENV).map(PathBuf::from)) {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("patients").join("patients.db"))
        .ok_or_else(|| {
            CliError::Config(format!(
                "Failed to resolve a data directory; set {DB_PATH_ENV} or pass --db-path"
            ))
        })
}

pub fn normalize_patient_code(code: &str) -> Result<String, CliError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(CliError::EmptyCode);
    }
    Ok(code.to_string())
}

pub fn format_patient_lines(records: &[PatientRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            let code = &record.code;
            let name = record.full_name();
            let status = record.status.as_str();
            format!("{code:<12}  {name:<32}  {status:<10}  {}", record.treatment)
        })
        .collect()
}

pub fn format_patient_details(record: &PatientRecord) -> Vec<String> {
    let or_na = |value: Option<&str>| {
        value
            .filter(|text| !text.trim().is_empty())
            .unwrap_or("N/A")
            .to_string()
    };
    vec![
        format!("Code:       {}", record.code),
        format!("Name:       {}", record.full_name()),
        format!("Email:      {}", or_na(record.email.as_deref())),
        format!("Phone:      {}", or_na(record.phone.as_deref())),
        format!("Diagnosis:  {}", or_na(record.diagnosis.as_deref())),
        format!("Treatment:  {}", record.treatment),
        format!("Status:     {}", record.status),
        format!("Registered: {}", record.created_at),
    ]
}

/// Wait for a background sync and report how it went.
///
/// Local changes are already saved at this point, so remote problems are
/// printed as warnings and never turn into an error exit.
pub async fn report_sync(handle: SyncHandle) {
    match handle.await {
        Ok(Ok(SyncOutcome::Synced(token))) => {
            tracing::debug!("Remote mirror at version {token}");
            eprintln!("Synced");
        }
        Ok(Ok(SyncOutcome::Superseded)) => eprintln!("Synced"),
        Ok(Err(CoreError::MissingCredentials)) => {
            tracing::debug!("Remote sync skipped: no auth token configured");
        }
        Ok(Err(error)) => eprintln!("Warning: saved locally but remote sync failed: {error}"),
        Err(error) => eprintln!("Warning: sync task did not finish: {error}"),
    }
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` means no.
pub fn confirm(prompt: &str) -> Result<bool, CliError> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(CliError::ConfirmationUnavailable);
    }

    eprint!("{prompt} [y/N] ");
    io::stderr().flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(parse_confirmation(&answer))
}

pub fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
