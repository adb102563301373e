use std::path::Path;

use crate::commands::common::{confirm, normalize_patient_code, open_service, report_sync};
use crate::error::CliError;

pub async fn run_delete(code: &str, skip_confirmation: bool, db_path: &Path) -> Result<(), CliError> {
    let code = normalize_patient_code(code)?;
    let mut service = open_service(db_path)?;
    let name = service.find(&code)?.full_name();

    if !skip_confirmation && !confirm(&format!("Delete patient {code} ({name})?"))? {
        return Err(CliError::DeleteCancelled);
    }

    let removed = service.delete(&code)?;
    println!("{}", removed.value.code);
    report_sync(removed.sync).await;
    Ok(())
}
