use std::path::Path;

use patients_core::{NewPatient, PatientRecord};

use crate::cli::UpdateArgs;
use crate::commands::common::{normalize_patient_code, open_service, report_sync};
use crate::error::CliError;

pub async fn run_update(args: UpdateArgs, db_path: &Path) -> Result<(), CliError> {
    let code = normalize_patient_code(&args.code)?;
    let mut service = open_service(db_path)?;
    let current = service.find(&code)?.clone();

    let updated = service.update(merge_update(current, args))?;
    println!("{}", updated.value.code);
    report_sync(updated.sync).await;
    Ok(())
}

/// Overlay the provided flags on the stored record.
///
/// An empty string clears an optional field.
pub fn merge_update(current: PatientRecord, args: UpdateArgs) -> NewPatient {
    NewPatient {
        code: current.code,
        given_name: args.given_name.unwrap_or(current.given_name),
        family_name: args.family_name.unwrap_or(current.family_name),
        email: args.email.or(current.email),
        phone: args.phone.or(current.phone),
        diagnosis: args.diagnosis.or(current.diagnosis),
        treatment: args.treatment.unwrap_or(current.treatment),
        status: args
            .status
            .map_or(current.status, |status| status.trim().into()),
    }
}
