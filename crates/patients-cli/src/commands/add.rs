use std::path::Path;

use patients_core::NewPatient;

use crate::cli::AddArgs;
use crate::commands::common::{normalize_patient_code, open_service, report_sync};
use crate::error::CliError;

pub async fn run_add(args: AddArgs, db_path: &Path) -> Result<(), CliError> {
    let input = NewPatient {
        code: normalize_patient_code(&args.code)?,
        given_name: args.given_name,
        family_name: args.family_name,
        email: args.email,
        phone: args.phone,
        diagnosis: args.diagnosis,
        treatment: args.treatment,
        status: args.status.trim().into(),
    };

    let mut service = open_service(db_path)?;
    let created = service.create(input)?;
    println!("{}", created.value.code);
    report_sync(created.sync).await;
    Ok(())
}
