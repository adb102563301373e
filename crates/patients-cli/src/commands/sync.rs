use std::path::Path;

use patients_core::sync::SyncOutcome;
use patients_core::Error as CoreError;

use crate::commands::common::open_service;
use crate::error::CliError;

pub async fn run_sync(db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path)?;
    let outcome = service.resync().await?;

    match outcome {
        Ok(SyncOutcome::Synced(token)) => {
            println!("Synced {} patients (version {token})", service.list().len());
            Ok(())
        }
        Ok(SyncOutcome::Superseded) => {
            println!("Synced {} patients", service.list().len());
            Ok(())
        }
        Err(CoreError::MissingCredentials) => Err(CliError::SyncNotConfigured),
        Err(error) => Err(error.into()),
    }
}

pub async fn run_pull(db_path: &Path) -> Result<(), CliError> {
    let mut service = open_service(db_path)?;
    match service.pull().await {
        Ok(Some(count)) => println!("Pulled {count} patients"),
        Ok(None) => eprintln!("No remote snapshot yet; local data left unchanged"),
        Err(CoreError::MissingCredentials) => return Err(CliError::SyncNotConfigured),
        Err(error) => return Err(error.into()),
    }
    Ok(())
}
