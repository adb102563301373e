use std::path::Path;

use patients_core::config::{RemoteCredentials, RemoteCredentialsPatch};
use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::commands::common::open_service;
use crate::error::CliError;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfigView {
    pub host: String,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: String,
    pub path: String,
    pub token_configured: bool,
}

impl From<&RemoteCredentials> for RemoteConfigView {
    fn from(credentials: &RemoteCredentials) -> Self {
        Self {
            host: credentials.host.clone(),
            owner: credentials.owner.clone(),
            repo: credentials.repo.clone(),
            branch: credentials.branch.clone(),
            path: credentials.file_path.clone(),
            token_configured: credentials.has_auth_token(),
        }
    }
}

pub async fn run_config(command: ConfigCommands, db_path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Set {
            token,
            owner,
            repo,
            branch,
            path,
            host,
        } => {
            let patch = RemoteCredentialsPatch {
                host,
                auth_token: token,
                owner,
                repo,
                branch,
                file_path: path,
            };
            run_config_set(patch, db_path).await
        }
        ConfigCommands::Show { json } => run_config_show(json, db_path),
    }
}

async fn run_config_set(patch: RemoteCredentialsPatch, db_path: &Path) -> Result<(), CliError> {
    if patch.is_empty() {
        return Err(CliError::NothingToConfigure);
    }

    let service = open_service(db_path)?;
    let updated = service.stored_remote_credentials()?.apply(patch);
    service.configure_remote(updated.clone()).await?;

    for line in format_config_lines(&RemoteConfigView::from(&updated.normalized())) {
        println!("{line}");
    }
    Ok(())
}

fn run_config_show(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let service = open_service(db_path)?;
    let view = RemoteConfigView::from(&service.remote_credentials());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        for line in format_config_lines(&view) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_config_lines(view: &RemoteConfigView) -> Vec<String> {
    let unset = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".to_string());
    vec![
        format!("host:   {}", view.host),
        format!("owner:  {}", unset(&view.owner)),
        format!("repo:   {}", unset(&view.repo)),
        format!("branch: {}", view.branch),
        format!("path:   {}", view.path),
        format!(
            "token:  {}",
            if view.token_configured { "configured" } else { "(not set)" }
        ),
    ]
}
