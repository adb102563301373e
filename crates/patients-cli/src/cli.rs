use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use patients_core::search::SearchField;

#[derive(Parser)]
#[command(name = "patients")]
#[command(about = "Manage patient records and mirror them to a remote repository")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new patient
    #[command(alias = "new")]
    Add(AddArgs),
    /// Edit an existing patient (omitted fields are kept)
    #[command(alias = "edit")]
    Update(UpdateArgs),
    /// Delete a patient
    Delete {
        /// Patient code
        code: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List all patients
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one patient
    Show {
        /// Patient code
        code: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search patients by code or name
    Search {
        /// Case-insensitive text to look for
        query: String,
        /// Field to match against
        #[arg(long, value_enum, default_value_t = SearchFieldArg::Any)]
        field: SearchFieldArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show patient counts by status
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export all patients as JSON
    Export {
        /// Output path (defaults to patients-YYYY-MM-DD.json)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },
    /// Replace all patients with the contents of a JSON export
    Import {
        /// JSON document to import
        path: PathBuf,
    },
    /// Mirror the current collection to the remote repository
    Sync,
    /// Replace local patients with the remote snapshot
    Pull,
    /// Configure the remote repository
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Unique patient code
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub given_name: String,
    #[arg(long)]
    pub family_name: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub diagnosis: Option<String>,
    #[arg(long)]
    pub treatment: String,
    /// Active, Completed, or any other label
    #[arg(long, default_value = "Active")]
    pub status: String,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Patient code
    pub code: String,
    #[arg(long)]
    pub given_name: Option<String>,
    #[arg(long)]
    pub family_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub diagnosis: Option<String>,
    #[arg(long)]
    pub treatment: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SearchFieldArg {
    Code,
    GivenName,
    FamilyName,
    Any,
}

impl From<SearchFieldArg> for SearchField {
    fn from(value: SearchFieldArg) -> Self {
        match value {
            SearchFieldArg::Code => Self::Code,
            SearchFieldArg::GivenName => Self::GivenName,
            SearchFieldArg::FamilyName => Self::FamilyName,
            SearchFieldArg::Any => Self::Any,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Save remote repository settings
    Set {
        /// Bearer token for the contents API
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,
        /// Repository owner (user or organization)
        #[arg(long, value_name = "NAME")]
        owner: Option<String>,
        /// Repository name
        #[arg(long, value_name = "NAME")]
        repo: Option<String>,
        /// Branch the snapshot is committed to
        #[arg(long, value_name = "NAME")]
        branch: Option<String>,
        /// File path inside the repository
        #[arg(long, value_name = "PATH")]
        path: Option<String>,
        /// API host (e.g. <https://api.github.com>)
        #[arg(long, value_name = "URL")]
        host: Option<String>,
    },
    /// Show remote repository settings (the token is never printed)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
