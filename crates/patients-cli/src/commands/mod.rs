pub mod add;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod export;
pub mod import;
pub mod list;
pub mod search;
pub mod stats;
pub mod sync;
pub mod update;
