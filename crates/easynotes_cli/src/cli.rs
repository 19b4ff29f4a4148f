use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Clone, Debug, Eq, Parser, PartialEq)]
#[command(version, about = "Inspect Easy Notes databases and markdown")]
pub struct CliConfig {
    /// Note database file.
    #[arg(long, default_value = "easynotes.db")]
    pub db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long)]
    pub log_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Eq, PartialEq, Subcommand)]
pub enum Command {
    /// Print the core library version.
    Version,
    /// Print the parsed node outline of a markdown file.
    Render { file: PathBuf },
    /// List stored notes, most recently updated first.
    List {
        /// Case-insensitive filter over name and description.
        query: Option<String>,
    },
}
