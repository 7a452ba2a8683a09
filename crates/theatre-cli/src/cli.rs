//! CLI argument definitions for the studio state tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use crate::commands::StoreOptions;

#[derive(Parser)]
#[command(
    name = "theatre-studio",
    version,
    about = "Inspect and export persisted Theatre Studio state",
    long_about = "Inspect and export the state persisted by the Theatre Studio store.\n\n\
                  Lists the projects held in a state file and writes project save files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Studio config file (default: the platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding state files (overrides the config file).
    #[arg(long = "state-dir", value_name = "DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    /// Persistence key naming the state file.
    #[arg(long = "key", default_value = "studio", global = true)]
    pub key: String,
}

impl Cli {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            config: self.config.clone(),
            state_dir: self.state_dir.clone(),
            key: self.key.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List the projects in the persisted studio state.
    Projects,

    /// Write a project's save file and stamp a new revision.
    Export(ExportArgs),
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Id of the project to export.
    #[arg(value_name = "PROJECT_ID")]
    pub project_id: String,

    /// Save file to write (default: <PROJECT_ID>.theatre-project.json).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
