//! Command-line interface.

use std::path::PathBuf;

use clap::{
    Args,
    Parser,
    Subcommand,
    ValueEnum,
};

/// Builds and serves Closure JavaScript applications through plovr.
#[derive(Debug, Parser)]
#[command(name = "plovr-bridge")]
#[command(about = "Builds and serves Closure JavaScript applications through plovr")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile one output file per configured locale
    Build {
        #[command(flatten)]
        tools: ToolArgs,

        /// Keep going when plovr exits with a non-zero status
        #[arg(long)]
        allow_failure: bool,
    },

    /// Start the plovr development server
    #[command(visible_alias = "serve")]
    Start {
        #[command(flatten)]
        tools: ToolArgs,
    },

    /// List the message ids referenced by MSG_ defines
    Extract {
        /// Directory to scan (defaults to the project directory)
        dir: Option<PathBuf>,

        #[command(flatten)]
        project: ProjectArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Options shared by the commands that run plovr.
#[derive(Debug, Clone, Args)]
pub struct ToolArgs {
    /// The configuration file to use (`@Bundle/file.json` or a path)
    pub config: String,

    /// Java binary (defaults to `javaBin` in .plovr.json, then PATH)
    #[arg(long, value_name = "PATH")]
    pub java_bin: Option<PathBuf>,

    /// plovr jar (defaults to `plovrJar` in .plovr.json)
    #[arg(long, value_name = "PATH")]
    pub plovr_jar: Option<PathBuf>,

    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ProjectArgs {
    /// Directory holding .plovr.json (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `<id>\t<source>` line per message
    Text,
    /// A JSON array of `{"id", "source"}` objects
    Json,
}
