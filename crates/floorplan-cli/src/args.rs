use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "floorplan", version, about = "Inspect and validate floor-plan projects")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print entity counts and total wall length of a project file.
    Info { file: PathBuf },

    /// Check a project file for dangling references and bad values.
    Validate { file: PathBuf },

    /// List saved project ids.
    List {
        /// Storage directory (default: platform data dir).
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Create an empty project.
    New {
        name: String,
        /// Storage directory (default: platform data dir).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}
