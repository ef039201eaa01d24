use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fhost - In-memory versioned file-metadata store
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Optional log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Config file (default: ~/.config/fhost/config.toml if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a TOML command script and print one output per command
    ///
    /// The script holds `commands = [["FILE_UPLOAD", "a.txt", 10], ...]`.
    /// Every command runs against the same fresh store.
    Run {
        /// Path to the script
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Keep running after a failing command (prints null for it)
        #[arg(long)]
        keep_going: bool,

        /// Print the history log after the run
        #[arg(long)]
        history: bool,
    },

    /// Read commands from stdin, one per line, printing each output
    ///
    /// Tokens are whitespace separated; use "" for an empty argument.
    /// Blank lines and lines starting with '#' are skipped.
    Exec {
        /// Keep reading after a failing command
        #[arg(long)]
        keep_going: bool,
    },
}
