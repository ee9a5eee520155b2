//! Command-line configuration for rawtiff.
//!
//! This module provides the CLI definition:
//! - Subcommands and arguments via clap
//! - Environment variables with `RAWTIFF_` prefix for the global options
//! - Per-command validation before any file is touched
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use rawtiff::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Command::Dirs(config) => println!("listing {}", config.path.display()),
//!     _ => {}
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `RAWTIFF_FORMAT` - Output format, `text` or `json` (default: text)
//! - `RAWTIFF_VERBOSE` - Enable debug logging (default: false)
//! - `RUST_LOG` - Overrides the log filter entirely

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// =============================================================================
// CLI Arguments
// =============================================================================

/// rawtiff - Inspect TIFF/DNG camera raw files and raw image sequences.
#[derive(Parser, Debug, Clone)]
#[command(name = "rawtiff")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for reports.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text, env = "RAWTIFF_FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false, env = "RAWTIFF_VERBOSE")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// How reports are printed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Detect the file format and print the matching report.
    Info(InfoConfig),

    /// Print the trailer of a raw image sequence.
    Footer(FooterConfig),

    /// List the directories of a TIFF file.
    Dirs(DirsConfig),

    /// Parse a TIFF file and write an identical copy.
    Copy(CopyConfig),
}

impl Command {
    /// Validate the selected command's arguments.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Command::Info(config) => config.validate(),
            Command::Footer(config) => config.validate(),
            Command::Dirs(config) => config.validate(),
            Command::Copy(config) => config.validate(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    /// File to inspect.
    pub path: PathBuf,
}

impl InfoConfig {
    pub fn validate(&self) -> Result<(), String> {
        require_file(&self.path)
    }
}

#[derive(Args, Debug, Clone)]
pub struct FooterConfig {
    /// Raw image sequence file.
    pub path: PathBuf,

    /// Also print the byte range of this frame.
    #[arg(long)]
    pub frame: Option<u32>,
}

impl FooterConfig {
    pub fn validate(&self) -> Result<(), String> {
        require_file(&self.path)
    }
}

#[derive(Args, Debug, Clone)]
pub struct DirsConfig {
    /// TIFF file to list.
    pub path: PathBuf,

    /// Only print the first directory holding CFA raw data.
    #[arg(long, default_value_t = false)]
    pub cfa_only: bool,
}

impl DirsConfig {
    pub fn validate(&self) -> Result<(), String> {
        require_file(&self.path)
    }
}

#[derive(Args, Debug, Clone)]
pub struct CopyConfig {
    /// TIFF file to read.
    pub source: PathBuf,

    /// Path to write the copy to.
    pub destination: PathBuf,

    /// Overwrite the destination if it exists.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

impl CopyConfig {
    pub fn validate(&self) -> Result<(), String> {
        require_file(&self.source)?;

        if self.source == self.destination {
            return Err("Source and destination must be different paths".to_string());
        }

        if self.destination.exists() && !self.force {
            return Err(format!(
                "{} already exists. Use --force to overwrite",
                self.destination.display()
            ));
        }

        Ok(())
    }
}

fn require_file(path: &std::path::Path) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        return Err("A file path is required".to_string());
    }
    if !path.is_file() {
        return Err(format!("{} is not a readable file", path.display()));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
