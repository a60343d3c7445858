//! Command-line interface definitions for halcyon.
//!
//! Global options (verbosity, color, error format, config file) apply to
//! every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory and review each group interactively
//! halcyon scan
//!
//! # Only text and PDF files between 1 KiB and 10 MB, as JSON
//! halcyon scan -d ~/Documents -e .txt,.pdf -m 1KiB -M 10MB -o json
//!
//! # Sequential scan, print groups without prompting
//! halcyon scan --concurrent false --list
//!
//! # Write a default config file
//! halcyon config init
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Find files that look like copies of each other and clean them up.
///
/// Files are grouped by their name with copy markers removed ("report (1).pdf",
/// "report copy.pdf" -> "report.pdf") and by their size.
#[derive(Debug, Parser)]
#[command(name = "halcyon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration file actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ConfigAction {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub dir: PathBuf,

    /// File extensions to include, with leading dot (e.g. .txt,.pdf)
    ///
    /// Matching is case-sensitive. May be repeated.
    #[arg(short, long = "ext", value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(short, long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(short = 'M', long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Classify files concurrently [default: true]
    #[arg(
        short,
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub concurrent: Option<bool>,

    /// Maximum number of files classified at the same time [default: 10]
    #[arg(short, long, value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Give up scanning after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Print duplicate groups without prompting for actions
    #[arg(long)]
    pub list: bool,

    /// Delete permanently instead of moving to the system trash
    #[arg(long)]
    pub permanent: bool,

    /// Default directory offered when moving files to backup
    #[arg(long, value_name = "PATH")]
    pub backup_dir: Option<PathBuf>,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Counters and tables, with interactive review on a terminal
    Text,
    /// Machine-readable JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Accepts a number with an optional suffix, case-insensitive:
/// - `B` (bytes)
/// - `KB`/`K` (1000), `KiB` (1024)
/// - `MB`/`M`, `MiB`
/// - `GB`/`G`, `GiB`
/// - `TB`/`T`, `TiB`
///
/// # Examples
///
/// ```
/// use halcyon::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1.5MB").unwrap(), 1_500_000);
/// ```
///
/// # Errors
///
/// Returns an error string if the input is empty, not a number, or has an
/// unknown suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse the concurrency cap; must be at least 1.
fn parse_jobs(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: '{s}'"))?;
    if n == 0 {
        return Err("Concurrency must be at least 1".to_string());
    }
    Ok(n)
}
