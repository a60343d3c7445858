//! Halcyon - Candidate Duplicate File Finder
//!
//! Walks a directory tree, groups files whose names differ only by copy
//! markers ("report (1).pdf", "report copy.pdf") and whose sizes match, and
//! lets an operator keep, delete or back up each group.
//!
//! The scan engine lives in [`scanner`] and [`duplicates`]; everything else
//! is the command-line application built on top of it.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::actions::Reviewer;
use crate::cli::{Cli, Commands, ConfigAction, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::json::JsonReport;
use crate::output::table::{render_group, render_heading, render_summary};
use crate::progress::Progress;
use crate::scanner::Walker;

/// Run the application, writing results to stdout.
///
/// # Errors
///
/// Any failure that should end the process with a non-zero status. A
/// cancelled scan surfaces as [`scanner::TraversalError::Cancelled`] in the
/// error chain.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let stdout = io::stdout();
    run_app_with_output(cli, &mut stdout.lock())
}

/// Run the application, writing results to `out`.
///
/// Interactive review still reads stdin, and only happens when stdin is a
/// terminal.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_app_with_output<W: Write>(cli: Cli, out: &mut W) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    match &cli.command {
        Commands::Scan(args) => run_scan(&cli, args, out),
        Commands::Config { action } => run_config(cli.config.as_deref(), *action, out),
    }
}

fn run_scan<W: Write>(cli: &Cli, args: &ScanArgs, out: &mut W) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref());
    let options = config.scan_options(args);
    log::debug!("Scan options: {:?}", options);

    let mut token = signal::install_handler()?;
    if let Some(secs) = args.timeout {
        token = token.with_timeout(Duration::from_secs(secs));
    }

    let mut walker = Walker::new(&args.dir, options).with_cancellation(token);
    if !cli.quiet && args.output == OutputFormat::Text {
        walker = walker.with_progress(Arc::new(Progress::new(false)));
    }

    let result = walker
        .traverse()
        .with_context(|| format!("failed to scan {}", args.dir.display()))?;

    let exit_code = if result.duplicate_group_count() > 0 {
        ExitCode::Success
    } else {
        ExitCode::NoDuplicates
    };

    if args.output == OutputFormat::Json {
        JsonReport::new(&result, exit_code).write_to(out, true)?;
        return Ok(exit_code);
    }

    render_summary(out, &result.stats)?;
    if exit_code == ExitCode::NoDuplicates {
        writeln!(out, "No duplicates found.")?;
        return Ok(exit_code);
    }

    let color = !cli.no_color && io::stdout().is_terminal();
    let groups = result.into_duplicates();
    writeln!(out, "Found {} duplicate group(s).", groups.len())?;

    if args.list || !io::stdin().is_terminal() {
        for group in &groups {
            render_heading(out, &group.key, group.len(), color)?;
            render_group(out, &group.files, color)?;
        }
        return Ok(exit_code);
    }

    let stdin = io::stdin();
    let summary = Reviewer::new(stdin.lock(), &mut *out, config.delete_config(args))
        .with_backup_dir(config.backup_dir(args))
        .with_color(color)
        .review_all(groups)?;
    writeln!(
        out,
        "\nReviewed {} group(s): {} deleted, {} moved, {} freed",
        summary.groups_reviewed,
        summary.files_deleted,
        summary.files_moved,
        bytesize::ByteSize::b(summary.bytes_freed)
    )?;

    Ok(exit_code)
}

fn run_config<W: Write>(path: Option<&Path>, action: ConfigAction, out: &mut W) -> Result<ExitCode> {
    let file = Config::resolve_path(path)?;

    match action {
        ConfigAction::Path => writeln!(out, "{}", file.display())?,
        ConfigAction::Show => {
            let config = Config::try_load(Some(&file))?;
            write!(out, "{}", config.to_toml()?)?;
        }
        ConfigAction::Init { force } => {
            if file.exists() && !force {
                bail!(
                    "config file already exists at {} (use --force to overwrite)",
                    file.display()
                );
            }
            Config::default().save(&file)?;
            writeln!(out, "Wrote default config to {}", file.display())?;
        }
    }

    Ok(ExitCode::Success)
}
