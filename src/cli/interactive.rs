//! Interactive CLI prompts

use crate::cli::context::CliContext;
use anyhow::Result;
use colored::Colorize;
use dialoguer::Select;
use std::path::Path;

/// Decide whether an existing archive gets replaced.
///
/// `--force` and `--yes` replace; a non-interactive run skips; otherwise the
/// user picks.
pub fn ask_overwrite_archive(archive_path: &Path, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    if CliContext::is_yes() {
        println!(
            "{}",
            "Archive file exists - auto-replacing (--yes flag)".green()
        );
        return Ok(true);
    }

    eprintln!("{}", "Warning: Archive file already exists".yellow().bold());
    eprintln!("  File: {}", archive_path.display().to_string().yellow());

    if CliContext::is_non_interactive() {
        return Ok(false);
    }

    let choice = Select::new()
        .with_prompt("Do you want to skip or replace it with a new archive?")
        .items(&["Skip", "Replace"])
        .default(0)
        .interact()?;

    Ok(choice == 1)
}
