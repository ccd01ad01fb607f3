//! Create command implementation

use crate::archive::{ArchivePlan, ArchiveRequest, ArchiveTarget};
use crate::cli::commands::{status, warn_missing_rule_file};
use crate::cli::context::CliContext;
use crate::cli::interactive::ask_overwrite_archive;
use crate::config::DistConfig;
use crate::core::types::ArchiveFormat;
use anyhow::Result;
use bytesize::ByteSize;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the create command
pub fn execute(
    path: PathBuf,
    target: Option<PathBuf>,
    create_target_dir: bool,
    force: bool,
    plugin_dirname: Option<String>,
    format: Option<ArchiveFormat>,
    filename_format: Option<String>,
) -> Result<()> {
    let config = DistConfig::load()?;

    let request = ArchiveRequest {
        source: path,
        target,
        create_target_dir: create_target_dir || config.create_target_dir(),
        plugin_dirname,
        format: format.unwrap_or_else(|| config.format()),
        filename_format: filename_format.unwrap_or_else(|| config.filename_format().to_string()),
    };

    let cwd = std::env::current_dir()?;
    let target = ArchiveTarget::resolve(&request, &cwd)?;
    let archive_path = target.archive_path();

    if archive_path.exists() {
        if !ask_overwrite_archive(&archive_path, force)? {
            status("Skipping");
            status("Archive generation skipped.".yellow());
            return Ok(());
        }
        status(format!("Replacing {}", archive_path.display()));
    }

    let plan = ArchivePlan::prepare(target, config.ignore_file_name())?;
    warn_missing_rule_file(plan.rule_file());

    tracing::info!(
        "{} paths included, {} excluded",
        plan.manifest().include_list().len(),
        plan.manifest().exclude_list().len()
    );

    if CliContext::is_verbose() {
        status(format!("Running {}", plan.command().display().dimmed()));
    }

    let file_name = plan.target().file_name.clone();
    let report = plan.execute()?;

    status(format!(
        "{} Created {} (Size: {})",
        "✓".green(),
        file_name.bold(),
        ByteSize(report.size)
    ));

    Ok(())
}
