//! CLI command implementations

pub mod completion;
pub mod config;
pub mod create;
pub mod list;

use crate::cli::context::CliContext;
use crate::ignore::RuleFile;
use colored::Colorize;

/// Print a status line unless `--quiet` is set
pub(crate) fn status(message: impl std::fmt::Display) {
    if !CliContext::is_quiet() {
        println!("{}", message);
    }
}

/// Warn on stderr when the source directory has no rule file
pub(crate) fn warn_missing_rule_file(rule_file: &RuleFile) {
    if rule_file.found() || CliContext::is_quiet() {
        return;
    }
    let name = rule_file
        .path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    eprintln!(
        "{} No {} file found. All files in directory included in archive.",
        "Warning:".yellow().bold(),
        name
    );
}
