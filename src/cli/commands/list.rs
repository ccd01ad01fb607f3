//! List command implementation
//!
//! Prints the manifest of a source directory without writing an archive.

use crate::cli::commands::warn_missing_rule_file;
use crate::config::DistConfig;
use crate::core::error::DistArchiveError;
use crate::ignore::{DistignoreFilter, IgnoreChecker, Manifest};
use anyhow::Result;
use std::path::PathBuf;

/// Execute the list command
pub fn execute(path: PathBuf, excluded: bool, json: bool) -> Result<()> {
    let config = DistConfig::load()?;

    if !path.is_dir() {
        return Err(DistArchiveError::not_a_directory(path).into());
    }

    let (checker, rule_file) = IgnoreChecker::from_source_dir(&path, config.ignore_file_name())?;
    let filter = DistignoreFilter::new(checker, &path)?;
    warn_missing_rule_file(&rule_file);

    let manifest = Manifest::build(&filter)?;

    let lines: Vec<String> = if excluded {
        manifest
            .exclude_list()
            .iter()
            .map(|path| path.to_string())
            .collect()
    } else {
        manifest
            .include_list()
            .iter()
            .map(|entry| {
                if entry.is_dir {
                    format!("{}/", entry.path)
                } else {
                    entry.path.to_string()
                }
            })
            .collect()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
    } else {
        for line in lines {
            println!("{}", line);
        }
    }

    Ok(())
}
