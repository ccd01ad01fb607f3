//! Distribution archive creation
//!
//! An [`ArchivePlan`] ties the pieces together: the resolved
//! [`ArchiveTarget`], the manifest of the source directory, an optional
//! staged copy and the external `zip`/`tar` command that writes the file.

pub mod invoker;
pub mod staging;
pub mod target;
pub mod version;

pub use invoker::ArchiveCommand;
pub use staging::StagedTree;
pub use target::{ArchiveRequest, ArchiveTarget, DEFAULT_FILENAME_FORMAT};
pub use version::discover_version;

use crate::core::error::Result;
use crate::ignore::{DistignoreFilter, IgnoreChecker, Manifest, RuleFile};
use std::fs;
use std::path::PathBuf;

/// Everything needed to write one archive
#[derive(Debug)]
pub struct ArchivePlan {
    target: ArchiveTarget,
    rule_file: RuleFile,
    manifest: Manifest,
    command: ArchiveCommand,
    /// Kept alive until the command has run
    staged: Option<StagedTree>,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Written archive
    pub path: PathBuf,
    /// Archive size in bytes
    pub size: u64,
}

impl ArchivePlan {
    /// Load the rules, build the manifest and pick the archive command
    pub fn prepare(target: ArchiveTarget, ignore_file_name: &str) -> Result<Self> {
        let (checker, rule_file) = IgnoreChecker::from_source_dir(&target.source_dir, ignore_file_name)?;
        let filter = DistignoreFilter::new(checker, &target.source_dir)?;
        let manifest = Manifest::build(&filter)?;

        let archive_path = target.archive_path();
        let (command, staged) = if staging::needs_staging(&target.source_dir, &target.output_dir_name) {
            let staged = StagedTree::create(&target.source_dir, &manifest, &target.output_dir_name)?;
            let command = ArchiveCommand::whole_tree(target.format, staged.root(), &archive_path)?;
            (command, Some(staged))
        } else if rule_file.is_empty() {
            (ArchiveCommand::whole_tree(target.format, &target.source_dir, &archive_path)?, None)
        } else {
            let command = ArchiveCommand::filtered(target.format, &target.source_dir, &archive_path, &manifest)?;
            (command, None)
        };

        Ok(Self {
            target,
            rule_file,
            manifest,
            command,
            staged,
        })
    }

    /// Resolved target
    pub fn target(&self) -> &ArchiveTarget {
        &self.target
    }

    /// Rule file the manifest was built from
    pub fn rule_file(&self) -> &RuleFile {
        &self.rule_file
    }

    /// Include and exclude lists
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Command that will write the archive
    pub fn command(&self) -> &ArchiveCommand {
        &self.command
    }

    /// Whether the archive is built from a staged copy
    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }

    /// Write the archive, replacing an existing file
    pub fn execute(self) -> Result<ArchiveReport> {
        let path = self.target.archive_path();
        if path.exists() {
            tracing::info!("Removing existing archive {}", path.display());
            fs::remove_file(&path)?;
        }

        self.command.run()?;

        let size = fs::metadata(&path)?.len();
        Ok(ArchiveReport { path, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ArchiveFormat;
    use anyhow::Result;
    use tempfile::TempDir;

    fn plugin(temp_dir: &TempDir) -> Result<PathBuf> {
        let root = temp_dir.path().join("plugin");
        fs::create_dir_all(root.join("node_modules/pkg"))?;
        fs::write(root.join("node_modules/pkg/index.js"), "x")?;
        fs::write(root.join("plugin.php"), "<?php\n/**\n * Version: 1.0.0\n */\n")?;
        Ok(root)
    }

    #[test]
    fn test_prepare_in_place_uses_filtered_command() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = plugin(&temp_dir)?;
        fs::write(root.join(".distignore"), "node_modules\n")?;

        let target = ArchiveTarget::resolve(&ArchiveRequest::new(&root), temp_dir.path())?;
        let plan = ArchivePlan::prepare(target, ".distignore")?;

        assert!(!plan.is_staged());
        assert!(plan.rule_file().found());
        assert_eq!(plan.target().file_name, "plugin.1.0.0.zip");
        assert!(plan.manifest().is_excluded("/node_modules"));
        assert!(plan.command().args().iter().any(|arg| arg.starts_with("-i@")));
        Ok(())
    }

    #[test]
    fn test_prepare_without_rules_archives_whole_tree() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = plugin(&temp_dir)?;

        let mut request = ArchiveRequest::new(&root);
        request.format = ArchiveFormat::Targz;
        let target = ArchiveTarget::resolve(&request, temp_dir.path())?;
        let plan = ArchivePlan::prepare(target, ".distignore")?;

        assert!(!plan.rule_file().found());
        assert!(plan.manifest().is_included("/node_modules/pkg/index.js"));
        assert!(plan.command().display().starts_with("tar -zcf "));
        Ok(())
    }

    #[test]
    fn test_prepare_renamed_output_is_staged() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = plugin(&temp_dir)?;
        fs::write(root.join(".distignore"), "node_modules\n")?;

        let mut request = ArchiveRequest::new(&root);
        request.plugin_dirname = Some("renamed".to_string());
        let target = ArchiveTarget::resolve(&request, temp_dir.path())?;
        let plan = ArchivePlan::prepare(target, ".distignore")?;

        assert!(plan.is_staged());
        assert!(plan.command().display().starts_with("zip -r "));
        assert!(plan.command().display().ends_with(" renamed"));
        Ok(())
    }
}
