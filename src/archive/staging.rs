//! Temporary copy of the included files
//!
//! The archive tools run against the source directory in place, except when
//! the archive must extract to a different directory name or the tree holds
//! symlinks. In those cases the manifest's include list is copied into a
//! temporary directory named after the extract directory.

use crate::core::error::Result;
use crate::ignore::manifest::Manifest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Include list copied under `<tempdir>/<output dir name>`
#[derive(Debug)]
pub struct StagedTree {
    /// Removed on drop
    _temp_dir: TempDir,
    root: PathBuf,
}

impl StagedTree {
    /// Copy every included entry of `manifest` from `source_dir`
    pub fn create(source_dir: &Path, manifest: &Manifest, output_dir_name: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join(output_dir_name);
        fs::create_dir_all(&root)?;

        let mut copied = 0usize;
        for entry in manifest.include_list() {
            let from = entry.path.to_fs_path(source_dir);
            let to = entry.path.to_fs_path(&root);

            if entry.is_dir {
                fs::create_dir_all(&to)?;
                continue;
            }
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }
            // fs::copy follows symlinks, so links are stored as regular files
            fs::copy(&from, &to)?;
            copied += 1;
        }

        tracing::info!("Staged {} files in {}", copied, root.display());

        Ok(Self {
            _temp_dir: temp_dir,
            root,
        })
    }

    /// Staged directory, named after the extract directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Whether the archive has to be built from a staged copy
pub fn needs_staging(source_dir: &Path, output_dir_name: &str) -> bool {
    let renamed = source_dir
        .file_name()
        .map(|name| name.to_string_lossy() != output_dir_name)
        .unwrap_or(true);
    renamed || contains_symlink(source_dir)
}

/// Whether any entry below `dir` is a symlink
pub fn contains_symlink(dir: &Path) -> bool {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.path_is_symlink())
}
