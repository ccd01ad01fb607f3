//! Include/exclude manifest built from a filtered traversal

use crate::core::error::{DistArchiveError, Result};
use crate::core::types::{ManifestEntry, PathEntry, RelativePath};
use crate::ignore::filter::{
    is_dangling_symlink, DistignoreFilter, EntryError, ExcludedPath, TraversalState,
    TraversalStats,
};
use crate::ignore::matcher::PathMatcher;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything one traversal produced, before reconciliation
#[derive(Debug)]
pub struct FileScan {
    /// Canonical source directory
    source_root: PathBuf,
    /// Yielded entries in traversal order
    entries: Vec<PathEntry>,
    /// Cache, exclude list, errors and visited set of the traversal
    state: TraversalState,
}

impl FileScan {
    /// Walk the filter's source directory once
    pub fn run<M: PathMatcher>(filter: &DistignoreFilter<M>) -> Self {
        let mut walk = filter.walk();
        let entries: Vec<PathEntry> = walk.by_ref().collect();
        let state = walk.into_state();

        tracing::debug!(
            "Scanned {}: {} entries yielded, {} excluded, {} errors",
            filter.source_root().display(),
            entries.len(),
            state.excluded().len(),
            state.errors().count()
        );

        Self {
            source_root: filter.source_root().to_path_buf(),
            entries,
            state,
        }
    }

    /// Yielded entries in traversal order
    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    /// Ignored paths as recorded during the walk
    pub fn excluded(&self) -> &[ExcludedPath] {
        self.state.excluded()
    }

    /// Traversal counters
    pub fn stats(&self) -> &TraversalStats {
        self.state.stats()
    }

    /// Recorded failures in visit order
    pub fn errors(&self) -> impl Iterator<Item = (&RelativePath, &EntryError)> {
        self.state.errors()
    }

    /// Reconcile the scan into a manifest.
    ///
    /// Fails on the first recorded entry error; a dangling symlink is
    /// reported as [`DistArchiveError::BrokenSymlink`].
    pub fn into_manifest(self) -> Result<Manifest> {
        if let Some((path, error)) = self.state.errors().next() {
            return Err(diagnose(&self.source_root, path, error));
        }

        let included: Vec<ManifestEntry> = self
            .entries
            .into_iter()
            .filter(|entry| !entry.ignored)
            .map(|entry| ManifestEntry {
                path: entry.relative,
                is_dir: entry.is_dir,
            })
            .collect();

        let excluded = reconcile(self.state.excluded(), &included);

        Ok(Manifest { included, excluded })
    }
}

/// Final include and exclude lists handed to the archive writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Non-ignored files and directories in traversal order
    included: Vec<ManifestEntry>,
    /// Ignored paths, minus directories with included descendants
    excluded: Vec<RelativePath>,
}

impl Manifest {
    /// Walk `filter`'s source directory and build its manifest
    pub fn build<M: PathMatcher>(filter: &DistignoreFilter<M>) -> Result<Self> {
        FileScan::run(filter).into_manifest()
    }

    /// Included files and directories
    pub fn include_list(&self) -> &[ManifestEntry] {
        &self.included
    }

    /// Included files only
    pub fn included_files(&self) -> impl Iterator<Item = &RelativePath> {
        self.included
            .iter()
            .filter(|entry| !entry.is_dir)
            .map(|entry| &entry.path)
    }

    /// Reconciled exclude list
    pub fn exclude_list(&self) -> &[RelativePath] {
        &self.excluded
    }

    /// Whether `path` is in the include list
    pub fn is_included(&self, path: &str) -> bool {
        self.included.iter().any(|entry| entry.path.as_str() == path)
    }

    /// Whether `path` is in the exclude list
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|excluded| excluded.as_str() == path)
    }
}

/// Drop excluded directories that have an included descendant
fn reconcile(excluded: &[ExcludedPath], included: &[ManifestEntry]) -> Vec<RelativePath> {
    let included_ancestors: HashSet<&str> = included
        .iter()
        .flat_map(|entry| entry.path.ancestors())
        .collect();

    excluded
        .iter()
        .filter(|excluded| {
            let keep = !(excluded.is_dir && included_ancestors.contains(excluded.path.as_str()));
            if !keep {
                tracing::debug!("Keeping {} out of the exclude list: it has included contents", excluded.path);
            }
            keep
        })
        .map(|excluded| excluded.path.clone())
        .collect()
}

fn diagnose(source_root: &Path, path: &RelativePath, error: &EntryError) -> DistArchiveError {
    let fs_path = path.to_fs_path(source_root);

    if let EntryError::Unresolvable {
        target: Some(target),
        ..
    } = error
    {
        return DistArchiveError::broken_symlink(path.as_str(), target.clone());
    }

    if is_dangling_symlink(&fs_path) {
        let target = fs::read_link(&fs_path).unwrap_or_default();
        return DistArchiveError::broken_symlink(path.as_str(), target);
    }

    DistArchiveError::invalid_rule(path.as_str(), error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ignore::checker::IgnoreChecker;
    use crate::ignore::parser::parse_rules;
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn manifest_for(root: &Path, rules: &str) -> crate::core::error::Result<Manifest> {
        let filter = DistignoreFilter::new(IgnoreChecker::new(&parse_rules(rules)), root)?;
        Manifest::build(&filter)
    }

    fn paths(list: &[RelativePath]) -> Vec<&str> {
        list.iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn test_excluded_directory_with_included_descendant_is_dropped() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("app/logs"))?;
        fs::write(root.join("app/logs/debug.txt"), "a")?;
        fs::write(root.join("app/logs/keep.txt"), "b")?;

        let scan = FileScan::run(&DistignoreFilter::new(
            IgnoreChecker::new(&parse_rules("logs\n!keep.txt\n")),
            root,
        )?);
        assert!(scan
            .excluded()
            .iter()
            .any(|e| e.path.as_str() == "/app/logs" && e.is_dir));

        let manifest = scan.into_manifest()?;

        assert!(manifest.is_included("/app/logs/keep.txt"));
        assert!(!manifest.is_excluded("/app/logs"));
        assert!(manifest.is_excluded("/app/logs/debug.txt"));
        Ok(())
    }

    #[test]
    fn test_reconcile_respects_segments() {
        let excluded = vec![
            ExcludedPath {
                path: RelativePath::new("/foo"),
                is_dir: true,
            },
            ExcludedPath {
                path: RelativePath::new("/bar"),
                is_dir: true,
            },
            ExcludedPath {
                path: RelativePath::new("/bar/x.log"),
                is_dir: false,
            },
        ];
        let included = vec![
            ManifestEntry {
                path: RelativePath::new("/foobar.txt"),
                is_dir: false,
            },
            ManifestEntry {
                path: RelativePath::new("/bar/keep/y.txt"),
                is_dir: false,
            },
        ];

        let reconciled = reconcile(&excluded, &included);
        assert_eq!(paths(&reconciled), vec!["/foo", "/bar/x.log"]);
    }

    #[test]
    fn test_include_and_exclude_are_disjoint() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("node_modules/pkg"))?;
        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join("node_modules/pkg/index.js"), "x")?;
        fs::write(root.join("src/main.php"), "<?php")?;
        fs::write(root.join("debug.log"), "x")?;

        let manifest = manifest_for(root, "node_modules\n*.log\n")?;

        for entry in manifest.include_list() {
            assert!(!manifest.is_excluded(entry.path.as_str()), "{}", entry.path);
        }
        assert_eq!(paths(manifest.exclude_list()), vec!["/debug.log", "/node_modules"]);
        let files: Vec<_> = manifest.included_files().map(|p| p.as_str()).collect();
        assert_eq!(files, vec!["/src/main.php"]);
        Ok(())
    }

    #[test]
    fn test_empty_rules_include_everything() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir(root.join("dir"))?;
        fs::write(root.join("dir/file.txt"), "x")?;

        let manifest = manifest_for(root, "")?;

        assert!(manifest.is_included("/dir"));
        assert!(manifest.is_included("/dir/file.txt"));
        assert!(manifest.exclude_list().is_empty());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_fails_with_specific_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir(root.join("assets"))?;
        std::os::unix::fs::symlink("does-not-exist.png", root.join("assets/logo.png"))?;

        match manifest_for(root, "") {
            Err(DistArchiveError::BrokenSymlink { path, target }) => {
                assert_eq!(path, "/assets/logo.png");
                assert_eq!(target, PathBuf::from("does-not-exist.png"));
            },
            other => panic!("Expected BrokenSymlink, got: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_matcher_error_is_fatal() {
        let error = EntryError::Io {
            reason: "permission denied".to_string(),
        };
        let diagnosed = diagnose(Path::new("/nonexistent-root"), &RelativePath::new("/locked"), &error);
        assert!(matches!(diagnosed, DistArchiveError::InvalidRule { .. }));
        assert!(diagnosed.to_string().contains("/locked"));
    }
}
