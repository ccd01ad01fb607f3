//! Filtered depth-first traversal of a source directory
//!
//! The walk yields every directory (ignored or not) so the manifest can
//! reconcile directory exclusions, yields every non-ignored file, and records
//! ignored files in the exclude list instead of yielding them. Descent into an
//! ignored directory is skipped only when its rule blankets the contents:
//! the directory is a single segment below the root and a probe child is
//! ignored too. That keeps `node_modules` cheap while `frontend/*` with
//! `!/frontend/build/` still reaches the re-included files.
//!
//! All bookkeeping for one walk lives in a single [`TraversalState`] owned by
//! the [`Traversal`] iterator: every depth of the walk reads and writes the
//! same cache, exclude list, error map and visited set.

use crate::core::error::{DistArchiveError, Result};
use crate::core::types::{PathEntry, RelativePath};
use crate::ignore::matcher::{MatchError, PathMatcher};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Name of the synthetic child used to test whether a rule covers a
/// directory's contents
pub const PROBE_NAME: &str = "__probe__";

/// Failure recorded against one entry; surfaced by the manifest builder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("Cannot resolve {}: {reason}", display_target(.target))]
    Unresolvable {
        target: Option<PathBuf>,
        reason: String,
    },

    #[error("{reason}")]
    Io { reason: String },
}

fn display_target(target: &Option<PathBuf>) -> String {
    match target {
        Some(target) => target.display().to_string(),
        None => "link target".to_string(),
    }
}

/// A path recorded in the exclude list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedPath {
    /// Path relative to the source root
    pub path: RelativePath,
    /// Whether the path is a directory
    pub is_dir: bool,
}

/// Counters for one traversal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Entries produced by the directory walk
    pub entries_visited: usize,
    /// Calls that reached the matcher
    pub matcher_calls: usize,
    /// Lookups answered from the cache
    pub cache_hits: usize,
    /// Ignored directories not descended into
    pub directories_skipped: usize,
    /// Symlinked directories refused descent
    pub cycles_refused: usize,
}

/// Mutable state shared by every level of one traversal
#[derive(Debug, Default)]
pub struct TraversalState {
    /// Relative path to ignored status
    ignored_cache: HashMap<RelativePath, bool>,
    /// Ignored files and directories, in visit order
    excluded: Vec<ExcludedPath>,
    /// Per-entry failures, in visit order
    errors: IndexMap<RelativePath, EntryError>,
    /// Canonical directories already descended into
    visited: HashSet<PathBuf>,
    /// Relative path of the directory open at each depth; the root is `/`
    open_dirs: Vec<RelativePath>,
    /// Counters
    stats: TraversalStats,
}

impl TraversalState {
    /// Ignored paths recorded so far
    pub fn excluded(&self) -> &[ExcludedPath] {
        &self.excluded
    }

    /// Recorded failure for a path, if any
    pub fn error_for_item(&self, path: &RelativePath) -> Option<&EntryError> {
        self.errors.get(path)
    }

    /// All recorded failures in visit order
    pub fn errors(&self) -> impl Iterator<Item = (&RelativePath, &EntryError)> {
        self.errors.iter()
    }

    /// Cached ignored status for a path
    pub fn cached(&self, path: &RelativePath) -> Option<bool> {
        self.ignored_cache.get(path).copied()
    }

    /// Counters for this traversal
    pub fn stats(&self) -> &TraversalStats {
        &self.stats
    }

    fn record_error(&mut self, path: RelativePath, error: EntryError) {
        tracing::debug!("Recording error for {}: {}", path, error);
        self.errors.entry(path).or_insert(error);
    }

    fn exclude(&mut self, path: RelativePath, is_dir: bool) {
        self.excluded.push(ExcludedPath { path, is_dir });
    }
}

/// Traversal filter over one source directory
#[derive(Debug, Clone)]
pub struct DistignoreFilter<M> {
    /// Matcher deciding ignored status
    matcher: M,
    /// Canonical source directory
    source_root: PathBuf,
}

impl<M: PathMatcher> DistignoreFilter<M> {
    /// Create a filter for `source_root`, which must be an existing directory
    pub fn new(matcher: M, source_root: &Path) -> Result<Self> {
        let canonical = dunce::canonicalize(source_root)
            .ok()
            .filter(|path| path.is_dir())
            .ok_or_else(|| DistArchiveError::not_a_directory(source_root.to_path_buf()))?;
        Ok(Self {
            matcher,
            source_root: canonical,
        })
    }

    /// Canonical source directory
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// The matcher in use
    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Start a fresh traversal with its own state
    pub fn walk(&self) -> Traversal<'_, M> {
        let inner = WalkDir::new(&self.source_root)
            .follow_links(true)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        let mut state = TraversalState::default();
        state.visited.insert(self.source_root.clone());
        state.open_dirs.push(RelativePath::new("/"));

        Traversal {
            filter: self,
            inner,
            state,
        }
    }
}

/// One depth-first walk; yields the entries the manifest needs
pub struct Traversal<'a, M> {
    filter: &'a DistignoreFilter<M>,
    inner: walkdir::IntoIter,
    state: TraversalState,
}

impl<'a, M: PathMatcher> Traversal<'a, M> {
    /// Look up the ignored status of a path, consulting the matcher only on
    /// a cache miss. Errors are not cached.
    pub fn is_path_ignored_cached(
        &mut self,
        path: &RelativePath,
        is_dir: bool,
    ) -> std::result::Result<bool, MatchError> {
        if let Some(ignored) = self.state.ignored_cache.get(path) {
            self.state.stats.cache_hits += 1;
            return Ok(*ignored);
        }

        self.state.stats.matcher_calls += 1;
        let ignored = self.filter.matcher.is_path_ignored(path, is_dir)?;
        self.state.ignored_cache.insert(path.clone(), ignored);
        Ok(ignored)
    }

    /// State accumulated so far
    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    /// Finish the walk and hand over its state
    pub fn into_state(self) -> TraversalState {
        self.state
    }

    /// Ignored status for an entry; a matcher failure is recorded and the
    /// entry is treated as not ignored
    fn classify(&mut self, path: &RelativePath, is_dir: bool) -> bool {
        match self.is_path_ignored_cached(path, is_dir) {
            Ok(ignored) => ignored,
            Err(e) => {
                self.state.record_error(path.clone(), e.into());
                false
            },
        }
    }

    fn relative(&mut self, path: &Path) -> RelativePath {
        if let Some(relative) = RelativePath::from_path(&self.filter.source_root, path) {
            return relative;
        }

        let lossy = path
            .strip_prefix(&self.filter.source_root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        let relative = RelativePath::new(lossy);
        self.state.record_error(
            relative.clone(),
            MatchError::InvalidPath {
                path: relative.to_string(),
                reason: "is not valid UTF-8",
            }
            .into(),
        );
        relative
    }

    fn visit(&mut self, dent: walkdir::DirEntry) -> Option<PathEntry> {
        let path = dent.path().to_path_buf();
        let relative = self.relative(&path);
        let is_dir = dent.file_type().is_dir();
        let is_symlink = dent.path_is_symlink();

        if !is_dir {
            if self.classify(&relative, false) {
                self.state.exclude(relative, false);
                return None;
            }
            let real_path = if is_symlink {
                dunce::canonicalize(&path).ok()
            } else {
                None
            };
            return Some(PathEntry {
                path,
                relative,
                is_dir: false,
                is_symlink,
                real_path,
                ignored: false,
            });
        }

        let ignored = self.classify(&relative, true);
        if ignored {
            self.state.exclude(relative.clone(), true);
        }

        self.state.open_dirs.truncate(dent.depth());
        self.state.open_dirs.push(relative.clone());

        let entry = PathEntry {
            real_path: dunce::canonicalize(&path).ok(),
            path,
            relative,
            is_dir: true,
            is_symlink,
            ignored,
        };

        if !self.should_descend(&entry) {
            self.inner.skip_current_dir();
        }

        Some(entry)
    }

    fn should_descend(&mut self, entry: &PathEntry) -> bool {
        if entry.ignored && entry.relative.is_single_segment() {
            let probe = entry.relative.join(PROBE_NAME);
            if let Ok(true) = self.is_path_ignored_cached(&probe, false) {
                tracing::debug!("Skipping ignored directory {}", entry.relative);
                self.state.stats.directories_skipped += 1;
                return false;
            }
        }

        let Some(real_path) = &entry.real_path else {
            return true;
        };

        // A directory reached at its own location is always walked
        if *real_path == entry.path {
            self.state.visited.insert(real_path.clone());
            return true;
        }

        let refusal = if self.filter.source_root.starts_with(real_path) {
            Some("is an ancestor of the source root")
        } else if real_path.starts_with(&self.filter.source_root) {
            Some("is walked at its own location")
        } else if !self.state.visited.insert(real_path.clone()) {
            Some("was already walked")
        } else {
            None
        };

        match refusal {
            Some(reason) => {
                tracing::debug!(
                    "Not descending into {}: {} {}",
                    entry.relative,
                    real_path.display(),
                    reason
                );
                self.state.stats.cycles_refused += 1;
                false
            },
            None => true,
        }
    }

    /// Directory being read when an entry at `depth` failed
    fn open_dir_at(&self, depth: usize) -> RelativePath {
        self.state
            .open_dirs
            .get(depth.saturating_sub(1))
            .cloned()
            .unwrap_or_else(|| RelativePath::new("/"))
    }

    fn visit_error(&mut self, err: walkdir::Error) -> Option<PathEntry> {
        let Some(path) = err.path().map(Path::to_path_buf) else {
            let dir = self.open_dir_at(err.depth());
            tracing::warn!("Failed to read an entry of {}: {}", dir, err);
            self.state
                .record_error(dir, EntryError::Io { reason: err.to_string() });
            return None;
        };
        if path == self.filter.source_root {
            self.state.record_error(RelativePath::new("/"), EntryError::Io { reason: err.to_string() });
            return None;
        }
        let relative = self.relative(&path);

        if let Some(ancestor) = err.loop_ancestor() {
            tracing::debug!(
                "Not descending into {}: loops back to {}",
                relative,
                ancestor.display()
            );
            self.state.stats.cycles_refused += 1;

            let ignored = self.classify(&relative, true);
            if ignored {
                self.state.exclude(relative.clone(), true);
            }
            return Some(PathEntry {
                real_path: dunce::canonicalize(&path).ok(),
                path,
                relative,
                is_dir: true,
                is_symlink: true,
                ignored,
            });
        }

        if is_dangling_symlink(&path) {
            let target = fs::read_link(&path).ok();
            let reason = err
                .io_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| err.to_string());
            self.state
                .record_error(relative.clone(), EntryError::Unresolvable { target, reason });
            return Some(PathEntry {
                path,
                relative,
                is_dir: false,
                is_symlink: true,
                real_path: None,
                ignored: false,
            });
        }

        // An unreadable directory was already yielded; only its error is new.
        self.state
            .record_error(relative, EntryError::Io { reason: err.to_string() });
        None
    }
}

impl<'a, M: PathMatcher> Iterator for Traversal<'a, M> {
    type Item = PathEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.inner.next()?;
            self.state.stats.entries_visited += 1;

            let entry = match item {
                Ok(dent) => self.visit(dent),
                Err(err) => self.visit_error(err),
            };

            if entry.is_some() {
                return entry;
            }
        }
    }
}

/// Whether `path` is a symbolic link whose target does not exist
pub fn is_dangling_symlink(path: &Path) -> bool {
    let is_link = fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    is_link && fs::metadata(path).is_err()
}
