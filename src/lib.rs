//! dist-archive - Distribution archives honoring .distignore
//!
//! dist-archive packages a project directory into a `.zip` or `.tar.gz`
//! archive, leaving out every path matched by the project's `.distignore`
//! file.
//!
//! # Core Features
//!
//! - **Gitignore-style rules**: wildcards, root anchors, directory-only rules
//!   and `!` negation
//! - **Pruned traversal**: ignored top-level directories such as
//!   `node_modules` are never descended into
//! - **Symlink safety**: link cycles are refused and broken links reported
//! - **Reconciled manifest**: directories are only excluded when nothing
//!   inside them is included
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use dist_archive::{DistignoreFilter, IgnoreChecker, Manifest};
//! use std::path::Path;
//!
//! let source = Path::new("./my-plugin");
//! let (checker, _rule_file) = IgnoreChecker::from_source_dir(source, ".distignore")?;
//! let manifest = Manifest::build(&DistignoreFilter::new(checker, source)?)?;
//!
//! for path in manifest.exclude_list() {
//!     println!("excluded: {}", path);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod core;
pub mod ignore;

// Re-export commonly used types
pub use crate::core::{
    error::{DistArchiveError, Result},
    types::{ArchiveFormat, ManifestEntry, PathEntry, RelativePath},
};

pub use ignore::{
    matches, DistignoreFilter, IgnoreChecker, IgnoreRule, Manifest, MatchError, PathMatcher, RuleFile,
};

pub use archive::{ArchivePlan, ArchiveReport, ArchiveRequest, ArchiveTarget};

/// Current version of dist-archive
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
