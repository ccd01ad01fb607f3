//! File selection with .distignore support
//!
//! This module turns a `.distignore` rule file and a source directory into
//! the include and exclude lists of a distribution archive. Rules follow the
//! gitignore conventions the archive format needs: wildcards, root anchors,
//! directory-only rules and `!` negation.

pub mod checker;
pub mod filter;
pub mod manifest;
pub mod matcher;
pub mod parser;

// Re-export commonly used items
pub use checker::{IgnoreChecker, IgnoreResult};
pub use filter::{DistignoreFilter, EntryError, ExcludedPath, Traversal, TraversalState};
pub use manifest::{FileScan, Manifest};
pub use matcher::{matches, MatchError, PathMatcher};
pub use parser::{IgnoreRule, RuleFile, DEFAULT_IGNORE_FILE};
