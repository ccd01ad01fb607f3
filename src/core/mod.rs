//! Core types and utilities for dist-archive
//!
//! This module contains the fundamental data types and error handling
//! used throughout the system.

pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{DistArchiveError, Result};
pub use types::{ArchiveFormat, ManifestEntry, PathEntry, RelativePath};
