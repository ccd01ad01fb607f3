//! Core data types for dist-archive

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A `/`-separated path relative to the source directory, always written
/// with a leading `/` (`/frontend/build/output.js`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(String);

impl RelativePath {
    /// Separator used in every relative path regardless of platform
    pub const SEPARATOR: char = '/';

    /// Create a relative path from a string, adding the leading `/` if absent
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = path.as_ref();
        if path.starts_with(Self::SEPARATOR) {
            RelativePath(path.to_string())
        } else {
            RelativePath(format!("/{}", path))
        }
    }

    /// Build the relative path of `path` below `root`.
    ///
    /// Returns `None` when `path` is not below `root` or a component is not
    /// valid UTF-8.
    pub fn from_path(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let mut out = String::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    out.push(Self::SEPARATOR);
                    out.push_str(name.to_str()?);
                },
                Component::CurDir => {},
                _ => return None,
            }
        }
        if out.is_empty() {
            out.push(Self::SEPARATOR);
        }
        Some(RelativePath(out))
    }

    /// The path as a string slice, leading `/` included
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path without its leading `/`
    pub fn without_leading_separator(&self) -> &str {
        self.0.trim_start_matches(Self::SEPARATOR)
    }

    /// Whether the path, trimmed of leading and trailing separators, is a
    /// single segment (`/node_modules`, `/.git/`)
    pub fn is_single_segment(&self) -> bool {
        !self.0.trim_matches(Self::SEPARATOR).contains(Self::SEPARATOR)
    }

    /// Append a child segment
    pub fn join(&self, name: &str) -> Self {
        RelativePath(format!(
            "{}/{}",
            self.0.trim_end_matches(Self::SEPARATOR),
            name
        ))
    }

    /// Every strict ancestor directory, nearest first, excluding the root `/`
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        let path = self.0.as_str();
        path.match_indices(Self::SEPARATOR)
            .map(|(index, _)| index)
            .filter(|&index| index > 0)
            .rev()
            .map(move |index| &path[..index])
    }

    /// Location of this path below `root` on the local filesystem
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        self.without_leading_separator()
            .split(Self::SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RelativePath({})", self.0)
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RelativePath {
    fn from(path: &str) -> Self {
        RelativePath::new(path)
    }
}

impl Serialize for RelativePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RelativePath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let path = String::deserialize(deserializer)?;
        Ok(RelativePath::new(path))
    }
}

/// A filesystem node visited during one traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Absolute path as reached through the walk (symlinks not resolved)
    pub path: PathBuf,
    /// Path relative to the source root
    pub relative: RelativePath,
    /// Whether the entry is (or points to) a directory
    pub is_dir: bool,
    /// Whether the entry itself is a symbolic link
    pub is_symlink: bool,
    /// Canonical path, when it could be resolved
    pub real_path: Option<PathBuf>,
    /// Ignored status as decided by the matcher
    pub ignored: bool,
}

/// One line of a manifest's include list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the source root
    pub path: RelativePath,
    /// Whether the path is a directory
    pub is_dir: bool,
}

/// Archive format produced by the archive invoker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// `.zip` archive built with `zip`
    #[default]
    Zip,
    /// `.tar.gz` archive built with `tar`
    Targz,
}

impl ArchiveFormat {
    /// File extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => ".zip",
            ArchiveFormat::Targz => ".tar.gz",
        }
    }

    /// Parse a format name as written in configuration
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "zip" => Some(ArchiveFormat::Zip),
            "targz" | "tar.gz" => Some(ArchiveFormat::Targz),
            _ => None,
        }
    }

    /// Name as written in configuration
    pub fn name(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Targz => "targz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_normalizes_leading_separator() {
        assert_eq!(RelativePath::new("a/b").as_str(), "/a/b");
        assert_eq!(RelativePath::new("/a/b").as_str(), "/a/b");
        assert_eq!(RelativePath::new("/a/b").without_leading_separator(), "a/b");
    }

    #[test]
    fn test_single_segment() {
        assert!(RelativePath::new("/node_modules").is_single_segment());
        assert!(RelativePath::new("/node_modules/").is_single_segment());
        assert!(!RelativePath::new("/src/node_modules").is_single_segment());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let path = RelativePath::new("/a/b/c.txt");
        let ancestors: Vec<_> = path.ancestors().collect();
        assert_eq!(ancestors, vec!["/a/b", "/a"]);
        assert_eq!(RelativePath::new("/top").ancestors().count(), 0);

        let sibling_path = RelativePath::new("/foobar/x");
        let sibling: Vec<_> = sibling_path.ancestors().collect();
        assert!(!sibling.contains(&"/foo"));
    }

    #[test]
    fn test_from_path() {
        let root = Path::new("/project");
        let rel = RelativePath::from_path(root, Path::new("/project/src/lib.rs"));
        assert_eq!(rel, Some(RelativePath::new("/src/lib.rs")));
        assert_eq!(RelativePath::from_path(root, Path::new("/other")), None);
    }

    #[test]
    fn test_archive_format_names() {
        assert_eq!(ArchiveFormat::from_name("tar.gz"), Some(ArchiveFormat::Targz));
        assert_eq!(ArchiveFormat::from_name("ZIP"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_name("rar"), None);
        assert_eq!(ArchiveFormat::Targz.extension(), ".tar.gz");
    }
}
