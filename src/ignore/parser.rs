//! .distignore file parser

use crate::core::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Default name of the ignore-rule file in a source directory
pub const DEFAULT_IGNORE_FILE: &str = ".distignore";

/// A single active line of an ignore-rule file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    /// The trimmed line as written in the file
    pub raw: String,
    /// Pattern text with the `!`, leading `/` and trailing `/` removed
    pub pattern: String,
    /// Rule starts with `!` and re-includes what it matches
    pub negated: bool,
    /// Rule starts with `/` and only matches at the source root
    pub root_anchored: bool,
    /// Rule ends with `/` and only matches directories
    pub directory_only: bool,
}

impl IgnoreRule {
    /// Parse a single line. Comments, blank lines and a bare `!` or `/`
    /// yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let raw = line.trim();

        if raw.is_empty() || raw.starts_with('#') {
            return None;
        }

        let (negated, rest) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, raw),
        };

        let (root_anchored, rest) = match rest.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };

        let (directory_only, pattern) = match rest.strip_suffix('/') {
            Some(pattern) => (true, pattern),
            None => (false, rest),
        };

        if pattern.is_empty() {
            return None;
        }

        Some(IgnoreRule {
            raw: raw.to_string(),
            pattern: pattern.to_string(),
            negated,
            root_anchored,
            directory_only,
        })
    }
}

/// Parse rule-file content into the active rule set, in file order
pub fn parse_rules(content: &str) -> Vec<IgnoreRule> {
    content.lines().filter_map(IgnoreRule::parse).collect()
}

/// The ignore-rule file of one source directory
#[derive(Debug, Clone)]
pub struct RuleFile {
    /// Where the rule file is (or would be)
    path: PathBuf,
    /// Active rules, empty when the file is missing
    rules: Vec<IgnoreRule>,
    /// Whether the file existed
    found: bool,
}

impl RuleFile {
    /// Load `file_name` from `source_dir`. A missing file is not an error:
    /// the rule set is empty and every path is included.
    pub fn load(source_dir: &Path, file_name: &str) -> Result<Self> {
        let path = source_dir.join(file_name);

        if !path.is_file() {
            return Ok(Self {
                path,
                rules: Vec::new(),
                found: false,
            });
        }

        let content = fs::read_to_string(&path)?;
        let rules = parse_rules(&content);
        tracing::debug!(
            "Loaded {} rules from {}",
            rules.len(),
            path.display()
        );

        Ok(Self {
            path,
            rules,
            found: true,
        })
    }

    /// Build a rule file from in-memory content
    pub fn from_content(path: PathBuf, content: &str) -> Self {
        Self {
            path,
            rules: parse_rules(content),
            found: true,
        }
    }

    /// Active rules in file order
    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    /// Whether the rule file existed on disk
    pub fn found(&self) -> bool {
        self.found
    }

    /// Whether there are no active rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Path of the rule file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
