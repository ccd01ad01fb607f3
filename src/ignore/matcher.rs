//! Rule matching against relative paths
//!
//! Each [`IgnoreRule`] compiles to one regular expression:
//!
//! - every character except `*` is matched literally, `*` matches any run of
//!   characters (path separators included)
//! - root-anchored rules (`/name`) must match from the start of the path;
//!   all other rules, hidden-file rules included, match from the start of any
//!   path segment
//! - a trailing descendant group lets a rule naming a directory also match
//!   everything beneath it
//!
//! [`matches`] is the plain any-match evaluator. Ordered negation is handled
//! by [`IgnoreChecker`](crate::ignore::checker::IgnoreChecker).

use crate::core::types::RelativePath;
use crate::ignore::parser::IgnoreRule;
use regex::Regex;
use thiserror::Error;

/// A relative path the matcher refuses to evaluate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Invalid relative path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },
}

/// Anything that can decide whether a relative path is ignored
pub trait PathMatcher {
    /// Decide whether `path` is ignored. `is_dir` tells directory-only rules
    /// whether the path itself is a directory.
    fn is_path_ignored(&self, path: &RelativePath, is_dir: bool) -> Result<bool, MatchError>;
}

impl<M: PathMatcher + ?Sized> PathMatcher for &M {
    fn is_path_ignored(&self, path: &RelativePath, is_dir: bool) -> Result<bool, MatchError> {
        (**self).is_path_ignored(path, is_dir)
    }
}

/// An [`IgnoreRule`] with its compiled expression
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: IgnoreRule,
    expression: Regex,
}

impl CompiledRule {
    /// Compile a rule. Returns `None` when the expression cannot be built.
    pub fn compile(rule: IgnoreRule) -> Option<Self> {
        let source = rule_expression(&rule);
        match Regex::new(&source) {
            Ok(expression) => Some(Self { rule, expression }),
            Err(e) => {
                tracing::warn!("Skipping ignore rule `{}`: {}", rule.raw, e);
                None
            },
        }
    }

    /// The source rule
    pub fn rule(&self) -> &IgnoreRule {
        &self.rule
    }

    /// Whether this rule's pattern matches `path`, ignoring negation
    pub fn is_match(&self, path: &str, is_dir: bool) -> bool {
        if self.rule.directory_only && !is_dir {
            // A file only falls under a directory-only rule through one of
            // its ancestors, which are all directories.
            return match parent(path) {
                Some(parent) => self.expression.is_match(parent),
                None => false,
            };
        }
        self.expression.is_match(path)
    }
}

/// Compile a rule list, dropping rules whose expression fails to build
pub fn compile_rules(rules: &[IgnoreRule]) -> Vec<CompiledRule> {
    rules
        .iter()
        .cloned()
        .filter_map(CompiledRule::compile)
        .collect()
}

/// Any-match evaluation: true on the first matching non-negation rule.
///
/// Pure for a fixed rule list. Negation rules never ignore anything here.
pub fn matches(path: &RelativePath, is_dir: bool, rules: &[CompiledRule]) -> Result<bool, MatchError> {
    validate(path)?;
    Ok(rules
        .iter()
        .filter(|compiled| !compiled.rule.negated)
        .any(|compiled| compiled.is_match(path.as_str(), is_dir)))
}

/// Reject paths that cannot name anything below the source root
pub fn validate(path: &RelativePath) -> Result<(), MatchError> {
    let invalid = |reason| {
        Err(MatchError::InvalidPath {
            path: path.as_str().to_string(),
            reason,
        })
    };

    let text = path.as_str();
    if text.contains('\0') {
        return invalid("contains a NUL byte");
    }

    let trimmed = text.trim_start_matches(RelativePath::SEPARATOR);
    if trimmed.is_empty() {
        return Ok(());
    }
    for segment in trimmed.trim_end_matches(RelativePath::SEPARATOR).split(RelativePath::SEPARATOR) {
        match segment {
            "" => return invalid("contains an empty segment"),
            "." | ".." => return invalid("contains a relative segment"),
            _ => {},
        }
    }
    Ok(())
}

fn rule_expression(rule: &IgnoreRule) -> String {
    let body = rule
        .pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    let start = if rule.root_anchored { "^/" } else { "(?:^|/)" };

    format!("{}{}(?:/.*)?$", start, body)
}

fn parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches(RelativePath::SEPARATOR);
    match trimmed.rfind(RelativePath::SEPARATOR) {
        Some(0) | None => None,
        Some(index) => Some(&trimmed[..index]),
    }
}
