//! Ordered, negation-aware ignore checking for one source directory

use crate::core::error::Result;
use crate::core::types::RelativePath;
use crate::ignore::matcher::{self, compile_rules, CompiledRule, MatchError, PathMatcher};
use crate::ignore::parser::{IgnoreRule, RuleFile};
use std::path::Path;

/// Result of ignore checking
#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreResult {
    /// Path should be ignored
    Ignored(String), // Rule that ignored it
    /// Path should be included
    Included,
    /// Path would be ignored but is explicitly included by a negation rule
    IncludedByNegation(String), // Rule that included it
}

impl IgnoreResult {
    /// Whether the path ends up ignored
    pub fn is_ignored(&self) -> bool {
        matches!(self, IgnoreResult::Ignored(_))
    }
}

/// Ignore checker over the rules of one rule file.
///
/// Rules are evaluated in file order and the last matching rule wins, so a
/// later `!rule` re-includes what an earlier rule ignored.
#[derive(Debug, Clone)]
pub struct IgnoreChecker {
    /// Compiled rules in file order
    rules: Vec<CompiledRule>,
    /// Whether any rule is a negation
    has_negations: bool,
}

impl IgnoreChecker {
    /// Create a checker from parsed rules
    pub fn new(rules: &[IgnoreRule]) -> Self {
        let rules = compile_rules(rules);
        let has_negations = rules.iter().any(|r| r.rule().negated);
        Self {
            rules,
            has_negations,
        }
    }

    /// Load the rule file of `source_dir` and build a checker from it
    pub fn from_source_dir(source_dir: &Path, file_name: &str) -> Result<(Self, RuleFile)> {
        let rule_file = RuleFile::load(source_dir, file_name)?;
        Ok((Self::new(rule_file.rules()), rule_file))
    }

    /// Check a path and report which rule decided its status
    pub fn check(&self, path: &RelativePath, is_dir: bool) -> std::result::Result<IgnoreResult, MatchError> {
        matcher::validate(path)?;

        let mut result = IgnoreResult::Included;
        for compiled in &self.rules {
            if !compiled.is_match(path.as_str(), is_dir) {
                continue;
            }
            let rule = compiled.rule();
            result = if !rule.negated {
                IgnoreResult::Ignored(rule.raw.clone())
            } else if result.is_ignored() {
                IgnoreResult::IncludedByNegation(rule.raw.clone())
            } else {
                IgnoreResult::Included
            };
        }

        Ok(result)
    }

    /// Number of active rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no active rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl PathMatcher for IgnoreChecker {
    fn is_path_ignored(&self, path: &RelativePath, is_dir: bool) -> std::result::Result<bool, MatchError> {
        if !self.has_negations {
            return matcher::matches(path, is_dir, &self.rules);
        }
        self.check(path, is_dir).map(|result| result.is_ignored())
    }
}
