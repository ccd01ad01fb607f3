//! Project version discovery
//!
//! Versions are looked up in this order:
//! 1. a `Version:` header in `style.css` (themes)
//! 2. a `@version` tag or `Version:` property in a doc block of a top-level
//!    `*.php` file (plugins)
//! 3. the `version` field of `composer.json`
//!
//! Alpha versions built from a git checkout get the short commit hash
//! appended.

use regex::Regex;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::process::Command;

/// Only the head of a file is searched for headers
const HEADER_BYTES: u64 = 5000;

/// Discover the version of the project in `source_dir`
pub fn discover_version(source_dir: &Path) -> Option<String> {
    let version = theme_version(source_dir)
        .or_else(|| plugin_version(source_dir))
        .or_else(|| composer_version(source_dir))?;

    if version.to_lowercase().contains("-alpha") && source_dir.join(".git").is_dir() {
        if let Some(hash) = short_commit_hash(source_dir) {
            tracing::debug!("Appending commit {} to alpha version {}", hash, version);
            return Some(format!("{}-{}", version, hash));
        }
    }

    Some(version)
}

fn theme_version(source_dir: &Path) -> Option<String> {
    let path = source_dir.join("style.css");
    if !path.is_file() {
        return None;
    }
    let head = read_head(&path)?.replace('\r', "\n");

    let header = Regex::new(r"(?mi)^[ \t/*#@]*Version:(.*)$").ok()?;
    let trailing = Regex::new(r"\s*(?:\*/|\?>).*").ok()?;

    let raw = header.captures(&head)?.get(1)?.as_str();
    let version = trailing.replace(raw, "").trim().to_string();
    (!version.is_empty()).then_some(version)
}

fn plugin_version(source_dir: &Path) -> Option<String> {
    let pattern = source_dir.join("*.php");
    let files = glob::glob(&pattern.to_string_lossy()).ok()?;

    for file in files.flatten() {
        let Some(head) = read_head(&file) else {
            continue;
        };
        if let Some(version) = version_in_doc_blocks(&head) {
            tracing::debug!("Found version {} in {}", version, file.display());
            return Some(version);
        }
    }
    None
}

/// First non-empty version tag of the first doc block that declares one
fn version_in_doc_blocks(code: &str) -> Option<String> {
    let block = Regex::new(r"(?s)/\*\*.*?\*/").ok()?;

    for doc in block.find_iter(code) {
        if let Some(version) = doc_block_tag(doc.as_str(), "version") {
            return (!version.is_empty()).then_some(version);
        }
    }
    None
}

/// Value of `tag` in a doc block, as `@tag value` or `Tag: value`
fn doc_block_tag(block: &str, tag: &str) -> Option<String> {
    let documentor = Regex::new(r"@([a-zA-Z0-9\-_\\]+)\s*?(.*)?").ok()?;
    let property = Regex::new(r"\s*\*?\s*(.*?):(.*)").ok()?;

    for line in block.lines() {
        let captures = documentor
            .captures(line)
            .or_else(|| property.captures(line));
        let Some(captures) = captures else {
            continue;
        };
        let name = captures.get(1).map(|m| m.as_str().trim().to_lowercase());
        if name.as_deref() == Some(tag) {
            let value = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
            return Some(value.trim().to_string());
        }
    }
    None
}

fn composer_version(source_dir: &Path) -> Option<String> {
    let path = source_dir.join("composer.json");
    let content = fs::read_to_string(path).ok()?;
    let composer: serde_json::Value = serde_json::from_str(&content).ok()?;
    let version = composer.get("version")?.as_str()?.trim();
    (!version.is_empty()).then(|| version.to_string())
}

fn short_commit_hash(source_dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["log", "--pretty=format:%h", "-n", "1"])
        .current_dir(source_dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (hash.len() == 7).then_some(hash)
}

fn read_head(path: &Path) -> Option<String> {
    let mut buffer = Vec::new();
    File::open(path)
        .ok()?
        .take(HEADER_BYTES)
        .read_to_end(&mut buffer)
        .ok()?;
    Some(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    #[test]
    fn test_theme_version_from_style_css() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(
            temp_dir.path().join("style.css"),
            "/*\nTheme Name: Twenty\nVersion: 2.1.0 */\n",
        )?;
        assert_eq!(discover_version(temp_dir.path()), Some("2.1.0".to_string()));
        Ok(())
    }

    #[test]
    fn test_plugin_version_from_doc_block() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("a-helper.php"), "<?php\n/** Helper */\n")?;
        fs::write(
            temp_dir.path().join("plugin.php"),
            "<?php\n/**\n * Plugin Name: Sample\n * Plugin URI: https://example.com\n * @version 0.3.1\n */\n",
        )?;
        assert_eq!(discover_version(temp_dir.path()), Some("0.3.1".to_string()));
        Ok(())
    }

    #[test]
    fn test_composer_version_is_last_resort() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(
            temp_dir.path().join("composer.json"),
            r#"{"name": "vendor/package", "version": "4.0.0"}"#,
        )?;
        assert_eq!(discover_version(temp_dir.path()), Some("4.0.0".to_string()));
        Ok(())
    }

    #[test]
    fn test_no_version_sources() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("readme.txt"), "Version: 1.0")?;
        assert_eq!(discover_version(temp_dir.path()), None);
        Ok(())
    }

    #[test]
    fn test_doc_block_tag_forms() {
        assert_eq!(
            doc_block_tag("/**\n * Version: 1.0.0\n */", "version"),
            Some("1.0.0".to_string())
        );
        assert_eq!(
            doc_block_tag("/**\n * @version   2.0\n */", "version"),
            Some("2.0".to_string())
        );
        assert_eq!(doc_block_tag("/**\n * @since 1.0\n */", "version"), None);
    }
}
