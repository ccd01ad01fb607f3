//! Archive location and naming

use crate::archive::version::discover_version;
use crate::core::error::{DistArchiveError, Result};
use crate::core::types::ArchiveFormat;
use std::fs;
use std::path::{Path, PathBuf};

/// Default archive file stem template
pub const DEFAULT_FILENAME_FORMAT: &str = "{name}.{version}";

/// What the user asked for
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    /// Project directory to package
    pub source: PathBuf,
    /// Destination directory, or archive file path ending in zip/tar/tar.gz
    pub target: Option<PathBuf>,
    /// Create the destination directory when missing
    pub create_target_dir: bool,
    /// Directory name the archive extracts to
    pub plugin_dirname: Option<String>,
    /// Archive format
    pub format: ArchiveFormat,
    /// File stem template with `{name}` and `{version}`
    pub filename_format: String,
}

impl ArchiveRequest {
    /// Request with default options for `source`
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: None,
            create_target_dir: false,
            plugin_dirname: None,
            format: ArchiveFormat::default(),
            filename_format: DEFAULT_FILENAME_FORMAT.to_string(),
        }
    }
}

/// Resolved paths and names for one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTarget {
    /// Canonical project directory
    pub source_dir: PathBuf,
    /// Canonical directory the archive is written to
    pub destination_dir: PathBuf,
    /// Archive file name
    pub file_name: String,
    /// Directory name the archive extracts to
    pub output_dir_name: String,
    /// Archive format
    pub format: ArchiveFormat,
}

impl ArchiveTarget {
    /// Resolve a request; relative destinations are taken against `cwd`
    pub fn resolve(request: &ArchiveRequest, cwd: &Path) -> Result<Self> {
        let source_dir = dunce::canonicalize(&request.source)
            .ok()
            .filter(|path| path.is_dir())
            .ok_or_else(|| DistArchiveError::not_a_directory(request.source.clone()))?;

        let source_parent = source_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| source_dir.clone());

        let (destination, file_name) = match &request.target {
            Some(target) if names_archive_file(target) => {
                let file_name = target
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .ok_or_else(|| DistArchiveError::internal("Archive target has no file name"))?;
                let destination = match target.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => source_parent.clone(),
                };
                (destination, Some(file_name))
            },
            Some(target) => (target.clone(), None),
            None => (source_parent.clone(), None),
        };

        let destination = if destination.is_absolute() {
            destination
        } else {
            cwd.join(destination)
        };

        if request.create_target_dir && !destination.is_dir() {
            tracing::info!("Creating target directory {}", destination.display());
            fs::create_dir_all(&destination)?;
        }

        let destination_dir = dunce::canonicalize(&destination)
            .ok()
            .filter(|path| path.is_dir())
            .ok_or(DistArchiveError::TargetDirectoryNotFound { path: destination })?;

        let output_dir_name = match &request.plugin_dirname {
            Some(name) => name.trim_end_matches('/').to_string(),
            None => source_dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        let file_name = match file_name {
            Some(name) => name,
            None => {
                let stem = match discover_version(&source_dir) {
                    Some(version) => request
                        .filename_format
                        .replace("{name}", &output_dir_name)
                        .replace("{version}", &version),
                    None => output_dir_name.clone(),
                };
                format!("{}{}", stem, request.format.extension())
            },
        };

        Ok(Self {
            source_dir,
            destination_dir,
            file_name,
            output_dir_name,
            format: request.format,
        })
    }

    /// Full path of the archive file
    pub fn archive_path(&self) -> PathBuf {
        self.destination_dir.join(&self.file_name)
    }

    /// Whether the source directory's own name differs from the extract name
    pub fn renames_source(&self) -> bool {
        self.source_dir
            .file_name()
            .map(|name| name.to_string_lossy() != self.output_dir_name.as_str())
            .unwrap_or(true)
    }
}

fn names_archive_file(target: &Path) -> bool {
    let text = target.to_string_lossy();
    ["zip", "tar", "tar.gz"]
        .iter()
        .any(|suffix| text.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    fn project(temp_dir: &TempDir, name: &str) -> Result<PathBuf> {
        let path = temp_dir.path().join(name);
        fs::create_dir_all(&path)?;
        Ok(dunce::canonicalize(path)?)
    }

    #[test]
    fn test_defaults_to_parent_directory_and_project_name() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let source = project(&temp_dir, "hello-world")?;

        let target = ArchiveTarget::resolve(&ArchiveRequest::new(&source), temp_dir.path())?;

        assert_eq!(target.destination_dir, dunce::canonicalize(temp_dir.path())?);
        assert_eq!(target.file_name, "hello-world.zip");
        assert_eq!(target.output_dir_name, "hello-world");
        assert!(!target.renames_source());
        Ok(())
    }

    #[test]
    fn test_version_fills_filename_format() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let source = project(&temp_dir, "hello-world")?;
        fs::write(
            source.join("hello-world.php"),
            "<?php\n/**\n * Plugin Name: Hello World\n * Version: 1.2.3\n */\n",
        )?;

        let mut request = ArchiveRequest::new(&source);
        request.format = ArchiveFormat::Targz;
        let target = ArchiveTarget::resolve(&request, temp_dir.path())?;
        assert_eq!(target.file_name, "hello-world.1.2.3.tar.gz");

        request.filename_format = "{name}-v{version}".to_string();
        let target = ArchiveTarget::resolve(&request, temp_dir.path())?;
        assert_eq!(target.file_name, "hello-world-v1.2.3.tar.gz");
        Ok(())
    }

    #[test]
    fn test_bare_file_name_goes_next_to_source() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let source = project(&temp_dir, "plugin")?;

        let mut request = ArchiveRequest::new(&source);
        request.target = Some(PathBuf::from("custom.zip"));
        let target = ArchiveTarget::resolve(&request, Path::new("/"))?;

        assert_eq!(target.file_name, "custom.zip");
        assert_eq!(target.destination_dir, dunce::canonicalize(temp_dir.path())?);
        Ok(())
    }

    #[test]
    fn test_relative_target_directory_uses_cwd_and_can_be_created() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let source = project(&temp_dir, "plugin")?;

        let mut request = ArchiveRequest::new(&source);
        request.target = Some(PathBuf::from("dist/out"));
        request.plugin_dirname = Some("renamed/".to_string());

        let missing = ArchiveTarget::resolve(&request, temp_dir.path());
        assert!(matches!(
            missing,
            Err(DistArchiveError::TargetDirectoryNotFound { .. })
        ));

        request.create_target_dir = true;
        let target = ArchiveTarget::resolve(&request, temp_dir.path())?;

        assert!(target.destination_dir.ends_with("dist/out"));
        assert_eq!(target.output_dir_name, "renamed");
        assert_eq!(target.file_name, "renamed.zip");
        assert!(target.renames_source());
        Ok(())
    }

    #[test]
    fn test_source_must_be_a_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x")?;

        let result = ArchiveTarget::resolve(&ArchiveRequest::new(&file), temp_dir.path());
        assert!(matches!(result, Err(DistArchiveError::NotADirectory { .. })));
        Ok(())
    }
}
