//! External `zip` and `tar` invocation

use crate::core::error::{DistArchiveError, Result};
use crate::core::types::ArchiveFormat;
use crate::ignore::manifest::Manifest;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

/// A ready-to-run archive command
#[derive(Debug)]
pub struct ArchiveCommand {
    program: &'static str,
    args: Vec<String>,
    working_dir: PathBuf,
    /// Include or exclude list referenced by `args`, kept alive until run
    list_file: Option<NamedTempFile>,
}

impl ArchiveCommand {
    /// Archive all of `dir` into `archive_path`
    pub fn whole_tree(format: ArchiveFormat, dir: &Path, archive_path: &Path) -> Result<Self> {
        let (working_dir, dir_name) = split_dir(dir)?;
        let archive = archive_path.to_string_lossy().into_owned();

        let (program, args) = match format {
            ArchiveFormat::Zip => ("zip", vec!["-r".to_string(), archive, dir_name]),
            ArchiveFormat::Targz => ("tar", vec!["-zcf".to_string(), archive, dir_name]),
        };

        Ok(Self {
            program,
            args,
            working_dir,
            list_file: None,
        })
    }

    /// Archive `dir` in place, restricted by `manifest`.
    ///
    /// zip receives the include list; tar receives the exclude list.
    pub fn filtered(
        format: ArchiveFormat,
        dir: &Path,
        archive_path: &Path,
        manifest: &Manifest,
    ) -> Result<Self> {
        let (working_dir, dir_name) = split_dir(dir)?;
        let archive = archive_path.to_string_lossy().into_owned();
        let mut list_file = NamedTempFile::new()?;

        let (program, args) = match format {
            ArchiveFormat::Zip => {
                for entry in manifest.include_list() {
                    writeln!(list_file, "{}{}", dir_name, entry.path)?;
                }
                let list = format!("-i@{}", list_file.path().display());
                (
                    "zip",
                    vec![
                        "--filesync".to_string(),
                        "-r".to_string(),
                        archive,
                        dir_name,
                        list,
                    ],
                )
            },
            ArchiveFormat::Targz => {
                for path in manifest.exclude_list() {
                    writeln!(list_file, "{}", escape_tar_pattern(&format!("{}{}", dir_name, path)))?;
                }
                let mut args = Vec::new();
                if cfg!(target_os = "linux") {
                    args.push("--anchored".to_string());
                }
                args.push(format!("--exclude-from={}", list_file.path().display()));
                args.extend(["-zcf".to_string(), archive, dir_name]);
                ("tar", args)
            },
        };
        list_file.flush()?;

        Ok(Self {
            program,
            args,
            working_dir,
            list_file: Some(list_file),
        })
    }

    /// Executable name
    pub fn program(&self) -> &str {
        self.program
    }

    /// Arguments passed to the executable
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Directory the command runs in
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Contents of the include or exclude list file, if any
    pub fn list_contents(&self) -> Result<Option<String>> {
        match &self.list_file {
            Some(file) => Ok(Some(fs::read_to_string(file.path())?)),
            None => Ok(None),
        }
    }

    /// Command line for logs and error messages
    pub fn display(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }

    /// Run the command, failing with its stderr on a non-zero exit
    pub fn run(&self) -> Result<()> {
        tracing::info!("Running `{}` in {}", self.display(), self.working_dir.display());

        let output = Command::new(self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|e| DistArchiveError::ArchiveCommandFailed {
                command: self.display(),
                output: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let text = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(DistArchiveError::ArchiveCommandFailed {
                command: self.display(),
                output: text,
            });
        }

        tracing::debug!("{}", String::from_utf8_lossy(&output.stdout).trim());
        Ok(())
    }
}

/// Escape tar's glob metacharacters so excludes match literally
pub fn escape_tar_pattern(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn split_dir(dir: &Path) -> Result<(PathBuf, String)> {
    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| DistArchiveError::internal(format!("{} has no directory name", dir.display())))?;
    let parent = dir
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| DistArchiveError::internal(format!("{} has no parent", dir.display())))?;
    Ok((parent, name))
}
