//! Command-line interface for dist-archive

use crate::core::types::ArchiveFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod context;
pub mod interactive;

/// dist-archive - Create distribution archives honoring .distignore
#[derive(Parser)]
#[command(
    name = "dist-archive",
    version,
    about = "Create a distribution archive of a project, honoring its .distignore file",
    long_about = "dist-archive packages a project directory into a zip or tar.gz archive. Paths matched by the rules in the project's .distignore file are left out; rules follow gitignore conventions including wildcards, root anchors, directory-only rules and ! negation."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Auto-answer yes to all prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a distribution archive
    Create {
        /// Project directory to package
        path: PathBuf,

        /// Destination directory, or archive file path ending in zip, tar or tar.gz
        target: Option<PathBuf>,

        /// Create the destination directory when it does not exist
        #[arg(long)]
        create_target_dir: bool,

        /// Replace an existing archive without asking
        #[arg(short, long)]
        force: bool,

        /// Directory name the archive extracts to
        #[arg(long)]
        plugin_dirname: Option<String>,

        /// Archive format
        #[arg(long, value_enum)]
        format: Option<ArchiveFormat>,

        /// Archive file stem, with {name} and {version} placeholders
        #[arg(long)]
        filename_format: Option<String>,
    },

    /// List the files an archive would contain
    List {
        /// Project directory
        path: PathBuf,

        /// List the excluded paths instead
        #[arg(long)]
        excluded: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get and set configuration values
    Config {
        /// Configuration key to get/set
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,

        /// Unset a configuration value
        #[arg(long)]
        unset: bool,

        /// Show configuration file location
        #[arg(long)]
        show_origin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_with_options() {
        let cli = Cli::parse_from([
            "dist-archive",
            "create",
            "./plugin",
            "dist/",
            "--format",
            "targz",
            "--plugin-dirname",
            "renamed",
            "--force",
        ]);

        match cli.command {
            Commands::Create {
                path,
                target,
                format,
                plugin_dirname,
                force,
                ..
            } => {
                assert_eq!(path, PathBuf::from("./plugin"));
                assert_eq!(target, Some(PathBuf::from("dist/")));
                assert_eq!(format, Some(ArchiveFormat::Targz));
                assert_eq!(plugin_dirname.as_deref(), Some("renamed"));
                assert!(force);
            },
            _ => panic!("Expected create command"),
        }
    }
}
