//! dist-archive CLI
//!
//! Command-line interface for creating distribution archives.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use dist_archive::cli::context::CliContext;
use dist_archive::cli::{commands, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides the verbosity flag
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    CliContext::set(CliContext {
        verbose: cli.verbose,
        quiet: cli.quiet,
        yes: cli.yes,
        non_interactive: !atty::is(atty::Stream::Stdin),
    });

    match cli.command {
        Commands::Create {
            path,
            target,
            create_target_dir,
            force,
            plugin_dirname,
            format,
            filename_format,
        } => commands::create::execute(
            path,
            target,
            create_target_dir,
            force,
            plugin_dirname,
            format,
            filename_format,
        ),
        Commands::List {
            path,
            excluded,
            json,
        } => commands::list::execute(path, excluded, json),
        Commands::Config {
            key,
            value,
            list,
            unset,
            show_origin,
            json,
        } => commands::config::execute(key, value, list, unset, show_origin, json),
        Commands::Completion { shell } => commands::completion::execute(shell),
    }
}
