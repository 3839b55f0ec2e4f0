//! `preload` command-line entry point.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use preload::cli::{self, Cli, Commands};
use preload::config::PreloadConfig;
use preload::{logger, serve};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    serve::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = PreloadConfig::load(&cli)?;

    match &cli.command {
        Commands::Generate { args } => cli::generate::run(&config, args),
        Commands::Extract { args } => cli::extract::run(args),
        Commands::Serve { .. } => serve::run(&config.serve),
    }
}
