//! `pith` command-line entry point.

mod cli;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use pith::PithConfig;
use pith::config::Overrides;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    pith::logger::set_verbose(cli.verbose);

    let config = PithConfig::load(&cli.config, Overrides::from(cli.pipeline_args()))?;

    match &cli.command {
        Commands::Check { .. } => cli::check::check(&config),
        Commands::Resolve {
            family, tags, json, ..
        } => cli::resolve::resolve(&config, *family, tags, *json),
        Commands::Build { .. } => cli::build::build(&config),
    }
}
