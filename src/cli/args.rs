//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand};
use pith::AssetFamily;
use pith::config::Overrides;

/// Tag-based asset pipeline
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Manifest path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = "pith.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate the manifest and check every registered file exists
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        args: PipelineArgs,
    },

    /// Print the deliverable paths for a set of tags
    #[command(visible_alias = "r")]
    Resolve {
        /// Asset family (script, style, file)
        family: AssetFamily,

        /// Tag names, in output order
        #[arg(required = true)]
        tags: Vec<String>,

        /// Print a JSON object instead of one path per line
        #[arg(short, long)]
        json: bool,

        #[command(flatten)]
        args: PipelineArgs,
    },

    /// Generate every declared bundle into the output directory
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: PipelineArgs,
    },
}

/// Manifest overrides shared by every command.
#[derive(clap::Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Bundle and minify scripts and stylesheets
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub compress: Option<bool>,

    /// Recompute every resolution instead of caching it
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub debug: Option<bool>,
}

impl From<&PipelineArgs> for Overrides {
    fn from(args: &PipelineArgs) -> Self {
        Self {
            compress: args.compress,
            debug: args.debug,
        }
    }
}

impl Cli {
    pub fn pipeline_args(&self) -> &PipelineArgs {
        match &self.command {
            Commands::Check { args } | Commands::Resolve { args, .. } | Commands::Build { args } => args,
        }
    }
}
