//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::config::RenderStyle;

/// Inspect nested JSON documents as pytrees: leaves, counts and shape skeletons
#[derive(Parser, Debug)]
#[command(name = "pytree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file to use instead of ./.pytree.toml
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Gradient switches shared by the document commands; the last one given wins.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradArgs {
    /// Include gradients of tracked leaves
    #[arg(short, long, overrides_with = "no_grad")]
    pub grad: bool,
    /// Exclude gradients of tracked leaves, even when the config includes them
    #[arg(long, overrides_with = "grad")]
    pub no_grad: bool,
}

impl GradArgs {
    /// Explicit choice from the command line, `None` to defer to settings.
    pub fn choice(&self) -> Option<bool> {
        match (self.grad, self.no_grad) {
            (_, true) => Some(false),
            (true, false) => Some(true),
            (false, false) => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the shape of a document with every leaf shown as `*`
    Spec {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(flatten)]
        grad: GradArgs,
        /// Output style (default from config)
        #[arg(short, long, value_enum)]
        style: Option<RenderStyle>,
    },

    /// Print every leaf in flattening order
    Leaves {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(flatten)]
        grad: GradArgs,
    },

    /// Print the number of leaves
    Count {
        /// JSON document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(flatten)]
        grad: GradArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print a commented config template
    Template,
    /// Show config file locations
    Path,
}
