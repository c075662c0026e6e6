use std::io;
use std::path::Path;

use clap::CommandFactory;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands, GradArgs};
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, RenderStyle, Settings};
use crate::document::load_document;
use crate::domain::PyTree;
use crate::errors::AppError;
use crate::flatten::tree_structure;
use crate::inplace::tree_map_;
use crate::pprint::treespec_pprint;
use crate::tree_traits::TreeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Spec { file, grad, style }) => {
            let settings = Settings::load(cli.config.as_deref())?;
            _spec(
                file,
                include_gradient_leaves(grad, &settings),
                style.unwrap_or(settings.style),
            )
        }
        Some(Commands::Leaves { file, grad }) => {
            let settings = Settings::load(cli.config.as_deref())?;
            _leaves(file, include_gradient_leaves(grad, &settings))
        }
        Some(Commands::Count { file, grad }) => {
            let settings = Settings::load(cli.config.as_deref())?;
            _count(file, include_gradient_leaves(grad, &settings))
        }
        Some(Commands::Config { command }) => _config(command, cli.config.as_deref()),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "pytree", &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

/// Command-line flags win over the configured default in either direction.
fn include_gradient_leaves(grad: &GradArgs, settings: &Settings) -> bool {
    grad.choice().unwrap_or(settings.include_gradient_leaves)
}

/// Render the spec of `tree` in the requested style.
pub fn render_spec(
    tree: &PyTree<Value>,
    include_gradient_leaves: bool,
    style: RenderStyle,
) -> CliResult<String> {
    let spec = tree_structure(tree, include_gradient_leaves);
    let rendered = match style {
        RenderStyle::Repr => treespec_pprint(&spec)?,
        RenderStyle::Tree => spec.to_tree_string().to_string().trim_end().to_string(),
        RenderStyle::Json => spec.to_json().map_err(AppError::from)?,
    };
    Ok(rendered)
}

/// One line per leaf, collected by the mapper's side effect.
pub fn leaf_lines(tree: &mut PyTree<Value>, include_gradient_leaves: bool) -> Vec<String> {
    let mut lines = Vec::new();
    tree_map_(
        |leaf: &mut Value| lines.push(leaf.to_string()),
        tree,
        include_gradient_leaves,
    );
    lines
}

#[instrument]
fn _spec(file: &Path, grad: bool, style: RenderStyle) -> CliResult<()> {
    let tree = load_document(file)?;
    let rendered = render_spec(&tree, grad, style)?;
    output::info(&rendered);
    Ok(())
}

#[instrument]
fn _leaves(file: &Path, grad: bool) -> CliResult<()> {
    let mut tree = load_document(file)?;
    let lines = leaf_lines(&mut tree, grad);
    debug!(count = lines.len(), "printing leaves");
    for line in lines {
        output::info(&line);
    }
    Ok(())
}

#[instrument]
fn _count(file: &Path, grad: bool) -> CliResult<()> {
    let tree = load_document(file)?;
    output::info(&tree_structure(&tree, grad).num_leaves());
    Ok(())
}

#[instrument]
fn _config(command: &ConfigCommands, local: Option<&Path>) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(local)?;
            output::header("Effective settings");
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Template => output::info(Settings::template().trim_end()),
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unavailable)".to_string());
            output::action("global", &global);
            let local = local.map(Path::to_path_buf).unwrap_or_else(local_config_path);
            output::action("local", &local.display());
        }
    }
    Ok(())
}
