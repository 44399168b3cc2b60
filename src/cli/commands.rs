//! Command dispatch: every subcommand loads its input, runs the domain
//! operation and prints through [`crate::cli::output`].

use std::fmt::Display;
use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{
    format_levels, format_sequence, format_traversal, load_binary_tree, load_graph,
    load_nary_tree, TreeRender,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{
    build_example_tree, complete_tree, BinaryTree, NodeArena, NodeId, ReverseBackwardTraversal,
    TraversalMethod, TraversalOrder,
};

/// Loads the layered settings, then runs the parsed command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config_file.as_deref())?;
    run_command(cli, &settings)
}

/// Runs the parsed command with already resolved settings.
pub fn run_command(cli: &Cli, settings: &Settings) -> CliResult<()> {
    if !settings.display.color {
        output::disable_color();
    }

    match &cli.command {
        Some(Commands::Binary { file, orders }) => cmd_binary(settings, file, orders),
        Some(Commands::Mirror { file }) => cmd_mirror(file),
        Some(Commands::Nary {
            file,
            method,
            by_depth,
        }) => cmd_nary(settings, file, method.as_deref(), *by_depth),
        Some(Commands::Graph { file }) => cmd_graph(file),
        Some(Commands::Show { file, nary }) => cmd_show(file, *nary),
        Some(Commands::Demo) => cmd_demo(settings),
        Some(Commands::Config { command }) => cmd_config(settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

/// Orders given on the command line win over the configured ones.
fn resolve_orders(settings: &Settings, orders: &[String]) -> CliResult<Vec<TraversalOrder>> {
    if orders.is_empty() {
        return Ok(settings.orders()?);
    }
    orders
        .iter()
        .map(|name| name.parse::<TraversalOrder>().map_err(CliError::from))
        .collect()
}

fn resolve_method(settings: &Settings, method: Option<&str>) -> CliResult<TraversalMethod> {
    match method {
        Some(name) => Ok(name.parse()?),
        None => Ok(settings.traversal.method),
    }
}

fn print_binary_traversals<T: Clone + Display>(tree: &BinaryTree<T>, orders: &[TraversalOrder]) {
    for &order in orders {
        output::labelled(order.name(), &format_traversal(&tree.traverse(order)));
    }
}

fn print_post_order<T: Clone + Display>(
    arena: &NodeArena<T>,
    root: Option<NodeId>,
    method: TraversalMethod,
    by_depth: bool,
) -> CliResult<()> {
    let traversal = ReverseBackwardTraversal::new(arena);
    if by_depth {
        output::labelled("by-depth", &format_levels(&traversal.traverse_by_depth(root)?));
    } else {
        let mut values = Vec::new();
        traversal.traverse_with_callback(root, |value: &T| values.push(value.clone()), method)?;
        output::labelled(&method.to_string(), &format_sequence(&values));
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_binary(settings: &Settings, file: &Path, orders: &[String]) -> CliResult<()> {
    let orders = resolve_orders(settings, orders)?;
    let tree = load_binary_tree(file)?;
    debug!("{} nodes, height {}", tree.len(), tree.height());

    if settings.display.tree {
        output::info(&tree.to_tree_string());
    }
    print_binary_traversals(&tree, &orders);
    Ok(())
}

#[instrument]
fn cmd_mirror(file: &Path) -> CliResult<()> {
    let mut tree = load_binary_tree(file)?;

    output::header("original");
    output::info(&tree.to_tree_string());
    tree.mirror();
    output::header("mirrored");
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_nary(settings: &Settings, file: &Path, method: Option<&str>, by_depth: bool) -> CliResult<()> {
    let method = resolve_method(settings, method)?;
    let arena = load_nary_tree(file)?;
    debug!("{} nodes, depth {}", arena.len(), arena.depth());

    if settings.display.tree {
        output::info(&arena.to_tree_string());
    }
    print_post_order(&arena, arena.root(), method, by_depth)
}

#[instrument]
fn cmd_graph(file: &Path) -> CliResult<()> {
    let mut loaded = load_graph(file)?;

    let value = loaded.graph.forward_pass(&loaded.inputs, &loaded.output)?;
    output::labelled(&loaded.output, &value);

    let gradients = loaded.graph.reverse_pass()?;
    output::header("gradients");
    for name in loaded.graph.names() {
        if let Some(gradient) = gradients.get(name) {
            output::detail(&format!("d{}/d{} = {}", loaded.output, name, gradient));
        }
    }
    Ok(())
}

#[instrument]
fn cmd_show(file: &Path, nary: bool) -> CliResult<()> {
    if nary {
        let arena = load_nary_tree(file)?;
        output::info(&arena.to_tree_string());
        output::detail(&format!("{} nodes, depth {}", arena.len(), arena.depth()));
        output::detail(&format!("leaves: {}", format_sequence(&arena.leaf_values())));
    } else {
        let tree = load_binary_tree(file)?;
        output::info(&tree.to_tree_string());
        output::detail(&format!("{} nodes, height {}", tree.len(), tree.height()));
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_demo(settings: &Settings) -> CliResult<()> {
    let tree = complete_tree(3);
    output::header("binary tree");
    output::info(&tree.to_tree_string());
    print_binary_traversals(&tree, &TraversalOrder::ALL);

    let (arena, root) = build_example_tree();
    output::header("general tree");
    output::info(&arena.to_tree_string());
    print_post_order(&arena, Some(root), settings.traversal.method, false)?;
    print_post_order(&arena, Some(root), settings.traversal.method, true)
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => {
                return Err(CliError::Usage(
                    "no home directory, global config location unknown".into(),
                ))
            }
        },
    }
    Ok(())
}
