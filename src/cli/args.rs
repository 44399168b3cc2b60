//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Tree traversal toolkit: binary traversal orders, mirroring, post-order walks and gradients
#[derive(Parser, Debug)]
#[command(name = "treewalk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Print author and version
    #[arg(long)]
    pub info: bool,

    /// Config file applied over the global config
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        env = "TREEWALK_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print binary tree traversals
    Binary {
        /// Binary tree file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Traversal order, repeatable (default: configured orders)
        #[arg(short, long = "order")]
        orders: Vec<String>,
    },

    /// Mirror a binary tree
    Mirror {
        /// Binary tree file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Post-order traversal of a general tree
    Nary {
        /// N-ary tree file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// recursive | iterative (default: configured method)
        #[arg(short, long)]
        method: Option<String>,
        /// Group values by depth, deepest first
        #[arg(long)]
        by_depth: bool,
    },

    /// Evaluate a computation graph and its gradients
    Graph {
        /// Graph file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Render a tree file
    Show {
        /// Tree file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Read the file as an N-ary tree
        #[arg(long)]
        nary: bool,
    },

    /// Run the traversals on the built-in sample trees
    Demo,

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
    /// Print the global config file location
    Path,
}
