//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Query and reshape ordered attribute trees stored as JSON or TOML
#[derive(Parser, Debug)]
#[command(name = "treemodel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d -d -d)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the tree
    Show {
        /// Tree document (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Attribute used as node label (overrides config)
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Print the attributes of the first node with the given id
    Find {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Id value (read as JSON when possible, e.g. 7 or "7")
        id: String,
    },

    /// Print every node matching all key=value filters
    Where {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Filters as key=value (value read as JSON when possible)
        filters: Vec<String>,

        /// Stop at the first match (depth-1 matches preferred)
        #[arg(long)]
        first: bool,

        /// Search below the node with this id instead of the root
        #[arg(long)]
        from: Option<String>,

        /// Leave the starting node itself out of the results
        #[arg(long, conflicts_with = "first")]
        descendants: bool,
    },

    /// Show parent, position and siblings of a node
    Info {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        id: String,
    },

    /// Remove matching nodes and print the resulting tree
    Remove {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Filters as key=value (value read as JSON when possible)
        #[arg(required = true)]
        filters: Vec<String>,

        /// Remove only the first match
        #[arg(long)]
        first: bool,
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

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a config template
    Template,
    /// Show the global config file location
    Path,
}
