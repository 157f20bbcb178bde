//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::domain::{Mass, Traversal};

/// Counterbalance networks of nested scales described as `name,left,right` lines
#[derive(Parser, Debug)]
#[command(name = "scalebal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Directory holding a local .scalebal.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Input and balancing options shared by the computing commands.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Scale table (default or `-`: stdin)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Balancing order
    #[arg(long, value_name = "dependency|reverse")]
    pub traversal: Option<Traversal>,

    /// Own weight of every scale
    #[arg(long)]
    pub self_mass: Option<Mass>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute counterweights, one `NAME,LEFT,RIGHT` line per scale
    Balance {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (default or `-`: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Fail when input lines are rejected
        #[arg(long)]
        strict: bool,
    },

    /// Validate input: report rejected lines and reference cycles
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show scale hierarchy with balanced masses
    Tree {
        #[command(flatten)]
        input: InputArgs,
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
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
