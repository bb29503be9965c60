//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// labext - Manage the extensions of a running JupyterLab server
#[derive(Parser, Debug)]
#[command(name = "labext")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List installed extensions
    List {
        /// Bypass the server's cache of installed extensions
        #[arg(long)]
        refresh: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Search the registry for extensions
    ///
    /// Examples:
    ///   labext search git
    ///   labext search widgets --page 1 --per-page 10
    Search {
        /// Search text
        query: String,

        /// Zero-based result page
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Results per page
        #[arg(long)]
        per_page: Option<usize>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Install an extension, or upgrade it if already installed
    Install {
        /// Extension package name
        name: String,

        /// Do not ask about companion packages
        #[arg(short, long)]
        yes: bool,
    },

    /// Uninstall an extension
    Uninstall {
        /// Extension package name
        name: String,
    },

    /// Enable an installed extension
    Enable {
        /// Extension package name
        name: String,
    },

    /// Disable an installed extension
    Disable {
        /// Extension package name
        name: String,
    },

    /// Upgrade every installed extension that has a newer release
    Update {
        /// Do not ask about companion packages
        #[arg(short, long)]
        yes: bool,
    },

    /// Rebuild the application
    Build {
        /// Only report whether a rebuild is recommended
        #[arg(long, conflicts_with = "cancel")]
        check: bool,

        /// Cancel a running build
        #[arg(long)]
        cancel: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}
