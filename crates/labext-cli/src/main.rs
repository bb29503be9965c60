//! labext CLI
//!
//! Manages the extensions of a running JupyterLab server from the terminal.
//!
//! # Environment Variables
//!
//! - `LABEXT_BASE_URL`, `LABEXT_TOKEN`, `LABEXT_REGISTRY_URL`: override the
//!   configured server and registry
//! - `RUST_LOG`: Control log verbosity (default: `labext=info`)

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use labext_core::Action;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        if e.needs_printing() {
            eprintln!("{}: {}", "error".red().bold(), e);
        }
        std::process::exit(1);
    }
}

/// Install a stderr subscriber filtered by `RUST_LOG`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "labext=debug,labext_core=debug,labext_client=debug"
    } else {
        "labext=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("Verbose mode enabled");
}

async fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("{} JupyterLab extension manager", "labext".green().bold());
        println!();
        println!("Run {} for available commands.", "labext --help".cyan());
        return Ok(());
    };

    let cwd = std::env::current_dir()?;
    match command {
        Commands::List { refresh, json } => commands::run_list(&cwd, refresh, json).await,
        Commands::Search {
            query,
            page,
            per_page,
            json,
        } => commands::run_search(&cwd, &query, page, per_page, json).await,
        Commands::Install { name, yes } => commands::run_install(&cwd, &name, yes).await,
        Commands::Uninstall { name } => commands::run_action(&cwd, Action::Uninstall, &name).await,
        Commands::Enable { name } => commands::run_action(&cwd, Action::Enable, &name).await,
        Commands::Disable { name } => commands::run_action(&cwd, Action::Disable, &name).await,
        Commands::Update { yes } => commands::run_update(&cwd, yes).await,
        Commands::Build { check, cancel } => commands::run_build(&cwd, check, cancel).await,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "labext", &mut std::io::stdout());
            Ok(())
        }
    }
}
