//! Listing commands for installed extensions and registry search

use std::path::Path;

use colored::Colorize;
use labext_core::{Entry, EntryStatus};

use crate::context::Session;
use crate::error::{CliError, Result};

/// Run the list command
pub async fn run_list(root: &Path, refresh: bool, json: bool) -> Result<()> {
    let session = Session::open(root, false)?;
    session.model.initialize().await;
    if refresh {
        session.model.refresh_installed().await;
    }

    if let Some(error) = session.model.installed_error() {
        return Err(CliError::user(format!(
            "Failed to query installed extensions: {error}"
        )));
    }

    let installed = session.model.installed();
    if json {
        println!("{}", serde_json::to_string_pretty(installed.as_slice())?);
        return Ok(());
    }

    println!("{}", "Installed Extensions".bold());
    println!();
    if installed.is_empty() {
        println!("  {}", "No extensions installed.".dimmed());
    }
    for entry in installed.iter() {
        println!("{}", format_entry(entry));
    }
    println!();
    println!(
        "{} {} installed. Use {} to find more.",
        "Total:".dimmed(),
        installed.len(),
        "labext search <query>".cyan()
    );

    Ok(())
}

/// Run the search command
pub async fn run_search(
    root: &Path,
    query: &str,
    page: usize,
    per_page: Option<usize>,
    json: bool,
) -> Result<()> {
    let session = Session::open(root, false)?;
    let model = &session.model;
    let per_page = per_page.unwrap_or_else(|| model.pagination());
    model.set_search_state(Some(query.to_string()), page, per_page);
    model.initialize().await;

    if let Some(error) = model.search_error() {
        return Err(CliError::user(format!("Search failed: {error}")));
    }

    let results = model.search_result();
    if json {
        println!("{}", serde_json::to_string_pretty(results.as_slice())?);
        return Ok(());
    }

    println!(
        "{} '{}' (page {}, {} total)",
        "Search results for".bold(),
        query,
        page,
        model.total_entries()
    );
    println!();
    if results.is_empty() {
        println!("  {}", "No matching extensions.".dimmed());
    }
    for entry in results.iter() {
        println!("{}", format_entry(entry));
    }
    if let Some(error) = model.installed_error() {
        eprintln!(
            "{} installed extensions unavailable: {}",
            "warning:".yellow().bold(),
            error
        );
    }

    Ok(())
}

/// One line per entry: name, version and state markers.
pub fn format_entry(entry: &Entry) -> String {
    let version = if entry.installed {
        entry.installed_version.as_str()
    } else {
        entry.latest_version.as_str()
    };

    let mut markers = Vec::new();
    if entry.installed {
        markers.push("installed".green().to_string());
        if !entry.enabled {
            markers.push("disabled".dimmed().to_string());
        }
    }
    if entry.has_update() {
        markers.push(format!("update available: {}", entry.latest_version).yellow().to_string());
    }
    match entry.status {
        EntryStatus::Warning => markers.push("warning".yellow().to_string()),
        EntryStatus::Error => markers.push("error".red().to_string()),
        EntryStatus::Deprecated => markers.push("deprecated".red().to_string()),
        EntryStatus::Ok | EntryStatus::Absent => {}
    }
    if let Some(rule) = &entry.blocked_entry {
        markers.push(format!("blocked: {}", rule.reason).red().to_string());
    }

    let mut line = format!("  {:<40} {:<10}", entry.name.green(), version);
    if !markers.is_empty() {
        line.push_str(&format!(" [{}]", markers.join(", ")));
    }
    line
}
