//! Install, uninstall, enable, disable and update commands

use std::path::Path;

use colored::Colorize;
use labext_core::{Action, ActionOutcome};

use crate::context::Session;
use crate::error::{CliError, Result};

/// Run the install command
pub async fn run_install(root: &Path, name: &str, yes: bool) -> Result<()> {
    let session = Session::open(root, yes)?;
    session.model.initialize().await;
    let entry = session.resolve_entry(name).await?;

    let outcome = session
        .model
        .install(&entry)
        .await
        .map_err(CliError::from_action)?;
    match outcome {
        None => {
            println!("{} Installation of {} cancelled.", "-".yellow(), name.cyan());
            Ok(())
        }
        Some(outcome) => {
            check_outcome(Action::Install, name, &outcome)?;
            session.settle_build().await?;
            Ok(())
        }
    }
}

/// Run the uninstall, enable or disable command
pub async fn run_action(root: &Path, action: Action, name: &str) -> Result<()> {
    let session = Session::open(root, false)?;
    session.model.initialize().await;
    let entry = session.resolve_entry(name).await?;

    let model = &session.model;
    let outcome = match action {
        Action::Uninstall => model.uninstall(&entry).await,
        Action::Enable => model.enable(&entry).await,
        Action::Disable => model.disable(&entry).await,
        Action::Install => {
            return Err(CliError::user("use `labext install` to install extensions"));
        }
    }
    .map_err(CliError::from_action)?;

    check_outcome(action, name, &outcome)?;
    session.settle_build().await?;
    Ok(())
}

/// Run the update command
pub async fn run_update(root: &Path, yes: bool) -> Result<()> {
    let session = Session::open(root, yes)?;
    session.model.initialize().await;
    if let Some(error) = session.model.installed_error() {
        return Err(CliError::user(format!(
            "Failed to query installed extensions: {error}"
        )));
    }

    let results = session.model.update_all().await;
    if results.is_empty() {
        println!("{} All extensions are up to date.", "OK".green().bold());
        return Ok(());
    }

    let mut failed = 0;
    for (name, result) in results {
        match result {
            Ok(Some(outcome)) if outcome.is_ok() => {
                println!("{} Updated {}", "+".green(), name.cyan());
            }
            Ok(None) => println!("{} Skipped {}", "-".yellow(), name.cyan()),
            Ok(Some(_)) | Err(_) => failed += 1,
        }
    }
    session.settle_build().await?;

    if failed > 0 {
        return Err(CliError::Reported(format!("{failed} update(s) failed")));
    }
    Ok(())
}

fn check_outcome(action: Action, name: &str, outcome: &ActionOutcome) -> Result<()> {
    if outcome.is_ok() {
        println!("{} {} {}", "+".green(), past_tense(action), name.cyan());
        return Ok(());
    }
    // Non-ok outcomes were printed by the reporter.
    Err(CliError::Reported(
        outcome
            .message
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string()),
    ))
}

fn past_tense(action: Action) -> &'static str {
    match action {
        Action::Install => "Installed",
        Action::Uninstall => "Uninstalled",
        Action::Enable => "Enabled",
        Action::Disable => "Disabled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labext_core::ActionStatus;

    #[test]
    fn test_ok_outcome() {
        assert!(check_outcome(Action::Enable, "x", &ActionOutcome::ok()).is_ok());
    }

    #[test]
    fn test_error_outcome_is_already_reported() {
        let outcome = ActionOutcome {
            status: Some(ActionStatus::Error),
            message: None,
        };
        let err = check_outcome(Action::Disable, "x", &outcome).unwrap_err();
        assert!(!err.needs_printing());
        assert_eq!(err.to_string(), "Unknown error");
    }
}
