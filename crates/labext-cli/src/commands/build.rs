//! Build command

use std::path::Path;

use colored::Colorize;

use crate::context::Session;
use crate::error::{CliError, Result};

/// Run the build command
pub async fn run_build(root: &Path, check: bool, cancel: bool) -> Result<()> {
    let session = Session::open(root, false)?;
    let model = &session.model;
    if !model.build_available() {
        return Err(CliError::user("Build is not available on this server"));
    }

    let reported = session.reporter.count();

    if cancel {
        model.cancel_build().await?;
        if session.reporter.count() > reported {
            return Err(CliError::Reported("build cancellation failed".to_string()));
        }
        println!("{} Build cancelled.", "OK".green().bold());
        return Ok(());
    }

    if check {
        model.trigger_build_check();
        model.settle_build_check().await?;
        if model.prompt_build() {
            println!(
                "{} A rebuild is recommended. Run {}.",
                "!".yellow().bold(),
                "labext build".cyan()
            );
        } else {
            println!("{} No rebuild needed.", "OK".green().bold());
        }
        return Ok(());
    }

    println!("Building application...");
    model.perform_build().await?;
    if session.reporter.count() > reported {
        return Err(CliError::Reported("build failed".to_string()));
    }
    println!("{} Build complete.", "OK".green().bold());
    Ok(())
}
