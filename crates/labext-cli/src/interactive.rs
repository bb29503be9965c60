//! Interactive prompts and console reporting
//!
//! Uses dialoguer for the companion-package confirmation.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use colored::Colorize;
use dialoguer::Confirm;
use labext_core::schema::CompanionPackage;
use labext_core::{CompanionPrompt, CompanionRequest, ErrorReporter};

/// Suggested install commands for a companion package, one per manager.
pub fn install_commands(package: &CompanionPackage) -> Vec<String> {
    let Some(base) = &package.base else {
        return Vec::new();
    };
    package
        .managers
        .iter()
        .map(|manager| match manager.as_str() {
            "pip" => format!("pip install {}", base.name),
            "conda" => format!("conda install -c conda-forge {}", base.name),
            other => format!("{other} install {}", base.name),
        })
        .collect()
}

/// Describe `request` the way the prompt shows it.
pub fn describe(request: &CompanionRequest) -> Vec<String> {
    let mut lines = Vec::new();
    for companion in &request.kernel_companions {
        let kernels: Vec<&str> = companion
            .kernels
            .iter()
            .map(|k| k.display_name.as_str())
            .collect();
        if kernels.is_empty() {
            lines.push("A kernel companion package is recommended, but no matching kernel was found.".to_string());
        } else {
            lines.push(format!(
                "A kernel companion package is recommended for: {}",
                kernels.join(", ")
            ));
        }
        lines.extend(install_commands(&companion.rule.package).into_iter().map(|c| format!("  {c}")));
    }
    if let Some(server) = &request.server {
        lines.push("A server companion package is required.".to_string());
        lines.extend(install_commands(server).into_iter().map(|c| format!("  {c}")));
    }
    lines
}

/// Asks on the terminal before installing a package with companions.
#[derive(Debug, Default)]
pub struct DialoguerPrompt;

#[async_trait]
impl CompanionPrompt for DialoguerPrompt {
    async fn confirm(&self, request: &CompanionRequest) -> bool {
        println!();
        println!(
            "{} {} {}",
            "Companion packages for".bold(),
            request.package.cyan(),
            request.version.dimmed()
        );
        for line in describe(request) {
            println!("{line}");
        }
        println!();

        let question = format!("Install {} anyway?", request.package);
        let answer = tokio::task::spawn_blocking(move || {
            Confirm::new()
                .with_prompt(question)
                .default(false)
                .interact()
        })
        .await;

        match answer {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Prompt unavailable, declining");
                false
            }
            Err(e) => {
                tracing::debug!(error = %e, "Prompt task failed, declining");
                false
            }
        }
    }
}

/// Approves every install without asking (`--yes`).
#[derive(Debug, Default)]
pub struct AutoApprove;

#[async_trait]
impl CompanionPrompt for AutoApprove {
    async fn confirm(&self, request: &CompanionRequest) -> bool {
        for line in describe(request) {
            println!("{} {}", "note:".yellow().bold(), line.trim_start());
        }
        true
    }
}

/// Prints reported failures to stderr and counts them.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    reported: AtomicUsize,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.reported.load(Ordering::SeqCst)
    }
}

impl ErrorReporter for ConsoleReporter {
    fn report(&self, title: &str, message: &str) {
        self.reported.fetch_add(1, Ordering::SeqCst);
        eprintln!("{}: {}: {}", "error".red().bold(), title, message);
    }
}
