//! Validate command - report configuration errors and warnings

use super::Project;
use anyhow::Result;
use colored::Colorize;
use shipwright_build::{validate_config, validate_profile, ActionRegistry, ValidationReport};
use shipwright_config::Configuration;
use std::path::Path;
use std::process::ExitCode;

/// Exits with code 1 when the configuration has errors
pub fn run(dir: &Path, json: bool) -> Result<ExitCode> {
    let project = Project::load(dir)?;
    let report = validate_all(&project.config, ActionRegistry::builtin());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for error in &report.errors {
            println!("{} {}", "error:".red().bold(), error);
        }
        for warning in &report.warnings {
            println!("{} {}", "warning:".yellow().bold(), warning);
        }
        if report.is_valid() {
            println!(
                "{} {} is valid",
                "OK".green().bold(),
                project.config_path.display()
            );
        }
    }

    Ok(if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Configuration checks plus the per-profile checks of every profile
fn validate_all(config: &Configuration, registry: &ActionRegistry) -> ValidationReport {
    let mut report = validate_config(config, registry);
    if !report.is_valid() {
        return report;
    }

    for profile in &config.profiles {
        let profile_report = validate_profile(config, profile, registry);
        for error in profile_report.errors {
            if !report.errors.contains(&error) {
                report.errors.push(error);
            }
        }
        for warning in profile_report.warnings {
            if !report.warnings.contains(&warning) {
                report.warnings.push(warning);
            }
        }
    }
    report
}
