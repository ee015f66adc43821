//! Build command - run the full pipeline for one profile

use super::{parse_flags, Project};
use anyhow::{Context, Result};
use colored::Colorize;
use shipwright_build::{execute_build, ActionRegistry, ExecutionRequest, ExecutionResult};
use std::path::PathBuf;
use std::process::ExitCode;

/// Build command arguments
#[derive(Debug, Default)]
pub struct BuildArgs {
    pub project_dir: PathBuf,
    /// Profile id (defaults to the last used profile)
    pub profile: Option<String>,
    /// Raw `--flag` values
    pub flags: Vec<String>,
    /// Zip regardless of profile and flags
    pub zip: bool,
    /// JSON output
    pub json: bool,
}

/// Run the build command; a failed build exits with code 1
pub fn run(args: BuildArgs) -> Result<ExitCode> {
    let mut project = Project::load(&args.project_dir)?;
    let profile_id = project.profile_id(args.profile.as_deref())?;

    let request = ExecutionRequest {
        profile_id: profile_id.clone(),
        flag_overrides: parse_flags(&args.flags)?,
        force_zip: args.zip,
    };

    let result = execute_build(
        &project.config,
        &request,
        &project.env(),
        ActionRegistry::builtin(),
    )
    .with_context(|| format!("Cannot build profile '{}'", profile_id))?;

    project.remember_profile(&profile_id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(if result.succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_result(result: &ExecutionResult) {
    println!("\n{}", "=".repeat(60));
    if result.succeeded {
        println!("{}", "Build succeeded".green().bold());
    } else {
        println!("{}", "Build failed".red().bold());
    }
    println!("{}", "=".repeat(60));
    for line in result.message.lines() {
        println!("  {}", line);
    }
    println!("{}", "=".repeat(60));
}
