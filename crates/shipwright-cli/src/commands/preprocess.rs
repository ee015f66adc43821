//! Preprocess command - version and symbol work for an external build

use super::Project;
use anyhow::Result;
use colored::Colorize;
use shipwright_build::{run_preprocess, PreprocessOutcome};
use shipwright_config::Platform;
use std::path::Path;

pub fn run(dir: &Path, platform: &str) -> Result<()> {
    let project = Project::load(dir)?;
    let platform = Platform::from_str(platform);

    match run_preprocess(&project.config, &platform, &project.env())? {
        PreprocessOutcome::Skipped => println!("Preprocess skipped: a build is in progress"),
        PreprocessOutcome::NoProfile => println!("Preprocess skipped: no build profiles"),
        PreprocessOutcome::Ran {
            profile_id,
            version_before,
            version_after,
            symbols_applied,
        } => {
            println!(
                "{} Preprocessed with profile '{}': version {} -> {}, symbols {}",
                "OK".green().bold(),
                profile_id,
                version_before,
                version_after,
                if symbols_applied { "applied" } else { "unchanged" }
            );
        }
    }
    Ok(())
}
