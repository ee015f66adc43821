//! Profiles command - list profiles and the flags they expose

use super::Project;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use shipwright_build::{default_flag_state, FlagStates};
use std::path::Path;

#[derive(Debug, Serialize)]
struct ProfileSummary<'a> {
    id: &'a str,
    display_name: &'a str,
    platform: &'a str,
    version_mode: &'a str,
    last_used: bool,
    flags: FlagStates,
}

pub fn run(dir: &Path, json: bool) -> Result<()> {
    let project = Project::load(dir)?;
    let config = &project.config;

    let summaries: Vec<ProfileSummary<'_>> = config
        .profiles
        .iter()
        .map(|profile| ProfileSummary {
            id: &profile.id,
            display_name: profile.display_name(),
            platform: profile.platform.name(),
            version_mode: profile.version_mode.name(),
            last_used: profile.has_id(&config.last_profile),
            flags: default_flag_state(config, profile),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No build profiles are configured");
        return Ok(());
    }

    for summary in &summaries {
        let marker = if summary.last_used { "*" } else { " " };
        println!(
            "{} {:<16} {:<24} {:<10} {}",
            marker.green().bold(),
            summary.id.bold(),
            summary.display_name,
            summary.platform,
            summary.version_mode.dimmed()
        );
        let flags: Vec<String> = summary
            .flags
            .iter()
            .map(|(id, enabled)| if enabled { format!("{}*", id) } else { id.to_string() })
            .collect();
        if !flags.is_empty() {
            println!("    flags: {}", flags.join(", "));
        }
    }
    Ok(())
}
