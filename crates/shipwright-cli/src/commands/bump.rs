//! Bump command - advance the stored version without building

use super::Project;
use anyhow::Result;
use colored::Colorize;
use shipwright_build::increment_version_only;
use std::path::Path;

pub fn run(dir: &Path, profile: Option<&str>) -> Result<()> {
    let project = Project::load(dir)?;
    let profile_id = project.profile_id(profile)?;

    let result = increment_version_only(&project.config, &profile_id, &project.env())?;
    println!("{} {}", "OK".green().bold(), result.message);
    Ok(())
}
