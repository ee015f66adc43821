//! Apply-symbols command - reconcile the stored symbols for a profile

use super::{parse_flags, Project};
use anyhow::Result;
use colored::Colorize;
use shipwright_build::apply_symbols_only;
use std::path::Path;

pub fn run(dir: &Path, profile: Option<&str>, flags: &[String]) -> Result<()> {
    let project = Project::load(dir)?;
    let profile_id = project.profile_id(profile)?;
    let overrides = parse_flags(flags)?;

    let result = apply_symbols_only(
        &project.config,
        &profile_id,
        Some(&overrides),
        &project.env(),
    )?;
    println!("{} {}", "OK".green().bold(), result.message);
    Ok(())
}
