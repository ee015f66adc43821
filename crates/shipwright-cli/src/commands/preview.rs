//! Preview command - show the resolved build without touching anything

use super::{parse_flags, Project};
use anyhow::{bail, Result};
use colored::Colorize;
use shipwright_build::{preview, BuildPreview};
use std::path::Path;

pub fn run(
    dir: &Path,
    profile: Option<&str>,
    flags: &[String],
    zip: bool,
    json: bool,
) -> Result<()> {
    let project = Project::load(dir)?;
    let profile_id = project.profile_id(profile)?;
    let overrides = parse_flags(flags)?;

    let Some(preview) = preview(
        &project.config,
        &profile_id,
        Some(&overrides),
        zip,
        &project.env(),
    ) else {
        bail!("Build profile not found: '{}'", profile_id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
    } else {
        print_preview(&preview);
    }
    Ok(())
}

fn on_off(value: bool) -> String {
    if value {
        "on".green().to_string()
    } else {
        "off".dimmed().to_string()
    }
}

fn print_preview(preview: &BuildPreview) {
    println!("{} {}", "Profile:".bold(), preview.profile_id);
    println!("{} {}", "Build name:".bold(), preview.build_name);
    println!(
        "{} {} -> {}",
        "Version:".bold(),
        preview.version_before,
        preview.version_after
    );
    println!("{} {}", "Build folder:".bold(), preview.build_dir.display());
    println!("{} {}", "Zip:".bold(), preview.zip_path.display());
    println!();
    println!("  increment version     {}", on_off(preview.increment_version));
    println!("  apply symbols         {}", on_off(preview.apply_symbols));
    println!("  zip after build       {}", on_off(preview.zip_after_build));
    println!("  remove excluded dirs  {}", on_off(preview.remove_excluded_dirs));

    if !preview.flags.is_empty() {
        println!();
        println!("{}", "Flags:".bold());
        for (id, enabled) in preview.flags.iter() {
            println!("  {:<20} {}", id, on_off(enabled));
        }
    }

    println!();
    let symbols = if preview.symbols.is_empty() {
        "(none)"
    } else {
        preview.symbols.as_str()
    };
    println!("{} {}", "Symbols:".bold(), symbols);
}
