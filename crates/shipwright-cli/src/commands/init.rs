//! Project initialization command (shipwright init)

use anyhow::{bail, Context, Result};
use colored::Colorize;
use shipwright_build::host::project_file::SETTINGS_FILE_NAME;
use shipwright_build::{ProjectSettingsFile, SettingsStore};
use shipwright_config::{Configuration, CONFIG_FILE_NAME};
use std::path::Path;

/// Write the starter configuration into `dir`
///
/// An existing `project-settings.toml` is left alone; a new one gets the
/// directory name as product name and version `0.1.0`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    Configuration::starter()
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("{} Created {}", "OK".green().bold(), config_path.display());

    if !dir.join(SETTINGS_FILE_NAME).exists() {
        let settings = ProjectSettingsFile::open(dir)?;
        let product = dir
            .canonicalize()
            .ok()
            .and_then(|path| path.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "Game".to_string());
        settings.set_product_name(&product)?;
        settings.set_version("0.1.0")?;
        println!(
            "{} Created {}",
            "OK".green().bold(),
            settings.path().display()
        );
    }

    println!();
    println!("Next steps:");
    println!("  1. Set [compiler] command and [[scenes]] in {}", SETTINGS_FILE_NAME);
    println!("  2. shipwright preview");
    println!("  3. shipwright build");
    Ok(())
}
