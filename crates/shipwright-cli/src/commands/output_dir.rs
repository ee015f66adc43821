//! Output-dir command - print the build output root

use super::Project;
use anyhow::Result;
use std::path::Path;

pub fn run(dir: &Path) -> Result<()> {
    let project = Project::load(dir)?;
    let output_root = project.root.join(project.config.output_folder_name());
    println!("{}", output_root.display());
    Ok(())
}
