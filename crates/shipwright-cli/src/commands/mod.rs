pub mod build;
pub mod bump;
pub mod init;
pub mod output_dir;
pub mod preprocess;
pub mod preview;
pub mod profiles;
pub mod symbols;
pub mod validate;

use anyhow::{bail, Context, Result};
use shipwright_build::{
    BuildEnvironment, BuildError, BuildResult, CommandCompiler, CompileReport, CompileRequest,
    Compiler, FlagStates, ProjectSettingsFile, SystemClock,
};
use shipwright_config::{ConfigLoader, Configuration};
use std::path::{Path, PathBuf};

/// A loaded project: configuration, settings file and compile command
pub struct Project {
    pub config: Configuration,
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub settings: ProjectSettingsFile,
    compiler: ProjectCompiler,
    clock: SystemClock,
}

/// Compile step of a project, which may not be configured
enum ProjectCompiler {
    Command(CommandCompiler),
    Missing,
}

impl Compiler for ProjectCompiler {
    fn compile(&self, request: &CompileRequest) -> BuildResult<CompileReport> {
        match self {
            Self::Command(compiler) => compiler.compile(request),
            Self::Missing => Err(BuildError::CompilerUnavailable(
                "no compile command configured; set [compiler] command in project-settings.toml"
                    .to_string(),
            )),
        }
    }
}

impl Project {
    /// Load the project containing `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let loaded = ConfigLoader::new()
            .load_from_directory(dir)
            .with_context(|| format!("Failed to load configuration from {}", dir.display()))?;

        let settings = ProjectSettingsFile::open(&loaded.project_root)
            .context("Failed to read project settings")?;
        let compiler = match settings.compiler_command() {
            Some(command) => {
                ProjectCompiler::Command(CommandCompiler::new(command, &loaded.project_root))
            }
            None => ProjectCompiler::Missing,
        };

        Ok(Self {
            config: loaded.config,
            root: loaded.project_root,
            config_path: loaded.config_path,
            settings,
            compiler,
            clock: SystemClock,
        })
    }

    pub fn env(&self) -> BuildEnvironment<'_> {
        BuildEnvironment {
            project_root: &self.root,
            settings: &self.settings,
            symbols: &self.settings,
            scenes: &self.settings,
            compiler: &self.compiler,
            clock: &self.clock,
        }
    }

    /// Profile id to use: the requested one, else the last used one, else the first
    pub fn profile_id(&self, requested: Option<&str>) -> Result<String> {
        if let Some(id) = requested.map(str::trim).filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }

        let last = self.config.last_profile.trim();
        if !last.is_empty() && self.config.profile(last).is_some() {
            return Ok(last.to_string());
        }

        match self.config.profiles.first() {
            Some(profile) => Ok(profile.id.clone()),
            None => bail!("No build profiles are configured"),
        }
    }

    /// Remember `profile_id` as the last used profile
    ///
    /// Only the `last_profile` line of the file changes, so comments survive
    /// and environment overrides are not written back.
    pub fn remember_profile(&mut self, profile_id: &str) -> Result<()> {
        let Some(profile) = self.config.profile(profile_id) else {
            return Ok(());
        };
        if profile.id == self.config.last_profile {
            return Ok(());
        }
        let id = profile.id.clone();

        Configuration::store_last_profile(&self.config_path, &id)
            .context("Failed to save shipwright.toml")?;

        self.config.last_profile = id;
        Ok(())
    }
}

/// Parse `--flag` values: `id`, `id=true`, `id=false` (also `on/off`, `1/0`)
pub fn parse_flags(values: &[String]) -> Result<FlagStates> {
    let mut states = FlagStates::new();
    for value in values {
        let (id, enabled) = match value.split_once('=') {
            Some((id, state)) => (id, parse_bool(state).with_context(|| {
                format!("Invalid value for flag '{}': '{}'", id.trim(), state)
            })?),
            None => (value.as_str(), true),
        };
        if id.trim().is_empty() {
            bail!("Flag id must not be empty: '{}'", value);
        }
        states.set(id, enabled);
    }
    Ok(states)
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => bail!("expected true or false"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags() {
        let states = parse_flags(&strings(&["demo", "skip-zip=false", "Fast=ON"])).unwrap();
        assert!(states.is_enabled("demo"));
        assert_eq!(states.get("skip-zip"), Some(false));
        assert!(states.is_enabled("fast"));
    }

    #[test]
    fn test_parse_flags_rejects_bad_values() {
        assert!(parse_flags(&strings(&["demo=maybe"])).is_err());
        assert!(parse_flags(&strings(&["=true"])).is_err());
    }

    #[test]
    fn test_later_flag_value_wins() {
        let states = parse_flags(&strings(&["demo", "demo=false"])).unwrap();
        assert_eq!(states.get("demo"), Some(false));
        assert_eq!(states.len(), 1);
    }
}
