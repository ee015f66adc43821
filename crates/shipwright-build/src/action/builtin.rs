//! Actions shipped with the engine

use super::{ActionContext, ActionFactory, BuildAction};
use crate::error::{BuildError, BuildResult};
use crate::flags::FlagStates;
use crate::host::CompileReport;
use serde::Serialize;
use std::fs;
use tracing::info;

/// Name of the file written by [`WriteBuildInfoAction`]
pub const BUILD_INFO_FILE_NAME: &str = "build-info.json";

/// Registration table of the built-in actions
pub fn builtin_factories() -> Vec<ActionFactory> {
    vec![LogContextAction::factory, WriteBuildInfoAction::factory]
}

/// Logs the stage, profile, version and output location
#[derive(Debug, Default)]
pub struct LogContextAction;

impl LogContextAction {
    pub const ID: &'static str = "log-context";

    pub fn factory() -> BuildResult<Box<dyn BuildAction>> {
        Ok(Box::new(Self))
    }
}

impl BuildAction for LogContextAction {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Logs the current stage, profile, version and output directory"
    }

    fn execute(&self, context: &ActionContext<'_>) -> BuildResult<()> {
        info!(
            action = Self::ID,
            stage = %context.stage(),
            profile = %context.profile().id,
            version = %context.version_after(),
            build_name = %context.build_name(),
            output = %context.build_dir().display(),
            "build context"
        );
        Ok(())
    }
}

/// Writes `build-info.json` into the build directory
#[derive(Debug, Default)]
pub struct WriteBuildInfoAction;

#[derive(Debug, Serialize)]
struct BuildInfo<'a> {
    build_name: &'a str,
    profile: &'a str,
    platform: &'a str,
    stage: &'a str,
    version_before: &'a str,
    version_after: &'a str,
    symbols: &'a [String],
    flags: &'a FlagStates,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a CompileReport>,
}

impl WriteBuildInfoAction {
    pub const ID: &'static str = "write-build-info";

    pub fn factory() -> BuildResult<Box<dyn BuildAction>> {
        Ok(Box::new(Self))
    }
}

impl BuildAction for WriteBuildInfoAction {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Writes build-info.json with the build identity into the build directory"
    }

    fn execute(&self, context: &ActionContext<'_>) -> BuildResult<()> {
        let info = BuildInfo {
            build_name: context.build_name(),
            profile: &context.profile().id,
            platform: context.options().platform.name(),
            stage: context.stage().name(),
            version_before: context.version_before(),
            version_after: context.version_after(),
            symbols: context.symbols(),
            flags: context.flags(),
            report: context.report(),
        };

        let json =
            serde_json::to_string_pretty(&info).map_err(|e| BuildError::action(Self::ID, e))?;

        let dir = context.build_dir();
        fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
        let path = dir.join(BUILD_INFO_FILE_NAME);
        fs::write(&path, json).map_err(|e| BuildError::io(&path, e))?;

        info!(action = Self::ID, path = %path.display(), "wrote build info");
        Ok(())
    }
}
