//! Build orchestration
//!
//! One build walks a fixed sequence of stages around a single compile call:
//!
//! ```text
//! before-versioning -> after-versioning     (only when versioning)
//! before-symbols    -> after-symbols        (only when applying symbols)
//! before-build -> compile -> after-build
//! before-packaging -> after-packaging -> on-success
//! ```
//!
//! Any error from versioning onward skips the rest of the success path and
//! runs `on-failure` instead. `after-build` always runs once the compile
//! step has reported, so it sees failed reports too.

use crate::action::{ActionContext, ActionRegistry};
use crate::error::{BuildError, BuildResult};
use crate::flags::FlagStates;
use crate::host::{BuildEnvironment, CompileReport, CompileRequest, SettingsStore};
use crate::naming::make_safe_file_name;
use crate::packaging;
use crate::resolve::{resolve_options, ResolvedOptions};
use crate::scope::InternalBuildScope;
use crate::symbols::apply_managed_symbols;
use crate::validate::validate_profile;
use crate::version::{next_version, Version};
use serde::{Serialize, Serializer};
use shipwright_config::{Configuration, Platform, Profile, Stage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// What to build
#[derive(Debug, Clone, Default)]
pub struct ExecutionRequest {
    pub profile_id: String,
    /// Caller flag states; ids the profile does not expose are ignored
    pub flag_overrides: FlagStates,
    /// Zip the build regardless of profile and flags
    pub force_zip: bool,
}

impl ExecutionRequest {
    pub fn new(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            ..Self::default()
        }
    }

    pub fn with_flag(mut self, id: &str, enabled: bool) -> Self {
        self.flag_overrides.set(id, enabled);
        self
    }

    pub fn with_force_zip(mut self, force_zip: bool) -> Self {
        self.force_zip = force_zip;
        self
    }
}

/// Outcome of one engine operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionResult {
    pub succeeded: bool,
    pub message: String,
    pub build_name: String,
    pub version_before: String,
    pub version_after: String,
    pub build_dir: PathBuf,
    pub zip_path: PathBuf,
    pub removed_excluded_dirs: usize,
    #[serde(serialize_with = "serialize_seconds")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CompileReport>,
}

fn serialize_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Side-effect free view of what a build would do
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildPreview {
    pub profile_id: String,
    pub build_name: String,
    pub version_before: String,
    pub version_after: String,
    pub build_dir: PathBuf,
    pub zip_path: PathBuf,
    pub increment_version: bool,
    pub apply_symbols: bool,
    pub zip_after_build: bool,
    pub remove_excluded_dirs: bool,
    pub flags: FlagStates,
    /// Symbols joined with `;`
    pub symbols: String,
}

impl From<ResolvedOptions> for BuildPreview {
    fn from(options: ResolvedOptions) -> Self {
        let symbols = options.joined_symbols();
        Self {
            profile_id: options.profile_id,
            build_name: options.build_name,
            version_before: options.version_before,
            version_after: options.version_after,
            build_dir: options.build_dir,
            zip_path: options.zip_path,
            increment_version: options.increment_version,
            apply_symbols: options.apply_symbols,
            zip_after_build: options.zip_after_build,
            remove_excluded_dirs: options.remove_excluded_dirs,
            flags: options.flags,
            symbols,
        }
    }
}

/// Run a full build
///
/// Unknown profiles, validation errors and an empty scene list are returned
/// as `Err` before anything is touched. Failures after that are reported
/// through `ExecutionResult::succeeded`.
///
/// Concurrent builds in one process are unsupported.
pub fn execute_build(
    config: &Configuration,
    request: &ExecutionRequest,
    env: &BuildEnvironment<'_>,
    registry: &ActionRegistry,
) -> BuildResult<ExecutionResult> {
    let profile = find_profile(config, &request.profile_id)?;

    let validation = validate_profile(config, profile, registry);
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    if !validation.is_valid() {
        return Err(BuildError::InvalidConfiguration(validation.error_message()));
    }

    let options = resolve_options(
        config,
        profile,
        Some(&request.flag_overrides),
        request.force_zip,
        env,
    );

    let scenes = env.scenes.enabled_scenes();
    if scenes.is_empty() {
        return Err(BuildError::NoScenes);
    }

    info!(
        profile = %profile.id,
        build_name = %options.build_name,
        version = %options.version_before,
        "starting build"
    );

    let started = Instant::now();
    let mut context = ActionContext::new(config, profile, options);
    let outcome = run_success_path(&mut context, scenes, env, registry);
    let duration = started.elapsed();

    let options = &context.options;
    let mut result = ExecutionResult {
        succeeded: false,
        message: String::new(),
        build_name: options.build_name.clone(),
        version_before: options.version_before.clone(),
        version_after: options.version_after.clone(),
        build_dir: options.build_dir.clone(),
        zip_path: options.zip_path.clone(),
        removed_excluded_dirs: 0,
        duration,
        report: context.report,
    };

    match outcome {
        Ok(removed) => {
            result.succeeded = true;
            result.removed_excluded_dirs = removed;
            result.message = success_message(profile, options, removed, duration);
            info!("{}", result.message.replace('\n', " | "));
        }
        Err(e) => {
            let message = e.to_string();
            context.failure = Some(message.clone());
            if let Err(action_error) = run_stage(&mut context, Stage::OnFailure, registry) {
                error!(error = %action_error, "failure action error");
            }
            error!(profile = %profile.id, "{}", message);
            result.message = message;
        }
    }

    Ok(result)
}

fn run_success_path(
    context: &mut ActionContext<'_>,
    scenes: Vec<String>,
    env: &BuildEnvironment<'_>,
    registry: &ActionRegistry,
) -> BuildResult<usize> {
    let config = context.config();
    let profile = context.profile();

    if context.options.increment_version {
        run_stage(context, Stage::BeforeVersioning, registry)?;
        let next = next_version(&context.options.version_before, profile.version_mode);
        context.options.version_after = apply_version(env.settings, &next)?;
        run_stage(context, Stage::AfterVersioning, registry)?;
    }

    if context.options.apply_symbols {
        run_stage(context, Stage::BeforeSymbols, registry)?;
        let applied = apply_managed_symbols(
            env.symbols,
            profile.platform.symbol_group(),
            config.managed_symbols(),
            &context.options.symbols,
        )?;
        context.options.symbols = applied.into_iter().collect();
        run_stage(context, Stage::AfterSymbols, registry)?;
    }

    run_stage(context, Stage::BeforeBuild, registry)?;

    let options = &context.options;
    fs::create_dir_all(&options.output_root).map_err(|e| BuildError::io(&options.output_root, e))?;
    packaging::ensure_build_directory(&options.build_dir)?;
    if options.zip_after_build {
        packaging::delete_zip_if_exists(&options.zip_path)?;
    }

    let request = CompileRequest {
        scenes,
        platform: profile.platform.clone(),
        output_path: compile_output_path(&profile.platform, &options.build_dir, &env.product_name()),
        options: profile.compile_options.clone(),
        symbols: options.symbols.clone(),
    };

    let report = {
        let _scope = InternalBuildScope::enter();
        env.compiler.compile(&request)?
    };
    info!(
        outcome = %report.outcome,
        errors = report.errors,
        warnings = report.warnings,
        "compile finished"
    );

    context.report = Some(report);
    run_stage(context, Stage::AfterBuild, registry)?;

    if !report.is_success() {
        return Err(BuildError::CompileFailed {
            result: report.outcome.to_string(),
            errors: report.errors,
            warnings: report.warnings,
        });
    }

    run_stage(context, Stage::BeforePackaging, registry)?;

    let options = &context.options;
    let mut removed = 0;
    if options.remove_excluded_dirs {
        removed = packaging::remove_directories_by_name(&options.build_dir, &profile.excluded_dirs)?;
    }
    if options.zip_after_build {
        removed += packaging::remove_burst_debug_directories(&options.build_dir)?;
        packaging::create_zip(&options.build_dir, &options.zip_path)?;
    }

    run_stage(context, Stage::AfterPackaging, registry)?;
    run_stage(context, Stage::OnSuccess, registry)?;

    Ok(removed)
}

/// Run the enabled global, then profile, bindings of one stage
fn run_stage(
    context: &mut ActionContext<'_>,
    stage: Stage,
    registry: &ActionRegistry,
) -> BuildResult<()> {
    context.stage = stage;
    info!(stage = stage.name(), "stage");

    let context: &ActionContext<'_> = context;
    let bindings = context
        .config()
        .actions
        .iter()
        .chain(context.profile().actions.iter())
        .filter(|binding| binding.enabled && binding.stage == stage);

    for binding in bindings {
        let id = binding.action_id.trim();
        if id.is_empty() {
            continue;
        }

        let Some(action) = registry.get(id) else {
            warn!(action = id, stage = stage.name(), "action not found, skipped");
            continue;
        };

        debug!(action = id, stage = stage.name(), "running action");
        action.execute(context).map_err(|e| match e {
            e @ BuildError::ActionFailed { .. } => e,
            other => BuildError::action(id, other),
        })?;
    }

    Ok(())
}

/// Store a version and its build numbers; returns the normalized version
///
/// Build numbers are best-effort: a failure there is logged and ignored.
pub fn apply_version(settings: &dyn SettingsStore, version: &str) -> BuildResult<String> {
    let parsed = Version::parse(version);
    let normalized = parsed.to_string();

    settings.set_version(&normalized)?;
    if let Err(e) = settings.set_build_numbers(&parsed) {
        warn!(version = %normalized, error = %e, "could not update build numbers");
    }

    Ok(normalized)
}

/// Path handed to the compile step
///
/// Directory-export platforms get the build directory itself; others get the
/// executable inside it.
pub fn compile_output_path(platform: &Platform, build_dir: &Path, product: &str) -> PathBuf {
    if platform.exports_directory() {
        build_dir.to_path_buf()
    } else {
        build_dir.join(platform.executable_file_name(&make_safe_file_name(product)))
    }
}

/// Resolve a build without side effects; `None` for an unknown profile
pub fn preview(
    config: &Configuration,
    profile_id: &str,
    overrides: Option<&FlagStates>,
    force_zip: bool,
    env: &BuildEnvironment<'_>,
) -> Option<BuildPreview> {
    let profile = config.profile(profile_id)?;
    Some(resolve_options(config, profile, overrides, force_zip, env).into())
}

/// Bump the stored version with the profile's mode, ignoring its toggles
pub fn increment_version_only(
    config: &Configuration,
    profile_id: &str,
    env: &BuildEnvironment<'_>,
) -> BuildResult<ExecutionResult> {
    let profile = find_profile(config, profile_id)?;

    let before = env.current_version();
    let after = apply_version(env.settings, &next_version(&before, profile.version_mode))?;
    info!(profile = %profile.id, before = %before, after = %after, "version updated");

    Ok(ExecutionResult {
        succeeded: true,
        message: format!("Version updated: {} -> {}", before, after),
        version_before: before,
        version_after: after,
        ..ExecutionResult::default()
    })
}

/// Reconcile the stored symbols for a profile without building
pub fn apply_symbols_only(
    config: &Configuration,
    profile_id: &str,
    overrides: Option<&FlagStates>,
    env: &BuildEnvironment<'_>,
) -> BuildResult<ExecutionResult> {
    let profile = find_profile(config, profile_id)?;
    let options = resolve_options(config, profile, overrides, false, env);

    let applied = apply_managed_symbols(
        env.symbols,
        profile.platform.symbol_group(),
        config.managed_symbols(),
        &options.symbols,
    )?;
    let joined = applied.into_iter().collect::<Vec<_>>().join(";");

    Ok(ExecutionResult {
        succeeded: true,
        message: format!("Symbols applied for {}: {}", profile.display_name(), joined),
        version_before: options.version_before.clone(),
        version_after: options.version_before,
        ..ExecutionResult::default()
    })
}

fn find_profile<'c>(config: &'c Configuration, profile_id: &str) -> BuildResult<&'c Profile> {
    config
        .profile(profile_id)
        .ok_or_else(|| BuildError::ProfileNotFound(profile_id.trim().to_string()))
}

fn success_message(
    profile: &Profile,
    options: &ResolvedOptions,
    removed: usize,
    duration: Duration,
) -> String {
    let zip = if options.zip_after_build {
        options.zip_path.display().to_string()
    } else {
        "disabled".to_string()
    };

    format!(
        "Build completed.\n\n\
         Profile: {}\n\
         Build Name: {}\n\
         Build Folder: {}\n\
         Zip: {}\n\
         Version: {} -> {}\n\
         Removed excluded dirs: {}\n\
         Duration: {}",
        profile.display_name(),
        options.build_name,
        options.build_dir.display(),
        zip,
        options.version_before,
        options.version_after,
        removed,
        format_duration(duration)
    )
}

/// `mm:ss`
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
