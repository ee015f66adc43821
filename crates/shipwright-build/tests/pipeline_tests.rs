//! End-to-end tests for the build pipeline
//!
//! Every test builds into its own temporary project root with in-memory
//! settings, symbols and a scripted compile step.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use shipwright_build::host::{
    FixedClock, InMemorySettings, InMemorySymbols, ScriptedCompiler, StaticScenes,
};
use shipwright_build::{
    apply_symbols_only, execute_build, increment_version_only, preview, ActionContext,
    ActionRegistry, BuildAction, BuildEnvironment, BuildError, BuildResult, CompileReport,
    ExecutionRequest, FlagStates, SettingsStore, SymbolStore,
};
use shipwright_config::{
    ActionBinding, Configuration, Flag, FlagOverrides, Platform, Profile, Stage, SymbolGroup,
};
use std::fs::{self, File};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use zip::ZipArchive;

struct Project {
    root: TempDir,
    settings: InMemorySettings,
    symbols: InMemorySymbols,
    scenes: StaticScenes,
    compiler: ScriptedCompiler,
    clock: FixedClock,
}

impl Project {
    fn new(compiler: ScriptedCompiler) -> Self {
        let now = NaiveDate::from_ymd_opt(2024, 5, 6)
            .and_then(|d| d.and_hms_opt(7, 8, 9))
            .unwrap();
        Self {
            root: TempDir::new().unwrap(),
            settings: InMemorySettings::new("Game", "1.2.3"),
            symbols: InMemorySymbols::new().with_group(SymbolGroup::Standalone, "EXTERNAL"),
            scenes: StaticScenes::new(["Scenes/Main.scene", "Scenes/Level1.scene"]),
            compiler,
            clock: FixedClock(now),
        }
    }

    fn env(&self) -> BuildEnvironment<'_> {
        BuildEnvironment {
            project_root: self.root.path(),
            settings: &self.settings,
            symbols: &self.symbols,
            scenes: &self.scenes,
            compiler: &self.compiler,
            clock: &self.clock,
        }
    }
}

fn config() -> Configuration {
    let mut config = Configuration::default();
    config.flags = vec![
        Flag::new("demo-content", false).with_symbols(["DEMO"]),
        Flag::new("skip-version-bump", false).with_overrides(FlagOverrides {
            increment_version: Some(false),
            ..Default::default()
        }),
    ];
    config.profiles = vec![Profile::new("dev", Platform::Windows64)
        .with_display_name("Development")
        .with_name_template("{product}_{version}")
        .with_symbols(["TL_BUILD_DEV"])
        .with_flags(["demo-content", "skip-version-bump"])];
    config
}

/// Records what each stage observed
#[derive(Debug, Clone, PartialEq)]
struct Observation {
    stage: Stage,
    version_after: String,
    symbols: Vec<String>,
    report: Option<CompileReport>,
    failure: Option<String>,
}

struct Recorder {
    id: &'static str,
    fail_at: Option<Stage>,
    log: Arc<Mutex<Vec<Observation>>>,
}

impl BuildAction for Recorder {
    fn id(&self) -> &str {
        self.id
    }

    fn execute(&self, context: &ActionContext<'_>) -> BuildResult<()> {
        self.log.lock().unwrap().push(Observation {
            stage: context.stage(),
            version_after: context.version_after().to_string(),
            symbols: context.symbols().to_vec(),
            report: context.report().copied(),
            failure: context.failure().map(str::to_string),
        });
        if self.fail_at == Some(context.stage()) {
            return Err(BuildError::action(self.id, "boom"));
        }
        Ok(())
    }
}

fn recording_registry(fail_at: Option<Stage>) -> (ActionRegistry, Arc<Mutex<Vec<Observation>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ActionRegistry::new();
    registry
        .register(Box::new(Recorder {
            id: "record",
            fail_at,
            log: Arc::clone(&log),
        }))
        .unwrap();
    (registry, log)
}

fn bind_everywhere(config: &mut Configuration) {
    config.actions = Stage::all()
        .into_iter()
        .map(|stage| ActionBinding::new("record", stage))
        .collect();
}

fn stages(log: &Arc<Mutex<Vec<Observation>>>) -> Vec<Stage> {
    log.lock().unwrap().iter().map(|o| o.stage).collect()
}

#[test]
fn test_build_bumps_version_and_zips() {
    let project = Project::new(
        ScriptedCompiler::succeeding()
            .with_output_file("Game.exe", "binary")
            .with_output_file("Game_Data/level0", "level"),
    );
    let config = config();

    let result = execute_build(
        &config,
        &ExecutionRequest::new("dev"),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap();

    assert!(result.succeeded, "{}", result.message);
    assert_eq!(result.build_name, "Game_1.2.4");
    assert_eq!(result.version_before, "1.2.3");
    assert_eq!(result.version_after, "1.2.4");
    assert_eq!(project.settings.version(), "1.2.4");

    let build_root = project.root.path().join("BUILD");
    assert_eq!(result.build_dir, build_root.join("Game_1.2.4"));
    assert_eq!(result.zip_path, build_root.join("Game_1.2.4.zip"));
    assert!(result.zip_path.is_file());

    let archive = ZipArchive::new(File::open(&result.zip_path).unwrap()).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort();
    assert_eq!(names, vec!["Game.exe", "Game_Data/", "Game_Data/level0"]);

    assert!(result.message.starts_with("Build completed."));
    assert!(result.message.contains("Profile: Development"));
    assert!(result.message.contains("Version: 1.2.3 -> 1.2.4"));
}

#[test]
fn test_compile_request_contents() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let mut config = config();
    config.profiles[0].compile_options = vec!["development".to_string()];

    execute_build(
        &config,
        &ExecutionRequest::new("dev").with_flag("demo-content", true),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap();

    let requests = project.compiler.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.scenes, vec!["Scenes/Main.scene", "Scenes/Level1.scene"]);
    assert_eq!(
        request.output_path,
        project.root.path().join("BUILD/Game_1.2.4/Game.exe")
    );
    assert_eq!(request.options, vec!["development"]);
    assert_eq!(request.symbols, vec!["DEMO", "EXTERNAL", "TL_BUILD_DEV"]);
    assert_eq!(project.compiler.internal_flags(), vec![true]);
}

#[test]
fn test_skip_version_bump_flag_keeps_version() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let config = config();

    let result = execute_build(
        &config,
        &ExecutionRequest::new("dev").with_flag("skip-version-bump", true),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap();

    assert!(result.succeeded);
    assert_eq!(result.version_after, "1.2.3");
    assert_eq!(result.build_name, "Game_1.2.3");
    assert_eq!(project.settings.version(), "1.2.3");
}

#[test]
fn test_symbols_are_reconciled_into_store() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let config = config();

    execute_build(
        &config,
        &ExecutionRequest::new("dev").with_flag("demo-content", true),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap();
    assert_eq!(
        project.symbols.symbols_raw(SymbolGroup::Standalone),
        "DEMO;EXTERNAL;TL_BUILD_DEV"
    );

    execute_build(
        &config,
        &ExecutionRequest::new("dev"),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap();
    assert_eq!(
        project.symbols.symbols_raw(SymbolGroup::Standalone),
        "EXTERNAL;TL_BUILD_DEV"
    );
}

#[test]
fn test_success_path_stage_order() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let mut config = config();
    bind_everywhere(&mut config);
    let (registry, log) = recording_registry(None);

    let result = execute_build(&config, &ExecutionRequest::new("dev"), &project.env(), &registry)
        .unwrap();

    assert!(result.succeeded);
    assert_eq!(
        stages(&log),
        vec![
            Stage::BeforeVersioning,
            Stage::AfterVersioning,
            Stage::BeforeSymbols,
            Stage::AfterSymbols,
            Stage::BeforeBuild,
            Stage::AfterBuild,
            Stage::BeforePackaging,
            Stage::AfterPackaging,
            Stage::OnSuccess,
        ]
    );

    let log = log.lock().unwrap();
    assert_eq!(log[0].version_after, "1.2.4");
    assert_eq!(log[3].symbols, vec!["EXTERNAL", "TL_BUILD_DEV"]);
    assert_eq!(log[4].report, None);
    assert_eq!(log[5].report, Some(CompileReport::succeeded(0)));
}

#[test]
fn test_disabled_toggles_skip_their_stages() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let mut config = config();
    config.profiles[0] = config.profiles[0]
        .clone()
        .with_toggles(false, false, false, false);
    bind_everywhere(&mut config);
    let (registry, log) = recording_registry(None);

    let result = execute_build(&config, &ExecutionRequest::new("dev"), &project.env(), &registry)
        .unwrap();

    assert!(result.succeeded);
    assert!(!result.zip_path.exists());
    assert!(result.message.contains("Zip: disabled"));
    assert_eq!(
        stages(&log),
        vec![
            Stage::BeforeBuild,
            Stage::AfterBuild,
            Stage::BeforePackaging,
            Stage::AfterPackaging,
            Stage::OnSuccess,
        ]
    );
}

#[test]
fn test_global_bindings_run_before_profile_bindings() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let mut config = config();
    config.actions = vec![ActionBinding::new("first", Stage::BeforeBuild)];
    config.profiles[0].actions = vec![
        ActionBinding::new("second", Stage::BeforeBuild),
        ActionBinding::new("third", Stage::BeforeBuild).disabled(),
        ActionBinding::new("unregistered", Stage::BeforeBuild),
    ];

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ActionRegistry::new();
    for id in ["first", "second", "third"] {
        registry
            .register(Box::new(Recorder {
                id,
                fail_at: None,
                log: Arc::clone(&log),
            }))
            .unwrap();
    }

    let result = execute_build(&config, &ExecutionRequest::new("dev"), &project.env(), &registry)
        .unwrap();

    assert!(result.succeeded);
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[test]
fn test_failed_compile_reaches_failure_stage_with_report() {
    let project = Project::new(ScriptedCompiler::new(CompileReport::failed(2, 5)));
    let mut config = config();
    bind_everywhere(&mut config);
    let (registry, log) = recording_registry(None);

    let result = execute_build(&config, &ExecutionRequest::new("dev"), &project.env(), &registry)
        .unwrap();

    assert!(!result.succeeded);
    assert!(result.message.contains("Errors: 2"), "{}", result.message);
    assert!(result.message.contains("Warnings: 5"));
    assert_eq!(result.report, Some(CompileReport::failed(2, 5)));
    assert!(!result.zip_path.exists());

    let observed = stages(&log);
    assert_eq!(
        &observed[observed.len() - 2..],
        &[Stage::AfterBuild, Stage::OnFailure]
    );

    let log = log.lock().unwrap();
    let failure = log.last().unwrap();
    assert_eq!(failure.report, Some(CompileReport::failed(2, 5)));
    assert_eq!(failure.failure.as_deref(), Some(result.message.as_str()));
}

#[test]
fn test_action_error_aborts_and_runs_failure_actions() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let mut config = config();
    bind_everywhere(&mut config);
    let (registry, log) = recording_registry(Some(Stage::BeforeBuild));

    let result = execute_build(&config, &ExecutionRequest::new("dev"), &project.env(), &registry)
        .unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.message, "Action 'record' failed: boom");
    assert_eq!(project.compiler.call_count(), 0);
    assert_eq!(stages(&log).last(), Some(&Stage::OnFailure));
    assert_eq!(result.report, None);
}

#[test]
fn test_failure_action_error_does_not_mask_cause() {
    let project = Project::new(ScriptedCompiler::new(CompileReport::failed(1, 0)));
    let mut config = config();
    bind_everywhere(&mut config);
    let (registry, _log) = recording_registry(Some(Stage::OnFailure));

    let result = execute_build(&config, &ExecutionRequest::new("dev"), &project.env(), &registry)
        .unwrap();

    assert!(!result.succeeded);
    assert!(result.message.starts_with("Build failed: failed."));
}

#[test]
fn test_unavailable_compiler_fails_build() {
    let project = Project::new(ScriptedCompiler::unavailable("no editor"));
    let config = config();

    let result = execute_build(
        &config,
        &ExecutionRequest::new("dev"),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap();

    assert!(!result.succeeded);
    assert!(result.message.contains("no editor"));
}

#[test]
fn test_excluded_and_debug_directories_removed_before_zip() {
    let project = Project::new(
        ScriptedCompiler::succeeding()
            .with_output_file("Game.exe", "binary")
            .with_output_file("Game_Data/do not ship/notes.txt", "x")
            .with_output_file("Extras_Do Not Ship/readme.txt", "x")
            .with_output_file("Game_BurstDebugInformation_DoNotShip/lib.pdb", "x"),
    );
    let mut config = config();
    config.profiles[0].excluded_dirs = vec!["do not ship".to_string()];

    let result = execute_build(
        &config,
        &ExecutionRequest::new("dev"),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap();

    assert!(result.succeeded, "{}", result.message);
    assert_eq!(result.removed_excluded_dirs, 3);
    assert!(result.message.contains("Removed excluded dirs: 3"));

    let archive = ZipArchive::new(File::open(&result.zip_path).unwrap()).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort();
    assert_eq!(names, vec!["Game.exe", "Game_Data/"]);
}

#[test]
fn test_previous_build_output_is_replaced() {
    let project = Project::new(ScriptedCompiler::succeeding().with_output_file("Game.exe", "new"));
    let mut config = config();
    config.profiles[0].increment_version = false;

    let stale = project.root.path().join("BUILD/Game_1.2.3/stale.txt");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "old").unwrap();

    let result = execute_build(
        &config,
        &ExecutionRequest::new("dev"),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap();

    assert!(result.succeeded);
    assert!(!stale.exists());
    assert!(result.build_dir.join("Game.exe").is_file());
}

#[test]
fn test_build_info_action_writes_into_build_dir() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let mut config = config();
    config.profiles[0].zip_after_build = false;
    config.actions = vec![ActionBinding::new("write-build-info", Stage::AfterBuild)];

    let result = execute_build(
        &config,
        &ExecutionRequest::new("dev"),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap();

    let info = fs::read_to_string(result.build_dir.join("build-info.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&info).unwrap();
    assert_eq!(value["build_name"], "Game_1.2.4");
    assert_eq!(value["version_after"], "1.2.4");
}

#[test]
fn test_force_zip_overrides_flags() {
    let project = Project::new(ScriptedCompiler::succeeding().with_output_file("Game.exe", "x"));
    let mut config = config();
    config.flags.push(Flag::new("no-zip", true).with_overrides(FlagOverrides {
        zip_after_build: Some(false),
        ..Default::default()
    }));
    config.profiles[0].flags.push("no-zip".to_string());

    let result = execute_build(
        &config,
        &ExecutionRequest::new("dev").with_force_zip(true),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap();

    assert!(result.succeeded);
    assert!(result.zip_path.is_file());
}

#[test]
fn test_unknown_profile_is_an_error() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let err = execute_build(
        &config(),
        &ExecutionRequest::new("ghost"),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap_err();

    assert!(matches!(err, BuildError::ProfileNotFound(ref id) if id == "ghost"));
    assert_eq!(project.compiler.call_count(), 0);
}

#[test]
fn test_invalid_configuration_is_an_error() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let mut config = config();
    config.profiles[0].flags.push("missing".to_string());

    let err = execute_build(
        &config,
        &ExecutionRequest::new("dev"),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap_err();

    assert!(err.to_string().contains("references missing flag 'missing'"));
    assert_eq!(project.settings.version(), "1.2.3");
}

#[test]
fn test_no_scenes_is_an_error() {
    let mut project = Project::new(ScriptedCompiler::succeeding());
    project.scenes = StaticScenes::new(Vec::<String>::new());

    let err = execute_build(
        &config(),
        &ExecutionRequest::new("dev"),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap_err();

    assert!(matches!(err, BuildError::NoScenes));
    assert_eq!(project.settings.version(), "1.2.3");
}

#[test]
fn test_preview_has_no_side_effects() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let config = config();
    let overrides = FlagStates::new().with("demo-content", true);

    let shown = preview(&config, "DEV", Some(&overrides), false, &project.env()).unwrap();

    assert_eq!(shown.build_name, "Game_1.2.4");
    assert_eq!(shown.version_after, "1.2.4");
    assert_eq!(shown.symbols, "DEMO;TL_BUILD_DEV");
    assert!(shown.zip_after_build);
    assert_eq!(project.settings.version(), "1.2.3");
    assert_eq!(
        project.symbols.symbols_raw(SymbolGroup::Standalone),
        "EXTERNAL"
    );
    assert!(!project.root.path().join("BUILD").exists());
    assert!(preview(&config, "ghost", None, false, &project.env()).is_none());
}

#[test]
fn test_increment_version_only_ignores_toggle() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let mut config = config();
    config.profiles[0].increment_version = false;

    let result = increment_version_only(&config, "dev", &project.env()).unwrap();

    assert!(result.succeeded);
    assert_eq!(result.message, "Version updated: 1.2.3 -> 1.2.4");
    assert_eq!(project.settings.version(), "1.2.4");
    assert_eq!(project.settings.build_code(), Some(10_204));
    assert_eq!(project.compiler.call_count(), 0);
}

#[test]
fn test_apply_symbols_only() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let config = config();
    let overrides = FlagStates::new().with("demo-content", true);

    let result = apply_symbols_only(&config, "dev", Some(&overrides), &project.env()).unwrap();

    assert!(result.succeeded);
    assert_eq!(
        result.message,
        "Symbols applied for Development: DEMO;EXTERNAL;TL_BUILD_DEV"
    );
    assert_eq!(project.settings.version(), "1.2.3");
    assert_eq!(project.compiler.call_count(), 0);
}

#[test]
fn test_result_serializes_duration_as_seconds() {
    let project = Project::new(ScriptedCompiler::succeeding());
    let mut config = config();
    config.profiles[0].zip_after_build = false;

    let result = execute_build(
        &config,
        &ExecutionRequest::new("dev"),
        &project.env(),
        ActionRegistry::builtin(),
    )
    .unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert!(value["duration"].is_f64());
    assert_eq!(value["succeeded"], true);
    assert_eq!(value["report"]["outcome"], "succeeded");
}
