//! Stage actions and their registry
//!
//! An action is a named side effect bound to pipeline stages in the
//! configuration. The registry is built from an explicit factory table;
//! factories that fail or produce an action without an id are skipped.

pub mod builtin;

use crate::error::{BuildError, BuildResult};
use crate::flags::FlagStates;
use crate::host::CompileReport;
use crate::resolve::ResolvedOptions;
use shipwright_config::{Configuration, Profile, Stage};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

pub use builtin::{builtin_factories, LogContextAction, WriteBuildInfoAction};

/// A side effect run at a pipeline stage
pub trait BuildAction: Send + Sync {
    /// Stable id used by bindings (matched case-insensitively)
    fn id(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn execute(&self, context: &ActionContext<'_>) -> BuildResult<()>;
}

/// Constructor entry in a registration table
pub type ActionFactory = fn() -> BuildResult<Box<dyn BuildAction>>;

/// State shared with actions while a build runs
///
/// The orchestrator updates the context in place as the build moves on:
/// `stage` before every checkpoint, the version after versioning, the symbol
/// list after symbol application, `report` once the compile step returns and
/// `failure` before failure actions run. Actions see the values current at
/// the moment they execute.
#[derive(Debug)]
pub struct ActionContext<'a> {
    config: &'a Configuration,
    profile: &'a Profile,
    pub(crate) stage: Stage,
    pub(crate) options: ResolvedOptions,
    pub(crate) report: Option<CompileReport>,
    pub(crate) failure: Option<String>,
}

impl<'a> ActionContext<'a> {
    pub fn new(config: &'a Configuration, profile: &'a Profile, options: ResolvedOptions) -> Self {
        Self {
            config,
            profile,
            stage: Stage::BeforeVersioning,
            options,
            report: None,
            failure: None,
        }
    }

    pub fn config(&self) -> &'a Configuration {
        self.config
    }

    pub fn profile(&self) -> &'a Profile {
        self.profile
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn flags(&self) -> &FlagStates {
        &self.options.flags
    }

    pub fn build_name(&self) -> &str {
        &self.options.build_name
    }

    pub fn output_root(&self) -> &Path {
        &self.options.output_root
    }

    pub fn build_dir(&self) -> &Path {
        &self.options.build_dir
    }

    pub fn zip_path(&self) -> &Path {
        &self.options.zip_path
    }

    pub fn version_before(&self) -> &str {
        &self.options.version_before
    }

    pub fn version_after(&self) -> &str {
        &self.options.version_after
    }

    /// Symbols in effect; the stored result once symbols are applied
    pub fn symbols(&self) -> &[String] {
        &self.options.symbols
    }

    /// Compile report, once the compile step has returned
    pub fn report(&self) -> Option<&CompileReport> {
        self.report.as_ref()
    }

    /// Message of the error that sent the build to failure
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

/// Actions keyed by lower-cased id
#[derive(Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, Box<dyn BuildAction>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry of the built-in actions, created on first use
    pub fn builtin() -> &'static ActionRegistry {
        static BUILTIN: OnceLock<ActionRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| ActionRegistry::discover(&builtin_factories()))
    }

    /// Build a fresh registry from a factory table
    ///
    /// A factory that errors or yields an action with a blank id is skipped
    /// with a warning. Later actions replace earlier ones with the same id.
    pub fn discover(factories: &[ActionFactory]) -> Self {
        let mut registry = Self::new();
        for (index, factory) in factories.iter().enumerate() {
            let registered = factory().and_then(|action| registry.register(action));
            if let Err(e) = registered {
                warn!(factory = index, error = %e, "skipping action registrant");
            }
        }
        registry
    }

    /// Register an action, replacing any action with the same id
    pub fn register(&mut self, action: Box<dyn BuildAction>) -> BuildResult<()> {
        let key = action.id().trim().to_lowercase();
        if key.is_empty() {
            return Err(BuildError::Registration(
                "action id must not be blank".to_string(),
            ));
        }
        self.actions.insert(key, action);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn BuildAction> {
        self.actions
            .get(&id.trim().to_lowercase())
            .map(|action| action.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Registered actions ordered by id
    pub fn iter(&self) -> impl Iterator<Item = &dyn BuildAction> {
        self.actions.values().map(|action| action.as_ref())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl BuildAction for Named {
        fn id(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "second"
        }

        fn execute(&self, _context: &ActionContext<'_>) -> BuildResult<()> {
            Ok(())
        }
    }

    fn blank() -> BuildResult<Box<dyn BuildAction>> {
        Ok(Box::new(Named("  ")))
    }

    fn broken() -> BuildResult<Box<dyn BuildAction>> {
        Err(BuildError::Registration("needs arguments".to_string()))
    }

    fn duplicate() -> BuildResult<Box<dyn BuildAction>> {
        Ok(Box::new(Named("LOG-CONTEXT")))
    }

    #[test]
    fn test_builtin_registry() {
        let registry = ActionRegistry::builtin();
        assert!(registry.contains("log-context"));
        assert!(registry.contains("Write-Build-Info"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_discover_skips_bad_registrants() {
        let factories: [ActionFactory; 3] = [blank, LogContextAction::factory, broken];
        let registry = ActionRegistry::discover(&factories);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(" log-context "));
        assert!(!registry.contains(""));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let factories: [ActionFactory; 2] = [LogContextAction::factory, duplicate];
        let registry = ActionRegistry::discover(&factories);
        assert_eq!(registry.len(), 1);
        let action = registry.get("log-context").unwrap();
        assert_eq!(action.description(), "second");
    }

    #[test]
    fn test_register_rejects_blank_id() {
        let mut registry = ActionRegistry::new();
        let err = registry.register(Box::new(Named(""))).unwrap_err();
        assert!(matches!(err, BuildError::Registration(_)));
    }
}
