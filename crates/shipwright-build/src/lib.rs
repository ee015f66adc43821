//! Shipwright build pipeline
//!
//! Turns a profile from `shipwright.toml` into one build:
//! - Option resolution (profile toggles, exposed flags, caller overrides)
//! - Semantic version bumps written back to the project settings
//! - Managed compile-time symbols reconciled per platform group
//! - Build names from templates, sanitized for the file system
//! - Staged actions around a single compile call
//! - Excluded directory cleanup and zip packaging
//! - A preprocess hook for builds the host starts on its own
//!
//! The host project is reached only through the traits in [`host`].

pub mod action;
pub mod error;
pub mod flags;
pub mod host;
pub mod naming;
pub mod packaging;
pub mod pipeline;
pub mod preprocess;
pub mod resolve;
pub mod scope;
pub mod symbols;
pub mod validate;
pub mod version;

// Re-export main types
pub use action::{ActionContext, ActionFactory, ActionRegistry, BuildAction};
pub use error::{BuildError, BuildResult};
pub use flags::FlagStates;
pub use host::{
    BuildEnvironment, Clock, CommandCompiler, CompileOutcome, CompileReport, CompileRequest,
    Compiler, ProjectSettingsFile, SceneProvider, SettingsStore, SymbolStore, SystemClock,
};
pub use naming::{make_safe_file_name, resolve_build_name, resolve_template, NameInputs};
pub use pipeline::{
    apply_symbols_only, apply_version, execute_build, increment_version_only, preview,
    BuildPreview, ExecutionRequest, ExecutionResult,
};
pub use preprocess::{run_preprocess, PreprocessOutcome};
pub use resolve::{default_flag_state, resolve_options, ResolvedOptions};
pub use scope::{is_internal_build_in_progress, InternalBuildScope};
pub use symbols::{apply_managed_symbols, join_symbols, parse_symbols, reconcile};
pub use validate::{validate_config, validate_profile, ValidationReport};
pub use version::{next_version, normalize, Version};
