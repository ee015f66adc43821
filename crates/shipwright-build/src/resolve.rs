//! Option resolution
//!
//! Merges a profile's defaults, its exposed flags and caller overrides into
//! one decision set, then derives the version, build name and paths.
//!
//! Precedence, later steps winning:
//! 1. profile toggles and symbols
//! 2. exposed flag defaults, then caller overrides for exposed flags only
//! 3. overrides of enabled flags, in the profile's declared flag order
//! 4. `force_zip`
//! 5. platforms without a symbol group never apply symbols

use crate::flags::FlagStates;
use crate::host::BuildEnvironment;
use crate::naming::{resolve_build_name, NameInputs};
use crate::version::Version;
use serde::Serialize;
use shipwright_config::{Configuration, Platform, Profile};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Decisions, identity and paths for one invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedOptions {
    pub profile_id: String,
    pub platform: Platform,
    pub increment_version: bool,
    pub apply_symbols: bool,
    pub zip_after_build: bool,
    pub remove_excluded_dirs: bool,
    /// State of every flag the profile exposes
    pub flags: FlagStates,
    /// Sorted, de-duplicated symbols wanted for this build
    pub symbols: Vec<String>,
    pub version_before: String,
    pub version_after: String,
    pub build_name: String,
    pub output_root: PathBuf,
    pub build_dir: PathBuf,
    pub zip_path: PathBuf,
}

impl ResolvedOptions {
    /// Symbols joined with `;`
    pub fn joined_symbols(&self) -> String {
        self.symbols.join(";")
    }
}

/// Default state of the flags a profile exposes
///
/// Ids that do not name a configured flag are skipped.
pub fn default_flag_state(config: &Configuration, profile: &Profile) -> FlagStates {
    let mut states = FlagStates::new();
    for flag in profile.flags.iter().filter_map(|id| config.flag(id)) {
        states.set(&flag.id, flag.default_enabled);
    }
    states
}

/// Resolve options for `profile`
pub fn resolve_options(
    config: &Configuration,
    profile: &Profile,
    overrides: Option<&FlagStates>,
    force_zip: bool,
    env: &BuildEnvironment<'_>,
) -> ResolvedOptions {
    let mut increment_version = profile.increment_version;
    let mut apply_symbols = profile.apply_symbols;
    let mut zip_after_build = profile.zip_after_build;
    let mut remove_excluded_dirs = profile.remove_excluded_dirs;
    let mut symbols: Vec<String> = profile.symbols.clone();

    let mut flags = default_flag_state(config, profile);
    if let Some(overrides) = overrides {
        for (id, enabled) in overrides.iter() {
            if flags.contains(id) {
                flags.set(id, enabled);
            }
        }
    }

    for id in flags.enabled_ids() {
        let Some(flag) = config.flag(id) else {
            continue;
        };
        let o = &flag.overrides;
        if let Some(value) = o.increment_version {
            increment_version = value;
        }
        if let Some(value) = o.apply_symbols {
            apply_symbols = value;
        }
        if let Some(value) = o.zip_after_build {
            zip_after_build = value;
        }
        if let Some(value) = o.remove_excluded_dirs {
            remove_excluded_dirs = value;
        }
        symbols.extend(flag.symbols.iter().cloned());
    }

    if force_zip {
        zip_after_build = true;
    }

    let version_before = env.current_version();
    let version_after = if increment_version {
        Version::parse(&version_before)
            .next(profile.version_mode)
            .to_string()
    } else {
        version_before.clone()
    };

    let product = env.product_name();
    let build_name = resolve_build_name(&NameInputs {
        profile,
        product: &product,
        version: &version_after,
        flags: &flags,
        now: env.clock.now(),
    });

    let output_root = env.project_root.join(config.output_folder_name());
    let build_dir = output_root.join(&build_name);
    let zip_path = output_root.join(format!("{}.zip", build_name));

    let symbols: Vec<String> = symbols
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if profile.platform.symbol_group().is_none() {
        apply_symbols = false;
    }

    ResolvedOptions {
        profile_id: profile.id.clone(),
        platform: profile.platform.clone(),
        increment_version,
        apply_symbols,
        zip_after_build,
        remove_excluded_dirs,
        flags,
        symbols,
        version_before,
        version_after,
        build_name,
        output_root,
        build_dir,
        zip_path,
    }
}
