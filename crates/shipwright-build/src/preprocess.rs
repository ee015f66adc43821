//! Hook for builds started outside the orchestrator
//!
//! When the host starts a build on its own, the project can still bump its
//! version and apply symbols for a chosen profile. Packaging never happens
//! here. Builds started by [`crate::pipeline::execute_build`] are detected
//! through the internal build scope and left alone.

use crate::error::BuildResult;
use crate::host::BuildEnvironment;
use crate::pipeline::apply_version;
use crate::resolve::resolve_options;
use crate::scope::is_internal_build_in_progress;
use crate::symbols::apply_managed_symbols;
use shipwright_config::{Configuration, Platform, Profile};
use tracing::{debug, info};

/// What the hook did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessOutcome {
    /// An orchestrated build is running
    Skipped,
    /// The configuration has no profiles
    NoProfile,
    Ran {
        profile_id: String,
        version_before: String,
        version_after: String,
        symbols_applied: bool,
    },
}

/// Profile used for an external build targeting `platform`
///
/// The configured preprocess profile wins, then the last selected profile if
/// it targets the same platform, then the first profile for the platform,
/// then the first profile.
pub fn select_profile<'c>(config: &'c Configuration, platform: &Platform) -> Option<&'c Profile> {
    let configured = config.preprocess.profile.trim();
    if !configured.is_empty() {
        if let Some(profile) = config.profile(configured) {
            return Some(profile);
        }
    }

    let last = config.last_profile.trim();
    if !last.is_empty() {
        if let Some(profile) = config.profile(last).filter(|p| &p.platform == platform) {
            return Some(profile);
        }
    }

    config
        .first_profile_for_platform(platform)
        .or_else(|| config.profiles.first())
}

/// Run the preprocess hook for an external build
pub fn run_preprocess(
    config: &Configuration,
    platform: &Platform,
    env: &BuildEnvironment<'_>,
) -> BuildResult<PreprocessOutcome> {
    if is_internal_build_in_progress() {
        debug!("orchestrated build in progress, preprocess skipped");
        return Ok(PreprocessOutcome::Skipped);
    }

    let Some(profile) = select_profile(config, platform) else {
        return Ok(PreprocessOutcome::NoProfile);
    };

    let options = resolve_options(config, profile, None, false, env);
    let version_before = options.version_before.clone();
    let mut version_after = version_before.clone();

    if config.preprocess.versioning && options.increment_version {
        version_after = apply_version(env.settings, &options.version_after)?;
    }

    let symbols_applied = config.preprocess.symbols && options.apply_symbols;
    if symbols_applied {
        apply_managed_symbols(
            env.symbols,
            profile.platform.symbol_group(),
            config.managed_symbols(),
            &options.symbols,
        )?;
    }

    info!(
        profile = %profile.id,
        platform = %platform,
        version_before = %version_before,
        version_after = %version_after,
        symbols_applied,
        "preprocess finished"
    );

    Ok(PreprocessOutcome::Ran {
        profile_id: profile.id.clone(),
        version_before,
        version_after,
        symbols_applied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> Configuration {
        let mut config = Configuration::default();
        config.profiles = vec![
            Profile::new("win-dev", Platform::Windows64),
            Profile::new("android", Platform::Android),
            Profile::new("win-release", Platform::Windows64),
        ];
        config
    }

    #[test]
    fn test_select_configured_profile() {
        let mut config = config();
        config.preprocess.profile = "WIN-RELEASE".to_string();
        let profile = select_profile(&config, &Platform::Android).unwrap();
        assert_eq!(profile.id, "win-release");
    }

    #[test]
    fn test_select_last_profile_only_for_same_platform() {
        let mut config = config();
        config.last_profile = "win-release".to_string();

        assert_eq!(
            select_profile(&config, &Platform::Windows64).unwrap().id,
            "win-release"
        );
        assert_eq!(
            select_profile(&config, &Platform::Android).unwrap().id,
            "android"
        );
    }

    #[test]
    fn test_select_falls_back_to_first_profile() {
        let config = config();
        assert_eq!(
            select_profile(&config, &Platform::WebGl).unwrap().id,
            "win-dev"
        );
        assert!(select_profile(&Configuration::default(), &Platform::WebGl).is_none());
    }

    #[test]
    fn test_unknown_configured_profile_falls_through() {
        let mut config = config();
        config.preprocess.profile = "ghost".to_string();
        assert_eq!(
            select_profile(&config, &Platform::Android).unwrap().id,
            "android"
        );
    }
}
