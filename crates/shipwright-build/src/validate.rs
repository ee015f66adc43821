//! Configuration validation
//!
//! Errors block a build; warnings are reported and the build proceeds.

use crate::action::ActionRegistry;
use serde::Serialize;
use shipwright_config::{ActionBinding, Configuration, Profile};
use std::collections::HashSet;

/// Errors and warnings found in a configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors joined one per line
    pub fn error_message(&self) -> String {
        self.errors.join("\n")
    }
}

/// Validate the whole configuration
pub fn validate_config(config: &Configuration, registry: &ActionRegistry) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.profiles.is_empty() {
        report
            .errors
            .push("No build profiles are configured".to_string());
        return report;
    }

    validate_profile_ids(config, &mut report);
    validate_flag_ids(config, &mut report);

    validate_bindings("Global actions", &config.actions, registry, &mut report);
    for profile in &config.profiles {
        let owner = format!("Profile '{}'", profile.display_name());
        validate_bindings(&owner, &profile.actions, registry, &mut report);
    }

    report
}

/// Validate the configuration and one profile in it
pub fn validate_profile(
    config: &Configuration,
    profile: &Profile,
    registry: &ActionRegistry,
) -> ValidationReport {
    let mut report = validate_config(config, registry);
    if !report.is_valid() {
        return report;
    }

    if profile.id.trim().is_empty() {
        report.errors.push("Profile has no id".to_string());
    }

    if profile.platform.symbol_group().is_none() {
        report.warnings.push(format!(
            "Profile '{}' targets platform '{}' which has no symbol group; symbols will not be applied",
            profile.display_name(),
            profile.platform
        ));
    }

    for flag_id in &profile.flags {
        if config.flag(flag_id).is_none() {
            report.errors.push(format!(
                "Profile '{}' references missing flag '{}'",
                profile.display_name(),
                flag_id
            ));
        }
    }

    report
}

fn validate_profile_ids(config: &Configuration, report: &mut ValidationReport) {
    let mut seen = HashSet::new();
    for profile in &config.profiles {
        let id = profile.id.trim();
        if id.is_empty() {
            report.errors.push(format!(
                "Profile '{}' has no id",
                profile.display_name.trim()
            ));
            continue;
        }
        if !seen.insert(id.to_lowercase()) {
            report
                .errors
                .push(format!("Duplicate profile id: '{}'", id));
        }
    }
}

fn validate_flag_ids(config: &Configuration, report: &mut ValidationReport) {
    let mut seen = HashSet::new();
    for flag in &config.flags {
        let id = flag.id.trim();
        if id.is_empty() {
            report.errors.push("A flag has no id".to_string());
            continue;
        }
        if !seen.insert(id.to_lowercase()) {
            report.errors.push(format!("Duplicate flag id: '{}'", id));
        }
    }
}

fn validate_bindings(
    owner: &str,
    bindings: &[ActionBinding],
    registry: &ActionRegistry,
    report: &mut ValidationReport,
) {
    for binding in bindings.iter().filter(|b| b.enabled) {
        let id = binding.action_id.trim();
        if id.is_empty() {
            report
                .errors
                .push(format!("{}: action binding without an action id", owner));
            continue;
        }
        if !registry.contains(id) {
            report.warnings.push(format!(
                "{}: action '{}' is not registered and will be skipped",
                owner, id
            ));
        }
    }
}
