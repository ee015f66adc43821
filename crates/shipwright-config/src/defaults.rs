//! Starter configuration written by `shipwright init`

use crate::platform::Platform;
use crate::project::{
    ActionBinding, Configuration, Flag, FlagOverrides, PreprocessConfig, Profile, Stage,
    VersionMode,
};

/// Flags every starter profile exposes
const COMMON_FLAGS: [&str; 3] = ["demo-content", "skip-zip", "skip-version-bump"];

impl Configuration {
    /// Default configuration for a new project
    pub fn starter() -> Self {
        Self {
            last_profile: "dev".to_string(),
            preprocess: PreprocessConfig {
                profile: "dev".to_string(),
                ..PreprocessConfig::default()
            },
            profiles: starter_profiles(),
            flags: starter_flags(),
            actions: vec![
                ActionBinding::new("log-context", Stage::BeforeBuild),
                ActionBinding::new("log-context", Stage::AfterBuild),
            ],
            ..Configuration::default()
        }
    }
}

fn starter_profile(id: &str, display_name: &str, template: &str, symbols: &[&str]) -> Profile {
    Profile::new(id, Platform::Windows64)
        .with_display_name(display_name)
        .with_name_template(template)
        .with_version_mode(VersionMode::Patch)
        .with_symbols(symbols.iter().copied())
        .with_flags(COMMON_FLAGS)
}

fn starter_profiles() -> Vec<Profile> {
    vec![
        starter_profile("dev", "Dev", "{product}_{version}", &["TL_BUILD_DEV"]),
        starter_profile(
            "review_demo",
            "Review + Demo",
            "{product}_demo_review",
            &["TL_BUILD_REVIEW", "TL_BUILD_DEMO"],
        ),
        starter_profile(
            "release_demo",
            "Release + Demo",
            "{product}_demo_release",
            &["TL_BUILD_RELEASE", "TL_BUILD_DEMO"],
        ),
        starter_profile("review", "Review", "{product}_review", &["TL_BUILD_REVIEW"]),
        starter_profile(
            "release",
            "Release",
            "{product}_release",
            &["TL_BUILD_RELEASE"],
        ),
    ]
}

fn starter_flags() -> Vec<Flag> {
    vec![
        Flag::new("demo-content", false)
            .with_label("Demo Content")
            .with_description("Adds TL_BUILD_DEMO to the selected profile for this build.")
            .with_symbols(["TL_BUILD_DEMO"]),
        Flag::new("skip-zip", false)
            .with_label("Skip Zip")
            .with_description("Disables zip packaging for this build.")
            .with_overrides(FlagOverrides {
                zip_after_build: Some(false),
                ..FlagOverrides::default()
            }),
        Flag::new("skip-version-bump", false)
            .with_label("Skip Version Bump")
            .with_description("Keeps the current version for this build.")
            .with_overrides(FlagOverrides {
                increment_version: Some(false),
                ..FlagOverrides::default()
            }),
    ]
}
