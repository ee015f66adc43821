//! Pipeline configuration (shipwright.toml)
//!
//! Holds the profiles, option flags and action bindings of one project. The
//! configuration owns its profiles and flags; everything derived from them is
//! recomputed per build invocation.

use crate::platform::Platform;
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Default build output folder, relative to the project root
pub const DEFAULT_OUTPUT_FOLDER: &str = "BUILD";

/// Default name template used when a profile does not provide one
pub const DEFAULT_NAME_TEMPLATE: &str = "{product}_{profile}_{version}";

/// Root configuration aggregate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// Output root folder name (default: "BUILD")
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Profile selected last in the CLI; informational only
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_profile: String,

    /// Settings for builds started outside the orchestrator
    #[serde(default)]
    pub preprocess: PreprocessConfig,

    /// Build profiles, in declaration order
    #[serde(default)]
    pub profiles: Vec<Profile>,

    /// Option flags, in declaration order
    #[serde(default)]
    pub flags: Vec<Flag>,

    /// Global action bindings, run before profile bindings
    #[serde(default)]
    pub actions: Vec<ActionBinding>,
}

fn default_output_folder() -> String {
    DEFAULT_OUTPUT_FOLDER.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            last_profile: String::new(),
            preprocess: PreprocessConfig::default(),
            profiles: Vec::new(),
            flags: Vec::new(),
            actions: Vec::new(),
        }
    }
}

/// Preprocess hook configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PreprocessConfig {
    /// Bump the version on external builds
    #[serde(default = "default_true")]
    pub versioning: bool,
    /// Apply symbols on external builds
    #[serde(default = "default_true")]
    pub symbols: bool,
    /// Profile used for external builds
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub profile: String,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            versioning: true,
            symbols: true,
            profile: String::new(),
        }
    }
}

/// How the version string is advanced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionMode {
    None,
    #[default]
    Patch,
    Minor,
    Major,
}

impl VersionMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

/// Pipeline checkpoint at which bound actions run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    BeforeVersioning,
    AfterVersioning,
    BeforeSymbols,
    AfterSymbols,
    BeforeBuild,
    AfterBuild,
    BeforePackaging,
    AfterPackaging,
    OnSuccess,
    OnFailure,
}

impl Stage {
    /// Get stage name
    pub fn name(&self) -> &'static str {
        match self {
            Self::BeforeVersioning => "before-versioning",
            Self::AfterVersioning => "after-versioning",
            Self::BeforeSymbols => "before-symbols",
            Self::AfterSymbols => "after-symbols",
            Self::BeforeBuild => "before-build",
            Self::AfterBuild => "after-build",
            Self::BeforePackaging => "before-packaging",
            Self::AfterPackaging => "after-packaging",
            Self::OnSuccess => "on-success",
            Self::OnFailure => "on-failure",
        }
    }

    /// Get all stages in pipeline order
    pub fn all() -> [Stage; 10] {
        [
            Self::BeforeVersioning,
            Self::AfterVersioning,
            Self::BeforeSymbols,
            Self::AfterSymbols,
            Self::BeforeBuild,
            Self::AfterBuild,
            Self::BeforePackaging,
            Self::AfterPackaging,
            Self::OnSuccess,
            Self::OnFailure,
        ]
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Binding of an action id to a stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ActionBinding {
    /// Id of the action to run; unknown ids are skipped with a warning
    #[serde(rename = "action")]
    pub action_id: String,
    /// Stage the action runs at
    pub stage: Stage,
    /// Disabled bindings are ignored entirely
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ActionBinding {
    pub fn new(action_id: impl Into<String>, stage: Stage) -> Self {
        Self {
            action_id: action_id.into(),
            stage,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Build profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Unique id (case-insensitive)
    pub id: String,
    /// Display name (falls back to the id)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    /// Target platform
    #[serde(default)]
    pub platform: Platform,
    /// Build name template
    #[serde(default = "default_name_template")]
    pub name_template: String,
    /// Bump the version before building
    #[serde(default = "default_true")]
    pub increment_version: bool,
    /// Which version component to bump
    #[serde(default)]
    pub version_mode: VersionMode,
    /// Apply compile-time symbols before building
    #[serde(default = "default_true")]
    pub apply_symbols: bool,
    /// Symbols applied for this profile
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Zip the build directory after a successful build
    #[serde(default = "default_true")]
    pub zip_after_build: bool,
    /// Remove excluded directories from the build output
    #[serde(default = "default_true")]
    pub remove_excluded_dirs: bool,
    /// Directory names (or name suffixes) removed before packaging
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
    /// Opaque options forwarded to the compile step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compile_options: Vec<String>,
    /// Ids of the flags this profile exposes, in precedence order
    #[serde(default)]
    pub flags: Vec<String>,
    /// Profile action bindings
    #[serde(default)]
    pub actions: Vec<ActionBinding>,
}

fn default_name_template() -> String {
    DEFAULT_NAME_TEMPLATE.to_string()
}

/// Excluded directory names every new profile starts with
pub fn default_excluded_dirs() -> Vec<String> {
    vec![
        "do not ship".to_string(),
        "BurstDebugInformation_DoNotShip".to_string(),
    ]
}

impl Profile {
    /// Create a profile with default settings
    pub fn new(id: impl Into<String>, platform: Platform) -> Self {
        Self {
            id: id.into(),
            display_name: String::new(),
            platform,
            name_template: default_name_template(),
            increment_version: true,
            version_mode: VersionMode::Patch,
            apply_symbols: true,
            symbols: Vec::new(),
            zip_after_build: true,
            remove_excluded_dirs: true,
            excluded_dirs: default_excluded_dirs(),
            compile_options: Vec::new(),
            flags: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_name_template(mut self, template: impl Into<String>) -> Self {
        self.name_template = template.into();
        self
    }

    pub fn with_version_mode(mut self, mode: VersionMode) -> Self {
        self.version_mode = mode;
        self
    }

    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = clean_list(symbols.into_iter().map(Into::into), false);
        self
    }

    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = clean_list(flags.into_iter().map(Into::into), true);
        self
    }

    pub fn with_actions(mut self, actions: Vec<ActionBinding>) -> Self {
        self.actions = actions;
        self
    }

    /// Set the four behavior toggles at once
    pub fn with_toggles(
        mut self,
        increment_version: bool,
        apply_symbols: bool,
        zip_after_build: bool,
        remove_excluded_dirs: bool,
    ) -> Self {
        self.increment_version = increment_version;
        self.apply_symbols = apply_symbols;
        self.zip_after_build = zip_after_build;
        self.remove_excluded_dirs = remove_excluded_dirs;
        self
    }

    pub fn with_excluded_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_dirs = clean_list(names.into_iter().map(Into::into), true);
        self
    }

    /// Display name, or the id when none is set
    pub fn display_name(&self) -> &str {
        let name = self.display_name.trim();
        if name.is_empty() {
            self.id.trim()
        } else {
            name
        }
    }

    /// Name template, or the default when blank
    pub fn name_template(&self) -> &str {
        if self.name_template.trim().is_empty() {
            DEFAULT_NAME_TEMPLATE
        } else {
            &self.name_template
        }
    }

    /// Case-insensitive id comparison
    pub fn has_id(&self, id: &str) -> bool {
        !id.trim().is_empty() && self.id.trim().eq_ignore_ascii_case(id.trim())
    }

    fn normalize(&mut self) {
        self.id = self.id.trim().to_string();
        self.display_name = self.display_name.trim().to_string();
        self.symbols = clean_list(std::mem::take(&mut self.symbols), false);
        self.flags = clean_list(std::mem::take(&mut self.flags), true);
        self.excluded_dirs = clean_list(std::mem::take(&mut self.excluded_dirs), true);
    }
}

/// Optional decision overrides carried by a flag
///
/// An absent field never affects the decision; a present field replaces it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FlagOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment_version: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_symbols: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_after_build: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_excluded_dirs: Option<bool>,
}

impl FlagOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Optional build toggle exposed by profiles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Flag {
    /// Unique id (case-insensitive)
    pub id: String,
    /// Label (falls back to the id)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Initial state when the caller supplies no override
    #[serde(default)]
    pub default_enabled: bool,
    /// Symbols added while the flag is enabled
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Decision overrides applied while the flag is enabled
    #[serde(default, skip_serializing_if = "FlagOverrides::is_empty")]
    pub overrides: FlagOverrides,
}

impl Flag {
    pub fn new(id: impl Into<String>, default_enabled: bool) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            description: String::new(),
            default_enabled,
            symbols: Vec::new(),
            overrides: FlagOverrides::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = clean_list(symbols.into_iter().map(Into::into), false);
        self
    }

    pub fn with_overrides(mut self, overrides: FlagOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn label(&self) -> &str {
        let label = self.label.trim();
        if label.is_empty() {
            self.id.trim()
        } else {
            label
        }
    }

    pub fn has_id(&self, id: &str) -> bool {
        !id.trim().is_empty() && self.id.trim().eq_ignore_ascii_case(id.trim())
    }

    fn normalize(&mut self) {
        self.id = self.id.trim().to_string();
        self.label = self.label.trim().to_string();
        self.symbols = clean_list(std::mem::take(&mut self.symbols), false);
    }
}

impl Configuration {
    /// Load a configuration file, normalizing ids and lists
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::TomlParseError { error, .. } => ConfigError::TomlParseError {
                file: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration text
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
                file: Path::new(crate::CONFIG_FILE_NAME).to_path_buf(),
                error: e,
            })?;
        config.normalize();
        Ok(config)
    }

    /// Serialize to pretty TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Write the configuration to disk
    pub fn save_to_file(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write `last_profile` into an existing file, leaving every other line
    /// (comments and formatting included) untouched
    pub fn store_last_profile(path: &Path, profile_id: &str) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let value = toml::Value::String(profile_id.trim().to_string()).to_string();
        let updated = set_top_level_key(&content, "last_profile", &value);

        let check = Self::parse(&updated).map_err(|_| ConfigError::InvalidValue {
            field: "last_profile".to_string(),
            reason: format!("cannot update {} in place", path.display()),
        })?;
        if check.last_profile != profile_id.trim() {
            return Err(ConfigError::InvalidValue {
                field: "last_profile".to_string(),
                reason: format!("cannot update {} in place", path.display()),
            });
        }

        std::fs::write(path, updated)?;
        Ok(())
    }

    /// Trim ids and de-duplicate lists
    pub fn normalize(&mut self) {
        self.output_folder = self.output_folder.trim().to_string();
        self.last_profile = self.last_profile.trim().to_string();
        self.preprocess.profile = self.preprocess.profile.trim().to_string();
        for profile in &mut self.profiles {
            profile.normalize();
        }
        for flag in &mut self.flags {
            flag.normalize();
        }
    }

    /// Output root folder name, defaulting when blank
    pub fn output_folder_name(&self) -> &str {
        let name = self.output_folder.trim();
        if name.is_empty() {
            DEFAULT_OUTPUT_FOLDER
        } else {
            name
        }
    }

    /// Find a profile by id (case-insensitive)
    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.has_id(id))
    }

    /// Find a flag by id (case-insensitive)
    pub fn flag(&self, id: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.has_id(id))
    }

    /// First profile targeting the given platform
    pub fn first_profile_for_platform(&self, platform: &Platform) -> Option<&Profile> {
        self.profiles.iter().find(|p| &p.platform == platform)
    }

    /// Every symbol any profile or exposed flag can add
    pub fn managed_symbols(&self) -> BTreeSet<String> {
        let mut managed = BTreeSet::new();
        for profile in &self.profiles {
            for symbol in &profile.symbols {
                insert_symbol(&mut managed, symbol);
            }
            for flag in profile.flags.iter().filter_map(|id| self.flag(id)) {
                for symbol in &flag.symbols {
                    insert_symbol(&mut managed, symbol);
                }
            }
        }
        managed
    }

    /// Profile ids in declaration order
    pub fn profile_ids(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.id.as_str()).collect()
    }
}

fn insert_symbol(set: &mut BTreeSet<String>, symbol: &str) {
    let symbol = symbol.trim();
    if !symbol.is_empty() {
        set.insert(symbol.to_string());
    }
}

/// Trim entries, drop blanks, de-duplicate keeping first occurrence
fn clean_list<I>(values: I, ignore_case: bool) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = if ignore_case {
            trimmed.to_lowercase()
        } else {
            trimmed.to_string()
        };
        if seen.insert(key) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Replace the top-level `key = ...` line, or insert one before the first
/// table header
fn set_top_level_key(content: &str, key: &str, value: &str) -> String {
    let assignment = format!("{} = {}", key, value);
    let mut out = String::with_capacity(content.len() + assignment.len() + 1);
    let mut done = false;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if !done && trimmed.starts_with('[') {
            out.push_str(&assignment);
            out.push('\n');
            done = true;
        }
        let is_key = trimmed
            .strip_prefix(key)
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if !done && is_key {
            out.push_str(&assignment);
            if line.ends_with('\n') {
                out.push('\n');
            }
            done = true;
            continue;
        }
        out.push_str(line);
    }

    if !done {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&assignment);
        out.push('\n');
    }
    out
}
