//! File-backed project settings (`project-settings.toml`)

use super::{SceneProvider, SettingsStore, SymbolStore};
use crate::error::{BuildError, BuildResult};
use crate::symbols::join_symbols;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use shipwright_config::SymbolGroup;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the project settings store
pub const SETTINGS_FILE_NAME: &str = "project-settings.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SettingsData {
    #[serde(default)]
    product_name: String,

    #[serde(default)]
    version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    build_code: Option<u64>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    build_number: String,

    /// Raw symbol strings keyed by group name
    #[serde(default)]
    symbols: BTreeMap<String, String>,

    #[serde(default)]
    compiler: CompilerSection,

    #[serde(default)]
    scenes: Vec<SceneEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CompilerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SceneEntry {
    path: String,
    #[serde(default = "default_true")]
    enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Settings store, symbol store and scene list backed by one TOML file
///
/// Every mutation is written back to disk immediately. A missing file reads
/// as empty settings and is created on the first write.
#[derive(Debug)]
pub struct ProjectSettingsFile {
    path: PathBuf,
    data: RefCell<SettingsData>,
}

impl ProjectSettingsFile {
    /// Open the settings file in a project root
    pub fn open(project_root: &Path) -> BuildResult<Self> {
        Self::load(&project_root.join(SETTINGS_FILE_NAME))
    }

    /// Load settings from an explicit path
    pub fn load(path: &Path) -> BuildResult<Self> {
        let data = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
            toml::from_str(&content)
                .map_err(|e| BuildError::settings(format!("{}: {}", path.display(), e)))?
        } else {
            SettingsData::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            data: RefCell::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shell command used by the compile step, if configured
    pub fn compiler_command(&self) -> Option<String> {
        self.data
            .borrow()
            .compiler
            .command
            .as_ref()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    }

    /// Last written numeric build code
    pub fn build_code(&self) -> Option<u64> {
        self.data.borrow().build_code
    }

    /// Last written build number string
    pub fn build_number(&self) -> String {
        self.data.borrow().build_number.clone()
    }

    pub fn set_product_name(&self, name: &str) -> BuildResult<()> {
        self.data.borrow_mut().product_name = name.trim().to_string();
        self.save()
    }

    /// Append a scene to the scene list
    pub fn add_scene(&self, path: &str, enabled: bool) -> BuildResult<()> {
        self.data.borrow_mut().scenes.push(SceneEntry {
            path: path.to_string(),
            enabled,
        });
        self.save()
    }

    fn save(&self) -> BuildResult<()> {
        let content = toml::to_string_pretty(&*self.data.borrow())
            .map_err(|e| BuildError::settings(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
            }
        }
        fs::write(&self.path, content).map_err(|e| BuildError::io(&self.path, e))
    }
}

impl SettingsStore for ProjectSettingsFile {
    fn version(&self) -> String {
        self.data.borrow().version.clone()
    }

    fn set_version(&self, version: &str) -> BuildResult<()> {
        self.data.borrow_mut().version = version.to_string();
        self.save()
    }

    fn set_build_numbers(&self, version: &Version) -> BuildResult<()> {
        {
            let mut data = self.data.borrow_mut();
            data.build_code = Some(version.build_code());
            data.build_number = version.to_string();
        }
        self.save()
    }

    fn product_name(&self) -> String {
        self.data.borrow().product_name.clone()
    }
}

impl SymbolStore for ProjectSettingsFile {
    fn symbols_raw(&self, group: SymbolGroup) -> String {
        self.data
            .borrow()
            .symbols
            .get(group.name())
            .cloned()
            .unwrap_or_default()
    }

    fn set_symbols(&self, group: SymbolGroup, symbols: &BTreeSet<String>) -> BuildResult<()> {
        self.data
            .borrow_mut()
            .symbols
            .insert(group.name().to_string(), join_symbols(symbols));
        self.save()
    }
}

impl SceneProvider for ProjectSettingsFile {
    fn enabled_scenes(&self) -> Vec<String> {
        self.data
            .borrow()
            .scenes
            .iter()
            .filter(|s| s.enabled && !s.path.trim().is_empty())
            .map(|s| s.path.trim().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
product_name = "Tidal"
version = "1.4.2"

[symbols]
standalone = "EXTERNAL;TL_BUILD_DEV"

[compiler]
command = "make player"

[[scenes]]
path = "Scenes/Boot.scene"

[[scenes]]
path = "Scenes/Debug.scene"
enabled = false

[[scenes]]
path = "Scenes/Main.scene"
"#;

    fn write_sample(dir: &TempDir) -> ProjectSettingsFile {
        fs::write(dir.path().join(SETTINGS_FILE_NAME), SAMPLE).unwrap();
        ProjectSettingsFile::open(dir.path()).unwrap()
    }

    #[test]
    fn test_reads_values() {
        let temp = TempDir::new().unwrap();
        let settings = write_sample(&temp);

        assert_eq!(settings.product_name(), "Tidal");
        assert_eq!(settings.version(), "1.4.2");
        assert_eq!(settings.compiler_command().as_deref(), Some("make player"));
        assert_eq!(
            settings.symbols_raw(SymbolGroup::Standalone),
            "EXTERNAL;TL_BUILD_DEV"
        );
        assert_eq!(settings.symbols_raw(SymbolGroup::Android), "");
        assert_eq!(
            settings.enabled_scenes(),
            vec!["Scenes/Boot.scene", "Scenes/Main.scene"]
        );
    }

    #[test]
    fn test_mutations_persist() {
        let temp = TempDir::new().unwrap();
        let settings = write_sample(&temp);

        settings.set_version("1.4.3").unwrap();
        settings
            .set_build_numbers(&Version::parse("1.4.3"))
            .unwrap();
        let symbols: BTreeSet<String> = ["A".to_string(), "B".to_string()].into();
        settings.set_symbols(SymbolGroup::Android, &symbols).unwrap();

        let reloaded = ProjectSettingsFile::open(temp.path()).unwrap();
        assert_eq!(reloaded.version(), "1.4.3");
        assert_eq!(reloaded.build_code(), Some(10_403));
        assert_eq!(reloaded.build_number(), "1.4.3");
        assert_eq!(reloaded.symbols_raw(SymbolGroup::Android), "A;B");
        assert_eq!(reloaded.enabled_scenes().len(), 2);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let settings = ProjectSettingsFile::open(temp.path()).unwrap();

        assert_eq!(settings.version(), "");
        assert!(settings.enabled_scenes().is_empty());
        assert!(settings.compiler_command().is_none());
        assert!(!settings.path().exists());

        settings.set_product_name("Tidal").unwrap();
        assert!(settings.path().exists());
    }

    #[test]
    fn test_invalid_toml_is_settings_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SETTINGS_FILE_NAME), "version = [").unwrap();

        let err = ProjectSettingsFile::open(temp.path()).unwrap_err();
        assert!(matches!(err, BuildError::Settings(_)));
    }
}
