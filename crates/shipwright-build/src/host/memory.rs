//! In-memory collaborators for previews and tests

use super::{Clock, CompileReport, CompileRequest, Compiler, SceneProvider, SettingsStore, SymbolStore};
use crate::error::{BuildError, BuildResult};
use crate::scope;
use crate::version::Version;
use chrono::NaiveDateTime;
use shipwright_config::SymbolGroup;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Settings held in memory
#[derive(Debug, Default)]
pub struct InMemorySettings {
    version: RefCell<String>,
    product_name: RefCell<String>,
    build_code: Cell<Option<u64>>,
    build_number: RefCell<Option<String>>,
}

impl InMemorySettings {
    pub fn new(product_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            version: RefCell::new(version.into()),
            product_name: RefCell::new(product_name.into()),
            ..Self::default()
        }
    }

    /// Numeric build code written by the last version bump
    pub fn build_code(&self) -> Option<u64> {
        self.build_code.get()
    }

    /// Build number string written by the last version bump
    pub fn build_number(&self) -> Option<String> {
        self.build_number.borrow().clone()
    }
}

impl SettingsStore for InMemorySettings {
    fn version(&self) -> String {
        self.version.borrow().clone()
    }

    fn set_version(&self, version: &str) -> BuildResult<()> {
        *self.version.borrow_mut() = version.to_string();
        Ok(())
    }

    fn set_build_numbers(&self, version: &Version) -> BuildResult<()> {
        self.build_code.set(Some(version.build_code()));
        *self.build_number.borrow_mut() = Some(version.to_string());
        Ok(())
    }

    fn product_name(&self) -> String {
        self.product_name.borrow().clone()
    }
}

/// Symbol groups held in memory
#[derive(Debug, Default)]
pub struct InMemorySymbols {
    groups: RefCell<BTreeMap<SymbolGroup, String>>,
}

impl InMemorySymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a group with a raw symbol string
    pub fn with_group(self, group: SymbolGroup, raw: impl Into<String>) -> Self {
        self.groups.borrow_mut().insert(group, raw.into());
        self
    }
}

impl SymbolStore for InMemorySymbols {
    fn symbols_raw(&self, group: SymbolGroup) -> String {
        self.groups.borrow().get(&group).cloned().unwrap_or_default()
    }

    fn set_symbols(&self, group: SymbolGroup, symbols: &BTreeSet<String>) -> BuildResult<()> {
        let joined = crate::symbols::join_symbols(symbols);
        self.groups.borrow_mut().insert(group, joined);
        Ok(())
    }
}

/// Fixed scene list
#[derive(Debug, Clone, Default)]
pub struct StaticScenes(pub Vec<String>);

impl StaticScenes {
    pub fn new<I, S>(scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(scenes.into_iter().map(Into::into).collect())
    }
}

impl SceneProvider for StaticScenes {
    fn enabled_scenes(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Compile step that returns a preset report
///
/// Records every request and whether it ran inside an internal build scope.
/// Optionally writes files into the build directory so packaging has
/// something to work on.
#[derive(Debug)]
pub struct ScriptedCompiler {
    report: CompileReport,
    error: Option<String>,
    files: Vec<(String, String)>,
    requests: RefCell<Vec<CompileRequest>>,
    internal_flags: RefCell<Vec<bool>>,
}

impl ScriptedCompiler {
    /// Compiler whose every call reports `report`
    pub fn new(report: CompileReport) -> Self {
        Self {
            report,
            error: None,
            files: Vec::new(),
            requests: RefCell::new(Vec::new()),
            internal_flags: RefCell::new(Vec::new()),
        }
    }

    /// Compiler that always succeeds
    pub fn succeeding() -> Self {
        Self::new(CompileReport::succeeded(0))
    }

    /// Compiler whose call returns an error instead of a report
    pub fn unavailable(message: impl Into<String>) -> Self {
        let mut compiler = Self::succeeding();
        compiler.error = Some(message.into());
        compiler
    }

    /// Write `contents` to `relative` inside the build directory on compile
    pub fn with_output_file(mut self, relative: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.push((relative.into(), contents.into()));
        self
    }

    pub fn requests(&self) -> Vec<CompileRequest> {
        self.requests.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }

    /// Whether each call observed an internal build scope
    pub fn internal_flags(&self) -> Vec<bool> {
        self.internal_flags.borrow().clone()
    }

    fn write_outputs(&self, request: &CompileRequest) -> BuildResult<()> {
        let build_dir = if request.platform.exports_directory() {
            request.output_path.as_path()
        } else {
            request.output_path.parent().unwrap_or(Path::new("."))
        };

        for (relative, contents) in &self.files {
            let path = build_dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
            }
            fs::write(&path, contents).map_err(|e| BuildError::io(&path, e))?;
        }
        Ok(())
    }
}

impl Compiler for ScriptedCompiler {
    fn compile(&self, request: &CompileRequest) -> BuildResult<CompileReport> {
        self.requests.borrow_mut().push(request.clone());
        self.internal_flags
            .borrow_mut()
            .push(scope::is_internal_build_in_progress());

        if let Some(message) = &self.error {
            return Err(BuildError::CompilerUnavailable(message.clone()));
        }

        self.write_outputs(request)?;
        Ok(self.report)
    }
}
