//! Build directory preparation, cleanup and zip packaging

use crate::error::{BuildError, BuildResult};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Suffix of debug-information directories that never ship in a zip
pub const BURST_DEBUG_SUFFIX: &str = "BurstDebugInformation_DoNotShip";

/// Delete the build directory if present and create it empty
pub fn ensure_build_directory(build_dir: &Path) -> BuildResult<()> {
    if build_dir.as_os_str().is_empty() {
        return Err(BuildError::io(
            build_dir,
            io::Error::new(io::ErrorKind::InvalidInput, "build directory path is empty"),
        ));
    }

    delete_directory_if_exists(build_dir)?;
    fs::create_dir_all(build_dir).map_err(|e| BuildError::io(build_dir, e))
}

/// Delete a zip file if present
pub fn delete_zip_if_exists(zip_path: &Path) -> BuildResult<()> {
    if !zip_path.is_file() {
        return Ok(());
    }
    make_writable(zip_path).map_err(|e| BuildError::io(zip_path, e))?;
    fs::remove_file(zip_path).map_err(|e| BuildError::io(zip_path, e))
}

/// Recursively delete a directory, clearing read-only permissions first
pub fn delete_directory_if_exists(dir: &Path) -> BuildResult<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    clear_read_only(dir)?;
    fs::remove_dir_all(dir).map_err(|e| BuildError::io(dir, e))
}

/// Remove every directory under `root` whose name equals or ends with one of
/// `names` (case-insensitive); returns how many were removed
pub fn remove_directories_by_name<I, S>(root: &Path, names: I) -> BuildResult<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names: Vec<String> = names
        .into_iter()
        .map(|n| n.as_ref().trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();

    if names.is_empty() || !root.is_dir() {
        return Ok(0);
    }

    remove_matching(root, |dir_name| {
        names.iter().any(|target| dir_name.ends_with(target.as_str()))
    })
}

/// Remove debug-information directories that must not ship
pub fn remove_burst_debug_directories(root: &Path) -> BuildResult<usize> {
    if !root.is_dir() {
        return Ok(0);
    }
    let suffix = BURST_DEBUG_SUFFIX.to_lowercase();
    remove_matching(root, |dir_name| dir_name.ends_with(suffix.as_str()))
}

fn remove_matching<F>(root: &Path, matches: F) -> BuildResult<usize>
where
    F: Fn(&str) -> bool,
{
    let mut found: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| BuildError::io(root, e.into()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if matches(&name) {
            found.push(entry.into_path());
        }
    }

    // Deepest first, so nested matches go before their parents
    found.sort_by_key(|path| std::cmp::Reverse(path.as_os_str().len()));

    for dir in &found {
        debug!(path = %dir.display(), "removing excluded directory");
        delete_directory_if_exists(dir)?;
    }

    Ok(found.len())
}

/// Zip the contents of `source_dir` into `zip_path`
///
/// Entries are relative to `source_dir`; the directory itself is not an
/// entry. An existing archive is replaced.
pub fn create_zip(source_dir: &Path, zip_path: &Path) -> BuildResult<()> {
    if !source_dir.is_dir() {
        return Err(BuildError::BuildDirectoryNotFound(source_dir.to_path_buf()));
    }

    if let Some(parent) = zip_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
    }
    delete_zip_if_exists(zip_path)?;

    let file = File::create(zip_path).map_err(|e| BuildError::io(zip_path, e))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0usize;
    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| BuildError::io(source_dir, e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| BuildError::io(entry.path(), io::Error::other(e)))?;
        let name = relative.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            let mut source =
                File::open(entry.path()).map_err(|e| BuildError::io(entry.path(), e))?;
            io::copy(&mut source, &mut zip).map_err(|e| BuildError::io(entry.path(), e))?;
        }
        entries += 1;
    }

    zip.finish()?;
    info!(zip = %zip_path.display(), entries, "created archive");
    Ok(())
}

fn clear_read_only(root: &Path) -> BuildResult<()> {
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| BuildError::io(root, e.into()))?;
        if entry.path_is_symlink() {
            continue;
        }
        make_writable(entry.path()).map_err(|e| BuildError::io(entry.path(), e))?;
    }
    Ok(())
}

fn make_writable(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    if !permissions.readonly() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(permissions.mode() | 0o200);
    }
    #[cfg(not(unix))]
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);

    fs::set_permissions(path, permissions)
}
