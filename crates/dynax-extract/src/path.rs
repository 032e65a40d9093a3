use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::options::RenameFn;

/// Drop the archive's top-level directory (`package/` in registry tarballs).
///
/// A path with a single component has no root to strip and is kept as is.
/// Parent, root and prefix components are rejected outright rather than
/// normalized, so nothing can land outside the destination.
pub fn strip_package_root(entry_path: &Path) -> Result<PathBuf> {
    let mut parts = Vec::new();
    for component in entry_path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path(entry_path));
            }
        }
    }

    match parts.len() {
        0 => Err(unsafe_path(entry_path)),
        1 => Ok(PathBuf::from(parts[0])),
        _ => Ok(parts[1..].iter().collect()),
    }
}

/// Where a file entry is written under `dest`, with `rename` applied to its
/// basename.
pub fn destination_for(dest: &Path, entry_path: &Path, rename: &RenameFn) -> Result<PathBuf> {
    let relative = strip_package_root(entry_path)?;
    let name = relative
        .file_name()
        .map(|n| n.to_string_lossy())
        .ok_or_else(|| unsafe_path(entry_path))?;

    let renamed = rename(&name);
    if renamed.is_empty()
        || renamed == "."
        || renamed == ".."
        || renamed.contains(['/', '\\'])
    {
        return Err(unsafe_path(entry_path));
    }

    let mut target = dest.to_path_buf();
    if let Some(parent) = relative.parent().filter(|p| !p.as_os_str().is_empty()) {
        target.push(parent);
    }
    target.push(renamed);
    Ok(target)
}

fn unsafe_path(entry_path: &Path) -> Error {
    Error::UnsafeEntryPath {
        entry: entry_path.to_path_buf(),
    }
}
