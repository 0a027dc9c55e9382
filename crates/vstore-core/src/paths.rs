//! Virtual path to physical path translation.
//!
//! A virtual path is the public address of a folder or file. Folder paths
//! always start and end with [`SEPARATOR`] (`/docs/reports/`); file paths
//! start with it and end with the on-disk file name (`/docs/<id>.pdf`).
//! The physical path is the storage root joined with the same non-empty
//! segments, so the disk tree mirrors the virtual tree exactly.
//!
//! Everything here is pure string/path manipulation. Names are assumed to
//! be validated already (see [`crate::validation`]).

use std::path::{Path, PathBuf};

/// The virtual path separator.
pub const SEPARATOR: char = '/';

/// Maps virtual paths onto a storage root and computes child paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTranslator {
    storage_root: PathBuf,
    virtual_base: String,
}

impl PathTranslator {
    /// Create a translator for the given storage root and virtual base.
    ///
    /// The base is normalised to start and end with the separator, so
    /// `""`, `"/"`, `"library"` and `"/library/"` are all accepted.
    pub fn new(storage_root: impl Into<PathBuf>, virtual_base: &str) -> Self {
        Self {
            storage_root: storage_root.into(),
            virtual_base: normalize_folder_path(virtual_base),
        }
    }

    /// The physical storage root.
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// The virtual prefix of root-level entries.
    pub fn virtual_base(&self) -> &str {
        &self.virtual_base
    }

    /// Physical location of a virtual path.
    pub fn to_physical(&self, virtual_path: &str) -> PathBuf {
        let mut path = self.storage_root.clone();
        for segment in segments(virtual_path) {
            path.push(segment);
        }
        path
    }

    /// Physical location rendered as the string stored in the catalog.
    pub fn storage_path(&self, virtual_path: &str) -> String {
        self.to_physical(virtual_path).to_string_lossy().into_owned()
    }

    /// Virtual path of a folder named `name` under `parent` (or the base).
    pub fn folder_path(&self, parent: Option<&str>, name: &str) -> String {
        format!("{}{name}{SEPARATOR}", self.prefix(parent))
    }

    /// Virtual path of a file body stored as `id + extension` under
    /// `folder` (or the base).
    pub fn file_path(&self, folder: Option<&str>, id: &str, extension: &str) -> String {
        format!("{}{id}{extension}", self.prefix(folder))
    }

    fn prefix(&self, parent: Option<&str>) -> String {
        let parent = parent.unwrap_or(&self.virtual_base);
        format!("{}{SEPARATOR}", parent.trim_end_matches(SEPARATOR))
    }
}

/// Non-empty segments of a virtual path.
pub fn segments(virtual_path: &str) -> impl Iterator<Item = &str> {
    virtual_path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// Normalise a folder path to `/seg/seg/` form (`/` for the empty path).
pub fn normalize_folder_path(path: &str) -> String {
    let joined: Vec<&str> = segments(path).collect();
    if joined.is_empty() {
        SEPARATOR.to_string()
    } else {
        format!("{SEPARATOR}{}{SEPARATOR}", joined.join("/"))
    }
}

/// The folder prefix containing `virtual_path`.
///
/// `/a/b/` gives `/a/`, `/a/x.pdf` gives `/a/`, `/a/` gives `/`.
pub fn parent_prefix(virtual_path: &str) -> String {
    let trimmed = virtual_path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => trimmed[..=idx].to_string(),
        None => SEPARATOR.to_string(),
    }
}

/// Every proper ancestor folder path of `virtual_path`, shortest first.
///
/// `/a/b/c/` gives `["/", "/a/", "/a/b/"]`.
pub fn ancestors(virtual_path: &str) -> Vec<String> {
    let parts: Vec<&str> = segments(virtual_path).collect();
    let mut out = Vec::with_capacity(parts.len());
    let mut current = SEPARATOR.to_string();
    out.push(current.clone());
    for part in parts.iter().take(parts.len().saturating_sub(1)) {
        current.push_str(part);
        current.push(SEPARATOR);
        out.push(current.clone());
    }
    out
}

/// Whether `candidate` is `ancestor` itself or lies beneath it.
///
/// `ancestor` must be a folder path (trailing separator), which makes the
/// test segment-aware: `/ab/` is not beneath `/a/`.
pub fn is_within(candidate: &str, ancestor: &str) -> bool {
    candidate.starts_with(ancestor) && ancestor.ends_with(SEPARATOR)
}

/// Replace the leading `old_prefix` of `path` with `new_prefix`.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    path.strip_prefix(old_prefix)
        .map(|rest| format!("{new_prefix}{rest}"))
}

/// The `.ext` suffix of a display name, or `""` when it has none.
///
/// Only the last suffix counts (`a.tar.gz` gives `.gz`); dot-files such as
/// `.bashrc` and names ending in a dot have no extension. Case is kept.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(idx) if idx + 1 == name.len() => String::new(),
        Some(idx) => name[idx..].to_string(),
    }
}
