//! Mapping of a catalog file name to its local, forward-slash target path.
//!
//! Downloads land flat under `Maps/Downloaded/`, keyed by basename only. Two remote
//! files with the same basename overwrite each other; no collision handling is done.

use std::fmt;

/// Logical subtree every downloaded map and every manifest record is relative to.
pub const SUBTREE_ROOT: &str = "Maps/";

/// Directory prefix applied to every remote file name that has a path component.
pub const DOWNLOAD_PREFIX: &str = "Maps/Downloaded/";

/// Local target path, relative to the output root, always using `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalTargetPath(String);

impl LocalTargetPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments in order; the last one is normally the file name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Text stored in the manifest: everything after the first `Maps/`.
    ///
    /// A path without the marker (a bare file name from the catalog) is returned whole,
    /// so a manifest entry is never empty.
    pub fn manifest_record(&self) -> &str {
        match self.0.split_once(SUBTREE_ROOT) {
            Some((_, rest)) => rest,
            None => &self.0,
        }
    }
}

impl fmt::Display for LocalTargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<LocalTargetPath> for String {
    fn from(p: LocalTargetPath) -> Self {
        p.0
    }
}

/// Resolves a remote file name (e.g. `SubDir/arena_map.gbx`) to its local target path.
///
/// A name without `/` is kept verbatim, with no prefix; otherwise the basename after the
/// last `/` is placed under [`DOWNLOAD_PREFIX`]. Total over any input.
pub fn resolve_target_path(filename: &str) -> LocalTargetPath {
    match filename.rfind('/') {
        None => LocalTargetPath(filename.to_string()),
        Some(idx) => LocalTargetPath(format!("{}{}", DOWNLOAD_PREFIX, &filename[idx + 1..])),
    }
}
