//! Directory materialization for a target path.
//!
//! Walks the `/`-separated segments of a [`LocalTargetPath`] below an explicit base
//! directory, creating missing directories, and opens a writable sink at the terminal
//! segment. The process working directory is never changed.

use crate::error::FetchError;
use crate::target_path::LocalTargetPath;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writable file at the terminal segment of a target path.
#[derive(Debug)]
pub struct Sink {
    file: File,
    path: PathBuf,
}

impl Sink {
    /// On-disk location of the sink.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// How the terminal (file) segment of a target path is recognized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LeafRule {
    /// The final segment is the file; all earlier segments are directories.
    #[default]
    LastSegment,
    /// The first segment ending with this suffix (e.g. `.gbx`, any case) is the
    /// file; later segments are ignored.
    Suffix(String),
}

impl LeafRule {
    /// `Suffix` for a configured extension, `LastSegment` when none is configured.
    pub fn from_suffix(suffix: Option<&str>) -> Self {
        match suffix {
            Some(s) if !s.is_empty() => LeafRule::Suffix(s.to_lowercase()),
            _ => LeafRule::LastSegment,
        }
    }

    fn is_leaf(&self, segment: &str, is_last: bool) -> bool {
        match self {
            LeafRule::LastSegment => is_last,
            LeafRule::Suffix(ext) => segment.to_lowercase().ends_with(&ext.to_lowercase()),
        }
    }
}

/// Creates the directory chain of a target path under `base_dir` and opens the file sink.
#[derive(Debug, Clone)]
pub struct Materializer {
    base_dir: PathBuf,
    leaf: LeafRule,
}

impl Materializer {
    pub fn new(base_dir: impl Into<PathBuf>, leaf: LeafRule) -> Self {
        Self {
            base_dir: base_dir.into(),
            leaf,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute (base-joined) location of `target` on disk.
    pub fn local_path(&self, target: &LocalTargetPath) -> PathBuf {
        target
            .segments()
            .fold(self.base_dir.clone(), |acc, seg| acc.join(seg))
    }

    /// Ensures every directory segment of `target` exists and returns a truncated,
    /// writable sink at the terminal segment.
    ///
    /// Idempotent for the directory chain. Already-created directories are left in place
    /// if a later step fails.
    pub fn materialize(&self, target: &LocalTargetPath) -> Result<Sink, FetchError> {
        let segments: Vec<&str> = target.segments().collect();
        let mut cursor = self.base_dir.clone();

        for (i, segment) in segments.iter().enumerate() {
            let is_last = i + 1 == segments.len();
            if self.leaf.is_leaf(segment, is_last) {
                return open_sink(&cursor, segment);
            }
            cursor.push(segment);
            ensure_dir(&cursor)?;
        }

        Err(FetchError::filesystem(
            cursor,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no file segment in target path {}", target),
            ),
        ))
    }
}

fn ensure_dir(path: &Path) -> Result<(), FetchError> {
    if path.is_dir() {
        return Ok(());
    }
    tracing::debug!("creating folder {}", path.display());
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        // Lost a race with another creator; still fine if it is a directory now.
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(FetchError::filesystem(path, e)),
    }
}

fn open_sink(dir: &Path, name: &str) -> Result<Sink, FetchError> {
    let path = dir.join(name);
    if name.is_empty() {
        return Err(FetchError::filesystem(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "empty file name"),
        ));
    }
    tracing::debug!("creating file {}", path.display());
    match File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
    {
        Ok(file) => Ok(Sink { file, path }),
        Err(e) => Err(FetchError::filesystem(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use crate::target_path::resolve_target_path;

    #[test]
    fn creates_chain_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path(), LeafRule::LastSegment);
        let target = resolve_target_path("SubDir/arena_map.gbx");

        let mut sink = m.materialize(&target).unwrap();
        sink.write_all(b"GBX").unwrap();
        assert_eq!(sink.path(), m.local_path(&target));
        drop(sink);

        assert!(dir.path().join("Maps").is_dir());
        assert!(dir.path().join("Maps/Downloaded").is_dir());
        let written = fs::read(dir.path().join("Maps/Downloaded/arena_map.gbx")).unwrap();
        assert_eq!(written, b"GBX");
        assert_eq!(
            m.local_path(&target),
            dir.path().join("Maps").join("Downloaded").join("arena_map.gbx")
        );
    }

    #[test]
    fn materialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path(), LeafRule::LastSegment);
        let target = resolve_target_path("a/first.gbx");
        m.materialize(&target).unwrap();
        m.materialize(&target).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path().join("Maps/Downloaded"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, ["first.gbx"]);
        let roots: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn existing_file_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path(), LeafRule::LastSegment);
        let target = resolve_target_path("a/map.gbx");
        m.materialize(&target)
            .unwrap()
            .write_all(b"old and long")
            .unwrap();
        m.materialize(&target).unwrap().write_all(b"new").unwrap();
        assert_eq!(
            fs::read(dir.path().join("Maps/Downloaded/map.gbx")).unwrap(),
            b"new"
        );
    }

    #[test]
    fn bare_name_lands_in_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path(), LeafRule::LastSegment);
        m.materialize(&resolve_target_path("solo.gbx")).unwrap();
        assert!(dir.path().join("solo.gbx").is_file());
    }

    #[test]
    fn suffix_rule_stops_at_first_match() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path(), LeafRule::from_suffix(Some(".GBX")));
        let target = resolve_target_path("x/Track.Map.Gbx");
        m.materialize(&target).unwrap();
        assert!(dir.path().join("Maps/Downloaded/Track.Map.Gbx").is_file());
    }

    #[test]
    fn suffix_rule_matches_regardless_of_case() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path(), LeafRule::Suffix(".GBX".into()));
        m.materialize(&resolve_target_path("x/arena_map.gbx")).unwrap();
        assert!(dir.path().join("Maps/Downloaded/arena_map.gbx").is_file());
    }

    #[test]
    fn suffix_rule_without_match_fails() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path(), LeafRule::Suffix(".gbx".into()));
        let err = m
            .materialize(&resolve_target_path("x/readme.txt"))
            .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Filesystem);
    }

    #[test]
    fn empty_leaf_fails() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path(), LeafRule::LastSegment);
        let err = m.materialize(&resolve_target_path("SubDir/")).unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Filesystem);
        assert!(dir.path().join("Maps/Downloaded").is_dir());
    }

    #[test]
    fn file_in_place_of_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Maps"), b"not a dir").unwrap();
        let m = Materializer::new(dir.path(), LeafRule::LastSegment);
        let err = m
            .materialize(&resolve_target_path("a/map.gbx"))
            .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Filesystem);
    }

    #[test]
    fn from_suffix_defaults_to_last_segment() {
        assert_eq!(LeafRule::from_suffix(None), LeafRule::LastSegment);
        assert_eq!(LeafRule::from_suffix(Some("")), LeafRule::LastSegment);
        assert_eq!(
            LeafRule::from_suffix(Some(".Gbx")),
            LeafRule::Suffix(".gbx".into())
        );
    }
}
