//! XML manifest upkeep: the index of every downloaded map.
//!
//! The manifest is a root element holding `<map><file>RELATIVE_PATH</file></map>` pairs
//! separated by newline text. Appends copy the existing root element byte-for-byte,
//! add one pair before the root end tag, and rewrite the file behind a fixed declaration.
//! Writes go to a `.part` sibling that is renamed over the file the manifest path
//! resolves to, carrying over its permissions.

mod parse;
mod splice;

pub use splice::XML_DECLARATION;

use crate::error::FetchError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Serializes read-modify-write cycles within this process. Other processes that edit
/// the same manifest must coordinate on their own.
static MANIFEST_LOCK: Mutex<()> = Mutex::new(());

/// Manifest file at a fixed path.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one `<map><file>record</file></map>` pair as the last child of the root.
    ///
    /// Fails with `ManifestParse` (nothing written) if the manifest is missing or not
    /// well formed, and with `ManifestWrite` if the new document cannot be persisted.
    pub fn append_entry(&self, record: &str) -> Result<(), FetchError> {
        let _guard = MANIFEST_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let text = self.read()?;
        let parsed = parse::parse_manifest(&text).map_err(|e| self.parse_error(e))?;
        tracing::debug!(
            entries = parsed.entries.len(),
            root = %parsed.root,
            "manifest parsed"
        );

        let node = splice::render_entry(record).map_err(|e| self.write_error(e))?;
        let updated = splice::splice_entry(&text, &parsed.root, &node)
            .ok_or_else(|| self.parse_error("root element not found"))?;

        // Replace the file the path points at, so a symlinked manifest stays a link.
        let target = fs::canonicalize(&self.path).map_err(|e| self.write_error(e))?;
        let perms = fs::metadata(&target)
            .map_err(|e| self.write_error(e))?
            .permissions();
        let tmp = part_path(&target);
        let persisted =
            write_part(&tmp, updated.as_bytes(), perms).and_then(|()| fs::rename(&tmp, &target));
        if let Err(e) = persisted {
            let _ = fs::remove_file(&tmp);
            return Err(self.write_error(e));
        }

        tracing::info!("manifest {} updated with {}", self.path.display(), record);
        Ok(())
    }

    /// Text of every `<map><file>` entry, in document order.
    pub fn entries(&self) -> Result<Vec<String>, FetchError> {
        let text = self.read()?;
        parse::parse_manifest(&text)
            .map(|p| p.entries)
            .map_err(|e| self.parse_error(e))
    }

    fn read(&self) -> Result<String, FetchError> {
        fs::read_to_string(&self.path).map_err(|e| self.parse_error(e))
    }

    fn parse_error(&self, reason: impl ToString) -> FetchError {
        FetchError::ManifestParse {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    fn write_error(&self, reason: impl ToString) -> FetchError {
        FetchError::ManifestWrite {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Writes the new document with the manifest's permissions before it is renamed in.
fn write_part(tmp: &Path, bytes: &[u8], perms: fs::Permissions) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(tmp)?;
    file.write_all(bytes)?;
    file.set_permissions(perms)?;
    file.sync_all()
}

/// Sibling path used while writing: `maps.xml` → `maps.xml.part`.
fn part_path(path: &Path) -> PathBuf {
    let mut o = path.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}
