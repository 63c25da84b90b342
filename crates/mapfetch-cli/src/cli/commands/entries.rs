//! `mapfetch entries`: list manifest file entries in document order.

use anyhow::Result;
use mapfetch_core::manifest::ManifestStore;
use std::path::Path;

pub fn run_entries(path: &Path) -> Result<()> {
    let entries = ManifestStore::new(path).entries()?;
    if entries.is_empty() {
        println!("No entries in {}.", path.display());
    } else {
        for entry in entries {
            println!("{}", entry);
        }
    }
    Ok(())
}
