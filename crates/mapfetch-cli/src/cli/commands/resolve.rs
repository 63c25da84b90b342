//! `mapfetch resolve <FILENAME>`: show target path and manifest record.

use anyhow::Result;
use mapfetch_core::resolve_target_path;

pub fn run_resolve(filename: &str) -> Result<()> {
    let target = resolve_target_path(filename);
    println!("{:<8} {}", "PATH", target);
    println!("{:<8} {}", "RECORD", target.manifest_record());
    Ok(())
}
