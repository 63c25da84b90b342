//! `mapfetch fetch <ID>`: lookup, download and manifest append.

use anyhow::{Context, Result};
use mapfetch_core::config::MapfetchConfig;
use mapfetch_core::FetchCoordinator;

/// Runs one fetch on the blocking pool and prints the local target path.
pub async fn run_fetch(cfg: MapfetchConfig, id: String) -> Result<()> {
    let output_dir = cfg.output_dir.clone();
    let target = tokio::task::spawn_blocking(move || {
        FetchCoordinator::from_config(&cfg).fetch(&id)
    })
    .await
    .context("fetch task failed")??;

    println!("{}", output_dir.join(target.as_str()).display());
    Ok(())
}
