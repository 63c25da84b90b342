//! CLI for the mapfetch content fetcher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mapfetch_core::config::{self, MapfetchConfig};
use std::path::PathBuf;

use commands::{run_entries, run_fetch, run_resolve};

/// Top-level CLI for mapfetch.
#[derive(Debug, Parser)]
#[command(name = "mapfetch")]
#[command(about = "Fetch published map files and register them in a playlist manifest", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Look up a published file, download it and append it to the manifest.
    Fetch {
        /// Published file identifier.
        id: String,

        /// Output root (overrides config and OUTPUT_FOLDER).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Manifest XML file (overrides config and OUTPUT_XML_PATH).
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,

        /// Catalog details endpoint (overrides config and REQUEST_URL).
        #[arg(long, value_name = "URL")]
        catalog_url: Option<String>,
    },

    /// Show where a remote filename would be stored and how it is recorded.
    Resolve {
        /// Remote filename as reported by the catalog, e.g. "SubDir/map.gbx".
        filename: String,
    },

    /// List the file entries of a manifest.
    Entries {
        /// Manifest XML file (defaults to the configured one).
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch {
                id,
                output_dir,
                manifest,
                catalog_url,
            } => {
                let mut cfg = config::load_or_init()?;
                apply_flags(&mut cfg, output_dir, manifest, catalog_url);
                tracing::debug!("loaded config: {:?}", cfg);
                run_fetch(cfg, id).await?;
            }
            CliCommand::Resolve { filename } => run_resolve(&filename)?,
            CliCommand::Entries { manifest } => {
                let path = match manifest {
                    Some(p) => p,
                    None => config::load_or_init()?.manifest_path,
                };
                run_entries(&path)?;
            }
        }

        Ok(())
    }
}

/// Flags win over the config file and environment.
fn apply_flags(
    cfg: &mut MapfetchConfig,
    output_dir: Option<PathBuf>,
    manifest: Option<PathBuf>,
    catalog_url: Option<String>,
) {
    if let Some(dir) = output_dir {
        cfg.output_dir = dir;
    }
    if let Some(path) = manifest {
        cfg.manifest_path = path;
    }
    if let Some(url) = catalog_url {
        cfg.catalog_url = url;
    }
}

#[cfg(test)]
mod tests;
