//! Fetch orchestration: lookup → resolve → materialize → download ∥ manifest append.
//!
//! One fetch is at-most-once and not atomic. A failure can leave an empty or partial
//! file, a half-created directory chain, or a manifest entry for a file whose download
//! failed; nothing is rolled back.

use crate::catalog::{CatalogClient, CatalogLookup};
use crate::config::MapfetchConfig;
use crate::error::FetchError;
use crate::manifest::ManifestStore;
use crate::materialize::{LeafRule, Materializer};
use crate::target_path::{resolve_target_path, LocalTargetPath};
use crate::transport::{ByteTransport, HttpTransport};
use std::time::Duration;

/// Runs single fetches against one catalog, output tree and manifest.
pub struct FetchCoordinator<C, T> {
    catalog: C,
    transport: T,
    materializer: Materializer,
    manifest: ManifestStore,
}

impl FetchCoordinator<CatalogClient, HttpTransport> {
    /// Wires the curl-backed catalog and transport from config.
    pub fn from_config(cfg: &MapfetchConfig) -> Self {
        let timeout = Duration::from_secs(cfg.connect_timeout_secs);
        Self::new(
            CatalogClient::new(cfg.catalog_url.clone(), timeout),
            HttpTransport::new(timeout),
            Materializer::new(
                cfg.output_dir.clone(),
                LeafRule::from_suffix(cfg.leaf_suffix.as_deref()),
            ),
            ManifestStore::new(cfg.manifest_path.clone()),
        )
    }
}

impl<C, T> FetchCoordinator<C, T>
where
    C: CatalogLookup,
    T: ByteTransport + Sync,
{
    pub fn new(
        catalog: C,
        transport: T,
        materializer: Materializer,
        manifest: ManifestStore,
    ) -> Self {
        Self {
            catalog,
            transport,
            materializer,
            manifest,
        }
    }

    pub fn manifest(&self) -> &ManifestStore {
        &self.manifest
    }

    /// Fetches published file `id` and records it in the manifest.
    ///
    /// The download and the manifest append start together and both must finish; the
    /// download error wins when both fail. A lookup failure touches nothing on disk.
    pub fn fetch(&self, id: &str) -> Result<LocalTargetPath, FetchError> {
        let descriptor = self.catalog.lookup(id)?;
        let target = resolve_target_path(&descriptor.filename);
        tracing::debug!("resolved {} to {}", descriptor.filename, target);

        let mut sink = self.materializer.materialize(&target)?;
        let url = descriptor.file_url.as_str();

        let transport = &self.transport;
        let (downloaded, appended) = std::thread::scope(|s| {
            let download = s.spawn(move || transport.download(url, &mut sink));
            let appended = self.manifest.append_entry(target.manifest_record());
            let downloaded = download
                .join()
                .unwrap_or_else(|_| Err(FetchError::network(url, "download thread panicked")));
            (downloaded, appended)
        });

        let bytes = downloaded?;
        appended?;
        tracing::info!(id, bytes, "fetched {} into {}", url, target);
        Ok(target)
    }
}
