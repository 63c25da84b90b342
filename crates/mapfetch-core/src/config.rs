use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Catalog endpoint used when neither the config file nor `REQUEST_URL` names one.
pub const DEFAULT_CATALOG_URL: &str =
    "https://api.steampowered.com/ISteamRemoteStorage/GetPublishedFileDetails/v1/";

/// Environment variables that override the file, named as the surrounding pipeline sets them.
pub const ENV_OUTPUT_FOLDER: &str = "OUTPUT_FOLDER";
pub const ENV_OUTPUT_XML_PATH: &str = "OUTPUT_XML_PATH";
pub const ENV_REQUEST_URL: &str = "REQUEST_URL";

/// Global configuration loaded from `~/.config/mapfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapfetchConfig {
    /// Output root; target paths such as `Maps/Downloaded/x.gbx` are created below it.
    pub output_dir: PathBuf,
    /// Manifest XML file that receives one `<map><file>` entry per download.
    pub manifest_path: PathBuf,
    /// Catalog details endpoint (form POST, JSON response).
    pub catalog_url: String,
    /// Optional file-extension suffix marking the terminal segment (e.g. ".gbx").
    /// None = the last path segment is always the file.
    #[serde(default)]
    pub leaf_suffix: Option<String>,
    /// Connect timeout for catalog and download requests, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for MapfetchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("UserData"),
            manifest_path: PathBuf::from("UserData/Maps/MatchSettings/tracklist.txt"),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            leaf_suffix: None,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl MapfetchConfig {
    /// Applies non-empty overrides from a variable lookup (normally `std::env::var`).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_OUTPUT_FOLDER) {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_OUTPUT_XML_PATH) {
            self.manifest_path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_REQUEST_URL) {
            self.catalog_url = v;
        }
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mapfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists, then apply
/// environment overrides.
pub fn load_or_init() -> Result<MapfetchConfig> {
    let path = config_path()?;
    let mut cfg = if !path.exists() {
        let default_cfg = MapfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    } else {
        let data = fs::read_to_string(&path)?;
        toml::from_str(&data)?
    };
    cfg.apply_env();
    Ok(cfg)
}
