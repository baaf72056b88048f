use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_RAPI_URL: &str = "https://www.eodms-sgdot.nrcan-rncan.gc.ca/wes/rapi";

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub rapi: RapiConfig,
    pub credentials: CredentialsConfig,
    pub catalog: CatalogConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Paths {
    pub downloads: PathBuf,
    pub results: PathBuf,
    pub log: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            downloads: PathBuf::from("downloads"),
            results: PathBuf::from("results"),
            log: PathBuf::from("log/logger.log"),
        }
    }
}

/// `timeout_query` is in seconds.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RapiConfig {
    pub url: String,
    pub timeout_query: u64,
}

impl Default for RapiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RAPI_URL.to_string(),
            timeout_query: 60,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct CredentialsConfig {
    pub username: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    pub file: Option<PathBuf>,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// A missing file gives the defaults; a file that does not parse is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::read(path).with_context(|| format!("reading configuration {}", path.display()))
    }

    /// Applies the command-line overrides.
    pub fn with_overrides(mut self, downloads: Option<&Path>, catalog: Option<&Path>) -> Self {
        if let Some(downloads) = downloads {
            self.paths.downloads = downloads.to_path_buf();
        }
        if let Some(catalog) = catalog {
            self.catalog.file = Some(catalog.to_path_buf());
        }
        self
    }
}
