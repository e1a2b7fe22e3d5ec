//! Commonizer settings: global configuration and per-build resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use klink_model::interop::CommonizationParameters;
use klink_util::errors::KlinkError;

use crate::fingerprint;

/// Log level forwarded to the external commonizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommonizerLogLevel {
    #[default]
    Quiet,
    Info,
    Debug,
}

impl CommonizerLogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

/// Global user configuration loaded from `~/.klink/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub commonizer: CommonizerConfig,
}

/// Settings from `[commonizer]` in the global config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommonizerConfig {
    #[serde(default, rename = "konan-home")]
    pub konan_home: Option<String>,
    #[serde(default, rename = "output-dir")]
    pub output_dir: Option<String>,
    #[serde(default, rename = "log-level")]
    pub log_level: Option<CommonizerLogLevel>,
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file does
    /// not exist.
    pub fn load() -> miette::Result<Self> {
        Self::from_path(&Self::default_path())
    }

    pub fn from_path(path: &Path) -> miette::Result<Self> {
        if path.is_file() {
            let content = std::fs::read_to_string(path).map_err(|e| KlinkError::Config {
                message: format!("Failed to read global config: {e}"),
            })?;
            toml::from_str(&content).map_err(|e| {
                KlinkError::Config {
                    message: format!("Failed to parse global config: {e}"),
                }
                .into()
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the klink data directory (`~/.klink/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".klink")
}

/// Resolved settings for one commonization run.
#[derive(Debug, Clone)]
pub struct CommonizerSettings {
    /// Kotlin/Native distribution root (the directory containing `bin/`
    /// and `klib/`).
    pub konan_home: PathBuf,
    /// Base directory under which per-invocation output directories live.
    pub output_directory: PathBuf,
    pub log_level: CommonizerLogLevel,
}

impl CommonizerSettings {
    /// Assemble settings for a build: global config first, then environment
    /// overrides, then defaults rooted at the project build directory.
    pub fn for_build_dir(build_dir: &Path) -> miette::Result<Self> {
        let config = GlobalConfig::load()?;
        let konan_home = discover_konan_home(&config.commonizer)?;
        let output_directory = config
            .commonizer
            .output_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| build_dir.join("classes").join("kotlin").join("commonizer"));
        Ok(Self {
            konan_home,
            output_directory,
            log_level: config.commonizer.log_level.unwrap_or_default(),
        })
    }

    /// Output directory unique to one invocation parameter set. Parameter
    /// sets never share a directory, so wiping one before a re-run cannot
    /// clobber another invocation's artifacts.
    pub fn output_directory_for(&self, parameters: &CommonizationParameters) -> PathBuf {
        self.output_directory
            .join(fingerprint::output_directory_name(parameters))
    }
}

/// Locate the Kotlin/Native distribution: `KONAN_HOME`, then the global
/// config, then the newest prebuilt distribution under the Konan data
/// directory (`KONAN_DATA_DIR` or `~/.konan`).
pub fn discover_konan_home(config: &CommonizerConfig) -> miette::Result<PathBuf> {
    if let Ok(home) = std::env::var("KONAN_HOME") {
        return Ok(PathBuf::from(home));
    }
    if let Some(home) = &config.konan_home {
        return Ok(PathBuf::from(home));
    }

    let data_dir = std::env::var("KONAN_DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        Path::new(&home).join(".konan")
    });
    if let Some(dist) = newest_distribution(&data_dir) {
        return Ok(dist);
    }

    Err(KlinkError::Toolchain {
        message: format!(
            "No Kotlin/Native distribution found under {}",
            data_dir.display()
        ),
    }
    .into())
}

/// Pick the lexicographically newest `kotlin-native*` directory, matching
/// how the distribution archives are versioned.
fn newest_distribution(data_dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(data_dir).ok()?;
    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("kotlin-native"))
        })
        .max()
}
