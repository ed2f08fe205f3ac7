//! Server configuration via `haystack.toml`
//!
//! Every field has a default, so an empty file (or no file) gives a working
//! in-memory server with synthetic history. `haystack --init` writes the
//! commented default file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use haystack_core::{Error, Result, TimeZone};

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "haystack.toml";

/// Which historian backs `hisRead`/`hisWrite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    /// Generated samples, writes rejected
    Synthetic,
    /// In-process series, writes accepted
    Memory,
}

/// `[history]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Backend kind (default: synthetic)
    #[serde(default = "default_backend")]
    pub backend: HistoryBackend,
    /// Synthetic sample spacing in minutes (default: 15)
    #[serde(default = "default_interval_mins")]
    pub interval_mins: u32,
}

fn default_backend() -> HistoryBackend {
    HistoryBackend::Synthetic
}

fn default_interval_mins() -> u32 {
    15
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            interval_mins: default_interval_mins(),
        }
    }
}

/// Server configuration loaded from `haystack.toml`.
///
/// # Example
///
/// ```toml
/// server_name = "demo"
/// tz = "New_York"
/// watch_lease_secs = 120
/// seed = "data/seed.json"
///
/// [history]
/// backend = "memory"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported by `about`.
    #[serde(default = "default_server_name")]
    pub server_name: String,
    /// Vendor reported by `about`.
    #[serde(default = "default_vendor_name")]
    pub vendor_name: String,
    /// Vendor URI reported by `about`.
    #[serde(default = "default_vendor_uri")]
    pub vendor_uri: String,
    /// Server timezone name; used for `about` and for range dates of
    /// entities without a `tz` tag.
    #[serde(default = "default_tz")]
    pub tz: String,
    /// Lease given to watches that do not ask for one.
    #[serde(default = "default_watch_lease_secs")]
    pub watch_lease_secs: u64,
    /// JSON table file loaded into the entity store at open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<PathBuf>,
    /// Historian settings.
    #[serde(default)]
    pub history: HistoryConfig,
}

fn default_server_name() -> String {
    "haystackdb".to_string()
}

fn default_vendor_name() -> String {
    "Haystack server contributors".to_string()
}

fn default_vendor_uri() -> String {
    "https://project-haystack.org/".to_string()
}

fn default_tz() -> String {
    "UTC".to_string()
}

fn default_watch_lease_secs() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            vendor_name: default_vendor_name(),
            vendor_uri: default_vendor_uri(),
            tz: default_tz(),
            watch_lease_secs: default_watch_lease_secs(),
            seed: None,
            history: HistoryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Server timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if `tz` is not a known timezone name.
    pub fn timezone(&self) -> Result<TimeZone> {
        TimeZone::find(&self.tz).ok_or_else(|| {
            Error::InvalidConfig(format!("Unknown timezone '{}' in {}", self.tz, CONFIG_FILE_NAME))
        })
    }

    /// Default watch lease.
    pub fn watch_lease(&self) -> Duration {
        Duration::from_secs(self.watch_lease_secs)
    }

    /// Synthetic history sample spacing.
    pub fn his_interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.history.interval_mins))
    }

    /// Check every setting that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        self.timezone()?;
        if self.watch_lease_secs == 0 {
            return Err(Error::InvalidConfig(
                "watch_lease_secs must be at least 1".to_string(),
            ));
        }
        if self.history.interval_mins == 0 {
            return Err(Error::InvalidConfig(
                "history.interval_mins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Haystack server configuration

# Name reported by the "about" operation
server_name = "haystackdb"

# Server timezone (e.g. "UTC", "New_York", "London", "Tokyo")
tz = "UTC"

# Lease in seconds for watches opened without one
watch_lease_secs = 60

# JSON table of entity records loaded at startup (optional)
# seed = "seed.json"

[history]
# "synthetic" = generated samples, hisWrite rejected
# "memory"    = in-process series, hisWrite accepted
backend = "synthetic"

# Sample spacing of the synthetic historian, in minutes
interval_mins = 15
"#
    }

    /// Read and parse config from a file path.
    ///
    /// Relative `seed` paths are resolved against the config file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let mut config: ServerConfig = toml::from_str(&content).map_err(|e| {
            Error::InvalidConfig(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        if let (Some(seed), Some(dir)) = (config.seed.as_mut(), path.parent()) {
            if seed.is_relative() {
                *seed = dir.join(&*seed);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::InvalidConfig(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}
