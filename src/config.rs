//! Configuration loading with precedence: CLI > config file > defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use logsieve_source::SourceSpec;
use serde::Deserialize;
use thiserror::Error;

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "logsieve.toml";

/// Default diagnostic log file
pub const DEFAULT_LOG_FILE: &str = "app.log";

/// Errors that can occur during config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// TOML configuration file structure. Every field is optional.
///
/// ```toml
/// bind = "0.0.0.0:1234"
/// log_file = "app.log"
///
/// [source]
/// image = "gcr.io/hiring-278615/loggerator"
/// runtime = "docker"
/// container_port = 8080
/// read_timeout_secs = 30
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub bind: Option<SocketAddr>,

    #[serde(default)]
    pub log_file: Option<PathBuf>,

    #[serde(default)]
    pub source: Option<SourceSection>,
}

/// `[source]` section
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    /// Image reference of the log-producing container
    #[serde(default)]
    pub image: Option<String>,

    /// Container CLI binary (`docker`, `podman`)
    #[serde(default)]
    pub runtime: Option<String>,

    #[serde(default)]
    pub container_port: Option<u16>,

    /// Fixed host port; unset lets the runtime pick a free one
    #[serde(default)]
    pub host_port: Option<u16>,

    #[serde(default)]
    pub endpoint_host: Option<String>,

    #[serde(default)]
    pub startup_grace_ms: Option<u64>,

    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    #[serde(default)]
    pub read_timeout_secs: Option<u64>,

    #[serde(default)]
    pub remove_on_stop: Option<bool>,
}

/// Values given on the command line, taking precedence over the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<SocketAddr>,
    pub image: Option<String>,
    pub runtime: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Configuration after applying precedence rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub bind: SocketAddr,
    pub log_file: PathBuf,
    pub runtime: String,
    pub source: SourceSpec,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 1234)),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            runtime: "docker".to_string(),
            source: SourceSpec::default(),
        }
    }
}

impl ResolvedConfig {
    /// Merge defaults, an optional config file, and CLI overrides
    pub fn resolve(file: Option<ConfigFile>, cli: CliOverrides) -> Self {
        let mut config = Self::default();

        if let Some(file) = file {
            config.apply_file(file);
        }

        if let Some(bind) = cli.bind {
            config.bind = bind;
        }
        if let Some(image) = cli.image {
            config.source.image = image;
        }
        if let Some(runtime) = cli.runtime {
            config.runtime = runtime;
        }
        if let Some(log_file) = cli.log_file {
            config.log_file = log_file;
        }

        config
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(bind) = file.bind {
            self.bind = bind;
        }
        if let Some(log_file) = file.log_file {
            self.log_file = log_file;
        }

        let Some(section) = file.source else {
            return;
        };
        let spec = &mut self.source;
        if let Some(image) = section.image {
            spec.image = image;
        }
        if let Some(runtime) = section.runtime {
            self.runtime = runtime;
        }
        if let Some(port) = section.container_port {
            spec.container_port = port;
        }
        if let Some(port) = section.host_port {
            spec.host_port = Some(port);
        }
        if let Some(host) = section.endpoint_host {
            spec.endpoint_host = host;
        }
        if let Some(ms) = section.startup_grace_ms {
            spec.startup_grace = Duration::from_millis(ms);
        }
        if let Some(secs) = section.connect_timeout_secs {
            spec.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = section.read_timeout_secs {
            spec.read_timeout = Duration::from_secs(secs);
        }
        if let Some(remove) = section.remove_on_stop {
            spec.remove_on_stop = remove;
        }
    }
}

/// Load a configuration file.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_config_file(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(config))
}
