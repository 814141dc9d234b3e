//! Settings loader
//!
//! Layers, lowest priority first: built-in defaults, the settings file,
//! `KUBE_ENDPOINT_*` environment variables.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use log::debug;

use crate::common::{EndpointError, Result};
use crate::config::defaults;
use crate::config::Settings;

/// Trait for loading settings
pub trait ConfigLoader {
    /// Load settings from a JSON file, then apply the environment on top
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self>
    where
        Self: Sized;

    /// Load settings from the default sources
    ///
    /// The file is taken from `KUBE_ENDPOINT_CONFIG_FILE` when set, else
    /// `kube-endpoint.json` in the working directory if it exists.
    fn auto_load() -> Result<Self>
    where
        Self: Sized;
}

fn environment() -> Environment {
    Environment::with_prefix(defaults::ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

fn build(file: Option<(&Path, bool)>) -> Result<Settings> {
    let mut builder = Config::builder();
    if let Some((path, required)) = file {
        builder = builder.add_source(
            File::from(path.to_path_buf())
                .format(FileFormat::Json)
                .required(required),
        );
    }

    let settings: Settings = builder
        .add_source(environment())
        .build()?
        .try_deserialize()?;
    Ok(settings)
}

impl ConfigLoader for Settings {
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading settings from {}", path.display());
        build(Some((path, true))).map_err(|e| {
            EndpointError::Config(format!("Failed to load settings from {}: {}", path.display(), e))
        })
    }

    fn auto_load() -> Result<Self> {
        let explicit = std::env::var_os(defaults::CONFIG_FILE_ENV).map(PathBuf::from);
        let settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = PathBuf::from(defaults::DEFAULT_CONFIG_FILE);
                debug!("Looking for optional settings file {}", path.display());
                build(Some((path.as_path(), false)))?
            }
        };
        Ok(settings)
    }
}
