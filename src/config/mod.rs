//! Configuration module
//!
//! Application settings: where the endpoint store lives, which kubeconfig is
//! the default, and how much to log. Loaded from defaults, an optional JSON
//! file and `KUBE_ENDPOINT_*` environment variables.

pub mod defaults;
mod loader;

pub use self::defaults::ENV_PREFIX;
pub use self::loader::ConfigLoader;

use std::env;
use std::path::PathBuf;

use log::info;
use serde::{Deserialize, Serialize};

use crate::common::{EndpointError, Result};

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root directory of the endpoint store
    pub store_dir: PathBuf,

    /// Kubeconfig used when none is given explicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: defaults::store_dir(),
            kubeconfig: None,
            log_level: defaults::log_level(),
        }
    }
}

impl Settings {
    /// Path of the default kubeconfig
    ///
    /// Order: the `kubeconfig` setting, the first existing entry of
    /// `KUBECONFIG` (or its first entry if none exists), `~/.kube/config`.
    pub fn kubeconfig_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.kubeconfig {
            return Ok(path.clone());
        }

        if let Some(list) = env::var_os(defaults::KUBECONFIG_ENV) {
            let paths: Vec<PathBuf> = env::split_paths(&list)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if let Some(path) = paths.iter().find(|p| p.is_file()).or_else(|| paths.first()) {
                return Ok(path.clone());
            }
        }

        defaults::home_dir()
            .map(|home| home.join(defaults::RECOMMENDED_KUBECONFIG))
            .ok_or_else(|| {
                EndpointError::Config(
                    "Cannot locate a kubeconfig: no home directory and KUBECONFIG is not set".to_string(),
                )
            })
    }

    /// Log the effective settings
    pub fn log(&self) {
        if !log::log_enabled!(log::Level::Info) {
            return;
        }

        info!("=== Settings ===");
        info!("  Store directory: {}", self.store_dir.display());
        match &self.kubeconfig {
            Some(path) => info!("  Kubeconfig: {}", path.display()),
            None => info!("  Kubeconfig: (default)"),
        }
        info!("  Log level: {}", self.log_level);
    }
}
