//! Kubeconfig parsing
//!
//! Reads kubeconfig YAML into [`Kubeconfig`] and offers the lookups the
//! resolver needs. The grammar itself is handled by `serde_yaml`.

mod types;

pub use self::types::{
    AuthInfo, AuthProviderConfig, Cluster, Context, ExecConfig, Kubeconfig, NamedAuthInfo,
    NamedCluster, NamedContext,
};

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;

use crate::common::fs::read_file;
use crate::common::{EndpointError, Result};

impl Kubeconfig {
    /// Load a kubeconfig from disk
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read and a parse error if it
    /// is not a valid kubeconfig document.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading kubeconfig from {}", path.display());

        let data = read_file(path)?;
        let content = std::str::from_utf8(&data).map_err(|e| {
            EndpointError::parse(format!("kubeconfig {} is not valid UTF-8: {}", path.display(), e))
        })?;

        Self::from_yaml(content).map_err(|e| match e {
            EndpointError::Parse(msg) => {
                EndpointError::parse(format!("failed to parse kubeconfig {}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse a kubeconfig document
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file is a valid, empty kubeconfig
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Look up a context by name
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.context)
    }

    /// Look up a cluster by name
    pub fn cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.cluster)
    }

    /// Look up a user by name
    pub fn auth_info(&self, name: &str) -> Option<&AuthInfo> {
        self.auth_infos
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.auth_info)
    }

    /// The current context name, if one is set
    pub fn current_context(&self) -> Option<&str> {
        self.current_context.as_deref().filter(|name| !name.is_empty())
    }
}

/// Decode a base64 `*-data` field
///
/// Line breaks and other whitespace inside the value are ignored, as
/// kubectl does.
pub fn decode_data(field: &str, value: &str) -> Result<Vec<u8>> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| EndpointError::parse(format!("invalid base64 in {}: {}", field, e)))
}
