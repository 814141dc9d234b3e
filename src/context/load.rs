//! Context lookup
//!
//! Turns a context name into a [`ClientConfig`], the way a command that
//! accepts `--context` would: stored contexts are hydrated from the stores,
//! `kubernetes://` URLs point straight at a kubeconfig file.

use std::path::{Path, PathBuf};

use log::{debug, info};
use url::Url;

use crate::common::{EndpointError, Result};
use crate::config::Settings;
use crate::context::client::ClientConfig;
use crate::context::endpoint::{endpoint_from_context, persist, Endpoint};
use crate::context::resolver::from_kubeconfig;
use crate::store::{MetadataStore, TlsStore};

/// URL scheme selecting a kubeconfig file instead of a stored context
pub const KUBERNETES_SCHEME: &str = "kubernetes";

/// Client configuration for a context name or `kubernetes://` URL
///
/// `kubernetes://?kubeconfig=/path` resolves the current context of that
/// file; without the query parameter the default kubeconfig is used.
/// Anything else is looked up in the stores, see [`client_config_from_endpoint`].
pub fn client_config_from_context(
    name: &str,
    meta_store: &dyn MetadataStore,
    tls_store: &dyn TlsStore,
    settings: &Settings,
) -> Result<ClientConfig> {
    if name.starts_with(&format!("{}://", KUBERNETES_SCHEME)) {
        let path = match kubeconfig_from_url(name)? {
            Some(path) => path,
            None => settings.kubeconfig_path()?,
        };
        debug!("Endpoint {:?} selects kubeconfig {}", name, path.display());
        return Ok(from_kubeconfig(&path, "", "")?.client_config());
    }
    client_config_from_endpoint(name, meta_store, tls_store, settings)
}

/// Client configuration of a stored context
///
/// A context that exists but carries no kubernetes endpoint falls back to the
/// default kubeconfig.
pub fn client_config_from_endpoint(
    name: &str,
    meta_store: &dyn MetadataStore,
    tls_store: &dyn TlsStore,
    settings: &Settings,
) -> Result<ClientConfig> {
    let record = meta_store.get_metadata(name)?;
    match endpoint_from_context(&record)? {
        Some(meta) => Ok(meta.with_tls_data(tls_store, name)?.client_config()),
        None => {
            let path = settings.kubeconfig_path()?;
            debug!(
                "Context {:?} has no kubernetes endpoint, using {}",
                name,
                path.display()
            );
            Ok(from_kubeconfig(&path, "", "")?.client_config())
        }
    }
}

/// Resolve a kubeconfig context and store it under `name`
pub fn import_kubeconfig(
    path: &Path,
    context_name: &str,
    namespace_override: &str,
    name: &str,
    meta_store: &dyn MetadataStore,
    tls_store: &dyn TlsStore,
) -> Result<Endpoint> {
    let endpoint = from_kubeconfig(path, context_name, namespace_override)?;
    persist(meta_store, tls_store, &endpoint, name)?;
    info!(
        "Imported {} from {} as {:?}",
        if context_name.is_empty() { "current context" } else { context_name },
        path.display(),
        name
    );
    Ok(endpoint)
}

/// The `kubeconfig` query parameter of a `kubernetes://` URL
fn kubeconfig_from_url(endpoint: &str) -> Result<Option<PathBuf>> {
    let url = Url::parse(endpoint)
        .map_err(|e| EndpointError::parse(format!("invalid endpoint {:?}: {}", endpoint, e)))?;
    Ok(url
        .query_pairs()
        .find(|(key, _)| key == "kubeconfig")
        .map(|(_, value)| PathBuf::from(value.into_owned()))
        .filter(|path| !path.as_os_str().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kubeconfig_from_url() {
        assert_eq!(
            kubeconfig_from_url("kubernetes://?kubeconfig=/tmp/kube%20config").unwrap(),
            Some(PathBuf::from("/tmp/kube config"))
        );
        assert_eq!(kubeconfig_from_url("kubernetes://").unwrap(), None);
        assert_eq!(kubeconfig_from_url("kubernetes://?kubeconfig=").unwrap(), None);
    }
}
