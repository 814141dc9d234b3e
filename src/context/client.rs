//! Client configuration rebuilt from an endpoint

use std::fmt;

use crate::context::endpoint::{Endpoint, TlsData};
use crate::kubeconfig::{AuthProviderConfig, ExecConfig};

/// Namespace used by kubernetes clients when none is configured
pub const DEFAULT_NAMESPACE: &str = "default";

/// Everything a networking layer needs to talk to the API server
///
/// Credential plugins are passed through exactly as they were found in the
/// kubeconfig; evaluating them is up to the consumer.
#[derive(Clone, Default, PartialEq)]
pub struct ClientConfig {
    pub host: String,
    pub namespace: String,
    pub insecure: bool,
    pub ca_data: Option<Vec<u8>>,
    pub cert_data: Option<Vec<u8>>,
    pub key_data: Option<Vec<u8>>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub auth_provider: Option<AuthProviderConfig>,
    pub exec_provider: Option<ExecConfig>,
}

impl ClientConfig {
    /// Namespace to use, falling back to `default` when none is set
    pub fn effective_namespace(&self) -> &str {
        if self.namespace.is_empty() {
            DEFAULT_NAMESPACE
        } else {
            &self.namespace
        }
    }

    /// True when client certificate authentication is configured
    pub fn has_client_cert(&self) -> bool {
        self.cert_data.is_some() && self.key_data.is_some()
    }
}

// Key material and passwords stay out of logs
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = |data: &Option<Vec<u8>>| data.as_ref().map(Vec::len);
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("namespace", &self.namespace)
            .field("insecure", &self.insecure)
            .field("ca_data_len", &len(&self.ca_data))
            .field("cert_data_len", &len(&self.cert_data))
            .field("key_data_len", &len(&self.key_data))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("auth_provider", &self.auth_provider.as_ref().map(|p| &p.name))
            .field("exec_provider", &self.exec_provider.as_ref().and_then(ExecConfig::command))
            .finish()
    }
}

impl Endpoint {
    /// Build the client configuration for this endpoint
    pub fn client_config(&self) -> ClientConfig {
        let meta = &self.meta;
        let tls = self.tls_data.as_ref();
        let (username, password) = match &meta.username_password {
            Some(up) => (Some(up.username.clone()), Some(up.password.clone())),
            None => (None, None),
        };

        ClientConfig {
            host: meta.host.clone(),
            namespace: meta.default_namespace.clone(),
            insecure: meta.skip_tls_verify,
            ca_data: tls.and_then(TlsData::ca).map(<[u8]>::to_vec),
            cert_data: tls.and_then(TlsData::cert).map(<[u8]>::to_vec),
            key_data: tls.and_then(TlsData::key).map(<[u8]>::to_vec),
            username,
            password,
            auth_provider: meta.auth_provider.clone(),
            exec_provider: meta.exec.clone(),
        }
    }
}

impl From<&Endpoint> for ClientConfig {
    fn from(endpoint: &Endpoint) -> Self {
        endpoint.client_config()
    }
}
