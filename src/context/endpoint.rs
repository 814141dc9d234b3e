//! Normalized kubernetes endpoint
//!
//! An [`Endpoint`] is what is left of a kubeconfig context once it has been
//! resolved: the non-secret [`EndpointMeta`] and, optionally, the secret
//! [`TlsData`]. The two halves are persisted to different stores and joined
//! again by context name.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::common::{EndpointError, Result};
use crate::kubeconfig::{AuthProviderConfig, ExecConfig};
use crate::store::{Metadata, MetadataStore, TlsMaterial, TlsStore};

/// Endpoint type tag under which kubernetes endpoints are stored
pub const KUBERNETES_ENDPOINT: &str = "kubernetes";

/// Basic-auth credentials of a user entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernamePassword {
    pub username: String,
    pub password: String,
}

/// Non-secret part of an endpoint
///
/// Serialized with the field names docker contexts use, so stores written
/// by either tool can be read by the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointMeta {
    /// API server URL
    #[serde(rename = "Host", default, skip_serializing_if = "String::is_empty")]
    pub host: String,

    #[serde(rename = "SkipTLSVerify", default)]
    pub skip_tls_verify: bool,

    #[serde(rename = "DefaultNamespace", default, skip_serializing_if = "String::is_empty")]
    pub default_namespace: String,

    #[serde(rename = "AuthProvider", default, skip_serializing_if = "Option::is_none")]
    pub auth_provider: Option<AuthProviderConfig>,

    #[serde(rename = "Exec", default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecConfig>,

    #[serde(rename = "usernamePassword", default, skip_serializing_if = "Option::is_none")]
    pub username_password: Option<UsernamePassword>,
}

/// Secret TLS part of an endpoint
///
/// At least one of CA, cert and key is always set: an endpoint without any
/// TLS bytes carries no `TlsData` at all. [`TlsData::new`] is the only way
/// to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsData {
    ca: Option<Vec<u8>>,
    cert: Option<Vec<u8>>,
    key: Option<Vec<u8>>,
}

impl TlsData {
    /// Build TLS data, or `None` when there is nothing to hold
    pub fn new(ca: Option<Vec<u8>>, cert: Option<Vec<u8>>, key: Option<Vec<u8>>) -> Option<Self> {
        if ca.is_none() && cert.is_none() && key.is_none() {
            return None;
        }
        Some(Self { ca, cert, key })
    }

    /// TLS data held by stored material, if it holds any
    pub fn from_material(material: TlsMaterial) -> Option<Self> {
        Self::new(material.ca, material.cert, material.key)
    }

    pub fn ca(&self) -> Option<&[u8]> {
        self.ca.as_deref()
    }

    pub fn cert(&self) -> Option<&[u8]> {
        self.cert.as_deref()
    }

    pub fn key(&self) -> Option<&[u8]> {
        self.key.as_deref()
    }

    /// Shape expected by a [`TlsStore`]; absent data maps to empty material
    pub fn to_store_material(data: Option<&TlsData>) -> TlsMaterial {
        match data {
            Some(data) => TlsMaterial {
                ca: data.ca.clone(),
                cert: data.cert.clone(),
                key: data.key.clone(),
            },
            None => TlsMaterial::default(),
        }
    }
}

/// A resolved kubernetes endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Endpoint {
    pub meta: EndpointMeta,
    pub tls_data: Option<TlsData>,
}

impl Endpoint {
    pub fn new(meta: EndpointMeta, tls_data: Option<TlsData>) -> Self {
        Self { meta, tls_data }
    }

    /// Namespace used when the caller does not pick one
    pub fn namespace(&self) -> &str {
        &self.meta.default_namespace
    }
}

impl EndpointMeta {
    /// Attach the TLS material stored for context `name`
    ///
    /// A slot that was never written and a slot that was reset to empty both
    /// leave the endpoint without TLS data.
    pub fn with_tls_data(self, tls_store: &dyn TlsStore, name: &str) -> Result<Endpoint> {
        let tls_data = tls_store
            .get_endpoint_tls_material(name, KUBERNETES_ENDPOINT)?
            .into_material()
            .and_then(TlsData::from_material);
        Ok(Endpoint::new(self, tls_data))
    }
}

/// Kubernetes endpoint metadata stored in a context record, if any
///
/// # Errors
///
/// Returns a parse error when the record has a kubernetes entry that does not
/// decode as [`EndpointMeta`].
pub fn endpoint_from_context(meta: &Metadata) -> Result<Option<EndpointMeta>> {
    meta.endpoint(KUBERNETES_ENDPOINT).map_err(|e| match e {
        EndpointError::Parse(msg) => EndpointError::parse(format!(
            "invalid kubernetes endpoint in context {:?}: {}",
            meta.name, msg
        )),
        other => other,
    })
}

/// Write an endpoint to both stores under `name`
///
/// Metadata goes first; the TLS slot is then reset to the endpoint's material,
/// or to empty when it has none. The two writes are not transactional.
pub fn persist(
    meta_store: &dyn MetadataStore,
    tls_store: &dyn TlsStore,
    endpoint: &Endpoint,
    name: &str,
) -> Result<()> {
    debug!("Persisting endpoint {:?} ({})", name, endpoint.meta.host);

    let record = Metadata::new(name).with_endpoint(KUBERNETES_ENDPOINT, &endpoint.meta)?;
    meta_store.create_or_update(record)?;

    let material = TlsData::to_store_material(endpoint.tls_data.as_ref());
    tls_store.reset_endpoint_tls_material(name, KUBERNETES_ENDPOINT, &material)
}

/// Read an endpoint back from both stores
///
/// # Errors
///
/// Fails with `NotFound` when there is no record named `name` or the record
/// holds no kubernetes endpoint. Store errors are returned unchanged.
pub fn hydrate(meta_store: &dyn MetadataStore, tls_store: &dyn TlsStore, name: &str) -> Result<Endpoint> {
    let record = meta_store.get_metadata(name)?;
    let meta = endpoint_from_context(&record)?.ok_or_else(|| {
        EndpointError::not_found(format!("context {:?} has no kubernetes endpoint", name))
    })?;
    meta.with_tls_data(tls_store, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, MockMetadataStore, MockTlsStore, TlsSlot};
    use std::io;

    fn endpoint(tls_data: Option<TlsData>, skip_tls_verify: bool) -> Endpoint {
        Endpoint::new(
            EndpointMeta {
                host: "https://test".to_string(),
                skip_tls_verify,
                default_namespace: "test".to_string(),
                ..EndpointMeta::default()
            },
            tls_data,
        )
    }

    #[test]
    fn test_tls_data_new_normalizes_absence() {
        assert_eq!(TlsData::new(None, None, None), None);
        let data = TlsData::new(None, Some(b"cert".to_vec()), None).unwrap();
        assert_eq!(data.cert(), Some(&b"cert"[..]));
        assert_eq!(data.ca(), None);
        assert_eq!(TlsData::from_material(TlsMaterial::default()), None);
    }

    #[test]
    fn test_meta_json_field_names() {
        let meta = EndpointMeta {
            host: "https://test".to_string(),
            skip_tls_verify: true,
            default_namespace: "ns".to_string(),
            username_password: Some(UsernamePassword {
                username: "admin".to_string(),
                password: "secret".to_string(),
            }),
            ..EndpointMeta::default()
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["Host"], "https://test");
        assert_eq!(value["SkipTLSVerify"], true);
        assert_eq!(value["DefaultNamespace"], "ns");
        assert_eq!(value["usernamePassword"]["username"], "admin");
        assert!(value.get("Exec").is_none());
    }

    #[test]
    fn test_persist_hydrate_roundtrip() {
        let store = MemoryStore::new();
        let cases = [
            ("notls", endpoint(None, false)),
            ("notls-skip", endpoint(None, true)),
            (
                "tls",
                endpoint(
                    TlsData::new(Some(b"ca".to_vec()), Some(b"cert".to_vec()), Some(b"key".to_vec())),
                    true,
                ),
            ),
        ];

        for (name, ep) in &cases {
            persist(&store, &store, ep, name).unwrap();
        }
        for (name, ep) in &cases {
            assert_eq!(&hydrate(&store, &store, name).unwrap(), ep, "context {}", name);
        }
    }

    #[test]
    fn test_roundtrip_every_tls_shape() {
        let store = MemoryStore::new();
        let blob = |b: &[u8], on: bool| if on { Some(b.to_vec()) } else { None };

        for mask in 0u8..8 {
            let tls = TlsData::new(
                blob(b"ca", mask & 1 != 0),
                blob(b"cert", mask & 2 != 0),
                blob(b"key", mask & 4 != 0),
            );
            assert_eq!(tls.is_none(), mask == 0);

            let ep = endpoint(tls, mask % 2 == 0);
            let name = format!("ctx-{}", mask);
            persist(&store, &store, &ep, &name).unwrap();
            assert_eq!(hydrate(&store, &store, &name).unwrap(), ep, "context {}", name);
        }
    }

    #[test]
    fn test_persist_without_tls_resets_slot() {
        let store = MemoryStore::new();
        let with_tls = endpoint(TlsData::new(Some(b"ca".to_vec()), None, None), false);
        persist(&store, &store, &with_tls, "ctx").unwrap();
        persist(&store, &store, &endpoint(None, false), "ctx").unwrap();

        assert_eq!(
            store.get_endpoint_tls_material("ctx", KUBERNETES_ENDPOINT).unwrap(),
            TlsSlot::Empty
        );
        assert_eq!(hydrate(&store, &store, "ctx").unwrap().tls_data, None);
    }

    #[test]
    fn test_hydrate_without_tls_write() {
        let store = MemoryStore::new();
        let record = Metadata::new("meta-only")
            .with_endpoint(KUBERNETES_ENDPOINT, &endpoint(None, false).meta)
            .unwrap();
        store.create_or_update(record).unwrap();

        let ep = hydrate(&store, &store, "meta-only").unwrap();
        assert_eq!(ep, endpoint(None, false));
    }

    #[test]
    fn test_hydrate_context_without_kubernetes_endpoint() {
        let store = MemoryStore::new();
        store.create_or_update(Metadata::new("docker-only")).unwrap();

        let err = hydrate(&store, &store, "docker-only").unwrap_err();
        assert!(err.is_not_found());
        assert!(endpoint_from_context(&store.get_metadata("docker-only").unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_hydrate_propagates_tls_store_error() {
        let mut meta_store = MockMetadataStore::new();
        meta_store.expect_get_metadata().returning(|name| {
            Metadata::new(name).with_endpoint(KUBERNETES_ENDPOINT, &EndpointMeta::default())
        });
        let mut tls_store = MockTlsStore::new();
        tls_store
            .expect_get_endpoint_tls_material()
            .returning(|_, _| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied").into()));

        let err = hydrate(&meta_store, &tls_store, "ctx").unwrap_err();
        assert!(matches!(err, EndpointError::Io(ref e) if e.kind() == io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_persist_stops_on_metadata_error() {
        let mut meta_store = MockMetadataStore::new();
        meta_store
            .expect_create_or_update()
            .times(1)
            .returning(|_| Err(EndpointError::Io(io::Error::new(io::ErrorKind::Other, "disk full"))));
        let mut tls_store = MockTlsStore::new();
        tls_store.expect_reset_endpoint_tls_material().never();

        let err = persist(&meta_store, &tls_store, &endpoint(None, false), "ctx").unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }
}
