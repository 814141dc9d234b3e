//! Endpoint stores
//!
//! Persistence is split in two: non-secret metadata lives in a
//! [`MetadataStore`], TLS key material in a [`TlsStore`]. Both are keyed by
//! the context name, which is the only link between them. Callers inject the
//! stores; nothing in this crate holds one globally.

mod fs;
mod memory;

pub use self::fs::{context_id, DirectoryStore};
pub use self::memory::MemoryStore;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::Result;

/// File name of the CA bundle inside a TLS slot
pub const CA_FILE: &str = "ca.pem";
/// File name of the client certificate inside a TLS slot
pub const CERT_FILE: &str = "cert.pem";
/// File name of the client key inside a TLS slot
pub const KEY_FILE: &str = "key.pem";

/// Stored metadata of one context
///
/// `endpoints` maps an endpoint type tag (e.g. `kubernetes`) to that
/// endpoint's non-secret metadata. The serialized form matches the
/// `meta.json` files of the docker context store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "Name")]
    pub name: String,

    /// Context-level metadata, opaque to this crate
    #[serde(rename = "Metadata", default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,

    #[serde(rename = "Endpoints", default)]
    pub endpoints: BTreeMap<String, Value>,
}

impl Metadata {
    /// Create a record with no endpoints
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach the metadata of one endpoint type
    pub fn with_endpoint<T: Serialize>(mut self, endpoint: &str, meta: &T) -> Result<Self> {
        self.endpoints
            .insert(endpoint.to_string(), serde_json::to_value(meta)?);
        Ok(self)
    }

    /// Typed view of one endpoint's metadata
    ///
    /// Returns `Ok(None)` when the record has no entry for `endpoint`.
    pub fn endpoint<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Option<T>> {
        match self.endpoints.get(endpoint) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}

/// TLS blobs in the shape the TLS store keeps them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsMaterial {
    pub ca: Option<Vec<u8>>,
    pub cert: Option<Vec<u8>>,
    pub key: Option<Vec<u8>>,
}

impl TlsMaterial {
    /// True when no blob is set
    pub fn is_empty(&self) -> bool {
        self.ca.is_none() && self.cert.is_none() && self.key.is_none()
    }

    /// `(file name, blob)` pairs for the blobs that are set
    pub fn files(&self) -> impl Iterator<Item = (&'static str, &[u8])> + '_ {
        [
            (CA_FILE, self.ca.as_deref()),
            (CERT_FILE, self.cert.as_deref()),
            (KEY_FILE, self.key.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, data)| data.map(|d| (name, d)))
    }
}

/// State of a TLS slot as seen by a reader
///
/// `Unset` (never written) and `Empty` (explicitly reset with nothing) are
/// different on disk but mean the same thing to an endpoint: no TLS data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsSlot {
    Unset,
    Empty,
    Material(TlsMaterial),
}

impl TlsSlot {
    /// Classify freshly read material
    pub fn from_material(material: TlsMaterial) -> Self {
        if material.is_empty() {
            Self::Empty
        } else {
            Self::Material(material)
        }
    }

    /// The material, if the slot holds any
    pub fn into_material(self) -> Option<TlsMaterial> {
        match self {
            Self::Material(material) => Some(material),
            Self::Unset | Self::Empty => None,
        }
    }
}

/// Store for non-secret context metadata
#[cfg_attr(test, mockall::automock)]
pub trait MetadataStore: Send + Sync {
    /// Create the record or overwrite an existing one with the same name
    fn create_or_update(&self, meta: Metadata) -> Result<()>;

    /// Fetch a record by name
    ///
    /// Fails with `NotFound` when no record has that name.
    fn get_metadata(&self, name: &str) -> Result<Metadata>;

    /// All records, in no particular order
    fn list(&self) -> Result<Vec<Metadata>>;

    /// Delete a record
    fn remove(&self, name: &str) -> Result<()>;
}

/// Store for secret TLS blobs
#[cfg_attr(test, mockall::automock)]
pub trait TlsStore: Send + Sync {
    /// Replace everything stored for `(name, endpoint)` with `material`
    ///
    /// Resetting with empty material leaves the slot in the `Empty` state.
    fn reset_endpoint_tls_material(&self, name: &str, endpoint: &str, material: &TlsMaterial) -> Result<()>;

    /// Read the slot for `(name, endpoint)`
    fn get_endpoint_tls_material(&self, name: &str, endpoint: &str) -> Result<TlsSlot>;

    /// Drop every TLS slot of a context
    fn remove_tls_material(&self, name: &str) -> Result<()>;
}
