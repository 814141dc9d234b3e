//! In-memory store
//!
//! Implements both store traits on top of two hash maps. Useful for tests
//! and for callers that only need endpoints for the lifetime of a process.

use std::collections::HashMap;
use std::io;
use std::sync::{PoisonError, RwLock};

use super::{Metadata, MetadataStore, TlsMaterial, TlsSlot, TlsStore};
use crate::common::{EndpointError, Result};

fn poisoned<T>(_: PoisonError<T>) -> EndpointError {
    EndpointError::Io(io::Error::new(io::ErrorKind::Other, "store lock poisoned"))
}

/// Process-local metadata and TLS store
#[derive(Debug, Default)]
pub struct MemoryStore {
    metadata: RwLock<HashMap<String, Metadata>>,
    tls: RwLock<HashMap<(String, String), TlsMaterial>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataStore for MemoryStore {
    fn create_or_update(&self, meta: Metadata) -> Result<()> {
        let mut records = self.metadata.write().map_err(poisoned)?;
        records.insert(meta.name.clone(), meta);
        Ok(())
    }

    fn get_metadata(&self, name: &str) -> Result<Metadata> {
        let records = self.metadata.read().map_err(poisoned)?;
        records
            .get(name)
            .cloned()
            .ok_or_else(|| EndpointError::not_found(format!("context {:?}", name)))
    }

    fn list(&self) -> Result<Vec<Metadata>> {
        let records = self.metadata.read().map_err(poisoned)?;
        Ok(records.values().cloned().collect())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let mut records = self.metadata.write().map_err(poisoned)?;
        records
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| EndpointError::not_found(format!("context {:?}", name)))
    }
}

impl TlsStore for MemoryStore {
    fn reset_endpoint_tls_material(&self, name: &str, endpoint: &str, material: &TlsMaterial) -> Result<()> {
        let mut slots = self.tls.write().map_err(poisoned)?;
        slots.insert((name.to_string(), endpoint.to_string()), material.clone());
        Ok(())
    }

    fn get_endpoint_tls_material(&self, name: &str, endpoint: &str) -> Result<TlsSlot> {
        let slots = self.tls.read().map_err(poisoned)?;
        Ok(slots
            .get(&(name.to_string(), endpoint.to_string()))
            .cloned()
            .map_or(TlsSlot::Unset, TlsSlot::from_material))
    }

    fn remove_tls_material(&self, name: &str) -> Result<()> {
        let mut slots = self.tls.write().map_err(poisoned)?;
        slots.retain(|(context, _), _| context != name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_upsert() {
        let store = MemoryStore::new();
        store.create_or_update(Metadata::new("dev")).unwrap();

        let mut updated = Metadata::new("dev");
        updated.metadata = serde_json::json!({"Description": "updated"});
        store.create_or_update(updated.clone()).unwrap();

        assert_eq!(store.get_metadata("dev").unwrap(), updated);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_metadata() {
        let store = MemoryStore::new();
        assert!(store.get_metadata("nope").unwrap_err().is_not_found());
        assert!(store.remove("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_tls_slot_states() {
        let store = MemoryStore::new();
        assert_eq!(store.get_endpoint_tls_material("dev", "kubernetes").unwrap(), TlsSlot::Unset);

        store
            .reset_endpoint_tls_material("dev", "kubernetes", &TlsMaterial::default())
            .unwrap();
        assert_eq!(store.get_endpoint_tls_material("dev", "kubernetes").unwrap(), TlsSlot::Empty);

        let material = TlsMaterial {
            ca: Some(b"ca".to_vec()),
            ..TlsMaterial::default()
        };
        store.reset_endpoint_tls_material("dev", "kubernetes", &material).unwrap();
        assert_eq!(
            store.get_endpoint_tls_material("dev", "kubernetes").unwrap(),
            TlsSlot::Material(material)
        );

        store.remove_tls_material("dev").unwrap();
        assert_eq!(store.get_endpoint_tls_material("dev", "kubernetes").unwrap(), TlsSlot::Unset);
    }
}
