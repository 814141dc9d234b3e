//! Directory-backed store
//!
//! Layout, compatible with the docker CLI context store:
//!
//! ```text
//! <root>/meta/<sha256(name)>/meta.json
//! <root>/tls/<sha256(name)>/<endpoint>/{ca,cert,key}.pem
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use sha2::{Digest, Sha256};

use super::{Metadata, MetadataStore, TlsMaterial, TlsSlot, TlsStore, CA_FILE, CERT_FILE, KEY_FILE};
use crate::common::fs::write_atomic;
use crate::common::{EndpointError, Result};

const META_DIR: &str = "meta";
const TLS_DIR: &str = "tls";
const META_FILE: &str = "meta.json";

/// Directory name used for a context
pub fn context_id(name: &str) -> String {
    format!("{:x}", Sha256::digest(name.as_bytes()))
}

/// Read a file that may legitimately be absent
fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(EndpointError::file_read(path, e)),
    }
}

/// Remove a directory tree, ignoring one that does not exist
fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Store rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open (lazily) a store at `root`; directories are created on first write
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.root.join(META_DIR).join(context_id(name)).join(META_FILE)
    }

    fn tls_context_dir(&self, name: &str) -> PathBuf {
        self.root.join(TLS_DIR).join(context_id(name))
    }

    fn tls_endpoint_dir(&self, name: &str, endpoint: &str) -> PathBuf {
        self.tls_context_dir(name).join(endpoint)
    }
}

impl MetadataStore for DirectoryStore {
    fn create_or_update(&self, meta: Metadata) -> Result<()> {
        let path = self.meta_path(&meta.name);
        debug!("Writing metadata for context {:?} to {}", meta.name, path.display());
        let data = serde_json::to_vec(&meta)?;
        write_atomic(&path, &data)
    }

    fn get_metadata(&self, name: &str) -> Result<Metadata> {
        let path = self.meta_path(name);
        let data = read_optional(&path)?
            .ok_or_else(|| EndpointError::not_found(format!("context {:?}", name)))?;
        let meta: Metadata = serde_json::from_slice(&data).map_err(|e| {
            EndpointError::parse(format!("invalid metadata in {}: {}", path.display(), e))
        })?;
        Ok(meta)
    }

    fn list(&self) -> Result<Vec<Metadata>> {
        let dir = self.root.join(META_DIR);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(EndpointError::file_read(dir, e)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry?;
            // Stray files and directories without a meta.json are skipped
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path().join(META_FILE);
            if let Some(data) = read_optional(&path)? {
                records.push(serde_json::from_slice(&data).map_err(|e| {
                    EndpointError::parse(format!("invalid metadata in {}: {}", path.display(), e))
                })?);
            }
        }
        Ok(records)
    }

    fn remove(&self, name: &str) -> Result<()> {
        let dir = self.root.join(META_DIR).join(context_id(name));
        if !remove_dir_if_exists(&dir)? {
            return Err(EndpointError::not_found(format!("context {:?}", name)));
        }
        Ok(())
    }
}

impl TlsStore for DirectoryStore {
    fn reset_endpoint_tls_material(&self, name: &str, endpoint: &str, material: &TlsMaterial) -> Result<()> {
        let dir = self.tls_endpoint_dir(name, endpoint);
        debug!("Resetting TLS material for context {:?} endpoint {}", name, endpoint);

        remove_dir_if_exists(&dir)?;
        // The directory marks the slot as written even when it stays empty
        fs::create_dir_all(&dir)?;
        for (file, data) in material.files() {
            write_atomic(&dir.join(file), data)?;
        }
        Ok(())
    }

    fn get_endpoint_tls_material(&self, name: &str, endpoint: &str) -> Result<TlsSlot> {
        let dir = self.tls_endpoint_dir(name, endpoint);
        if !dir.is_dir() {
            return Ok(TlsSlot::Unset);
        }

        let material = TlsMaterial {
            ca: read_optional(&dir.join(CA_FILE))?,
            cert: read_optional(&dir.join(CERT_FILE))?,
            key: read_optional(&dir.join(KEY_FILE))?,
        };
        Ok(TlsSlot::from_material(material))
    }

    fn remove_tls_material(&self, name: &str) -> Result<()> {
        remove_dir_if_exists(&self.tls_context_dir(name))?;
        Ok(())
    }
}
