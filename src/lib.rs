//! Kube Endpoint: persistable kubernetes endpoints from kubeconfig contexts
//!
//! A kubeconfig context can authenticate in many ways: embedded certificates,
//! certificate files, exec credential plugins, auth-provider plugins, basic
//! auth. This crate flattens a context into an [`Endpoint`], stores it with
//! secret TLS material kept apart from the rest, and later rebuilds a
//! [`ClientConfig`] from what was stored. Credential plugins are carried
//! along untouched; nothing here runs them or talks to a cluster.
//!
//! # Main Features
//!
//! - Context resolution with namespace override and inline/file TLS material
//! - Split persistence: metadata store and TLS store joined by context name
//! - Lossless pass-through of `exec` and `auth-provider` configuration
//! - In-memory and directory-backed stores
//!
//! # Example
//!
//! ```no_run
//! use kube_endpoint::context::{from_kubeconfig, hydrate, persist};
//! use kube_endpoint::store::DirectoryStore;
//! use kube_endpoint::Result;
//!
//! fn main() -> Result<()> {
//!     let store = DirectoryStore::new("/var/lib/kube-endpoint");
//!
//!     // Current context, its own namespace
//!     let endpoint = from_kubeconfig("/home/me/.kube/config", "", "")?;
//!     persist(&store, &store, &endpoint, "prod")?;
//!
//!     let config = hydrate(&store, &store, "prod")?.client_config();
//!     println!("{} ({})", config.host, config.effective_namespace());
//!     Ok(())
//! }
//! ```

pub mod common;
pub mod config;
pub mod context;
pub mod kubeconfig;
pub mod store;

// Re-export commonly used structures and functions for convenience
pub use common::{EndpointError, ErrorKind, Result};
pub use context::{ClientConfig, Endpoint, EndpointMeta, TlsData};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
