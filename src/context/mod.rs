//! Kubernetes contexts
//!
//! Resolution (kubeconfig → [`Endpoint`]), split persistence
//! ([`persist`]/[`hydrate`]) and reconstruction ([`Endpoint::client_config`]).

pub mod client;
pub mod endpoint;
pub mod load;
pub mod resolver;

pub use self::client::{ClientConfig, DEFAULT_NAMESPACE};
pub use self::endpoint::{
    endpoint_from_context, hydrate, persist, Endpoint, EndpointMeta, TlsData, UsernamePassword,
    KUBERNETES_ENDPOINT,
};
pub use self::load::{client_config_from_context, client_config_from_endpoint, import_kubeconfig};
pub use self::resolver::{from_kubeconfig, resolve};
