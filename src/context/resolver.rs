//! Kubeconfig to endpoint resolution
//!
//! Picks a context out of a kubeconfig, follows it to its cluster and user
//! entries and flattens the result into an [`Endpoint`]. TLS material
//! referenced by path is read here, so the endpoint no longer depends on the
//! files it came from. Credential plugins are copied, never run.
//!
//! An empty `*-data` value or an empty referenced file counts as not set: it
//! never shows up as a zero-length CA, cert or key.

use std::path::Path;

use log::{debug, warn};

use crate::common::fs::{read_file, resolve_relative};
use crate::common::{EndpointError, Result};
use crate::context::endpoint::{Endpoint, EndpointMeta, TlsData, UsernamePassword};
use crate::kubeconfig::{decode_data, AuthInfo, Kubeconfig};

/// Resolve a context of the kubeconfig at `path`
///
/// An empty `context_name` selects the file's current context. A non-empty
/// `namespace_override` wins over the context's namespace.
///
/// # Errors
///
/// * `NotFound` - the context, its cluster or its user does not exist
/// * `Parse` - the file (or a `*-data` field in it) is malformed
/// * `Io` - the file or a referenced certificate file cannot be read
pub fn from_kubeconfig<P: AsRef<Path>>(
    path: P,
    context_name: &str,
    namespace_override: &str,
) -> Result<Endpoint> {
    let path = path.as_ref();
    let config = Kubeconfig::read_from(path)?;
    resolve(&config, path.parent(), context_name, namespace_override)
}

/// Resolve a context of an already parsed kubeconfig
///
/// Relative certificate paths are looked up in `base_dir`.
pub fn resolve(
    config: &Kubeconfig,
    base_dir: Option<&Path>,
    context_name: &str,
    namespace_override: &str,
) -> Result<Endpoint> {
    let context_name = if context_name.is_empty() {
        config
            .current_context()
            .ok_or_else(|| EndpointError::not_found("current context is not set"))?
    } else {
        context_name
    };
    debug!("Resolving kubeconfig context {:?}", context_name);

    let context = config
        .context(context_name)
        .ok_or_else(|| EndpointError::not_found(format!("context {:?}", context_name)))?;

    let cluster = config.cluster(&context.cluster).ok_or_else(|| {
        EndpointError::not_found(format!(
            "cluster {:?} referenced by context {:?}",
            context.cluster, context_name
        ))
    })?;

    // A context without a user is anonymous, not broken
    let default_user = AuthInfo::default();
    let user = if context.user.is_empty() {
        &default_user
    } else {
        config.auth_info(&context.user).ok_or_else(|| {
            EndpointError::not_found(format!(
                "user {:?} referenced by context {:?}",
                context.user, context_name
            ))
        })?
    };

    let host = cluster
        .server
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EndpointError::parse(format!("cluster {:?} has no server", context.cluster)))?;

    let namespace = if namespace_override.is_empty() {
        context.namespace.clone().unwrap_or_default()
    } else {
        namespace_override.to_string()
    };

    let ca = load_tls_field(
        "certificate-authority",
        cluster.certificate_authority_data.as_deref(),
        cluster.certificate_authority.as_deref(),
        base_dir,
    )?;
    let cert = load_tls_field(
        "client-certificate",
        user.client_certificate_data.as_deref(),
        user.client_certificate.as_deref(),
        base_dir,
    )?;
    let key = load_tls_field(
        "client-key",
        user.client_key_data.as_deref(),
        user.client_key.as_deref(),
        base_dir,
    )?;

    if user.token.is_some() || user.token_file.is_some() {
        warn!(
            "User {:?} has a bearer token; tokens are not kept in endpoints",
            context.user
        );
    }
    if user.exec.is_some() && user.auth_provider.is_some() {
        warn!(
            "User {:?} sets both exec and auth-provider; carrying both",
            context.user
        );
    }

    let username = user.username.clone().unwrap_or_default();
    let password = user.password.clone().unwrap_or_default();
    let username_password = if username.is_empty() && password.is_empty() {
        None
    } else {
        Some(UsernamePassword { username, password })
    };

    let meta = EndpointMeta {
        host: host.to_string(),
        skip_tls_verify: cluster.insecure_skip_tls_verify.unwrap_or(false),
        default_namespace: namespace,
        auth_provider: user.auth_provider.clone(),
        exec: user.exec.clone(),
        username_password,
    };

    Ok(Endpoint::new(meta, TlsData::new(ca, cert, key)))
}

/// Load one TLS blob, preferring inline data over a file reference
///
/// Empty data and empty files count as not set, so they yield `None`
/// rather than `Some(vec![])`.
fn load_tls_field(
    field: &str,
    data: Option<&str>,
    file: Option<&Path>,
    base_dir: Option<&Path>,
) -> Result<Option<Vec<u8>>> {
    let data = data.filter(|d| !d.trim().is_empty());
    let file = file.filter(|f| !f.as_os_str().is_empty());

    let bytes = match (data, file) {
        (Some(data), file) => {
            if let Some(file) = file {
                warn!(
                    "{}-data and {} ({}) are both set, using {}-data",
                    field,
                    field,
                    file.display(),
                    field
                );
            }
            decode_data(&format!("{}-data", field), data)?
        }
        (None, Some(file)) => {
            let path = resolve_relative(base_dir, file);
            debug!("Reading {} from {}", field, path.display());
            read_file(&path)?
        }
        (None, None) => return Ok(None),
    };

    Ok(Some(bytes).filter(|b| !b.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;
    use std::fs;

    const CONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: context1
clusters:
- name: cluster1
  cluster:
    server: https://server1
    insecure-skip-tls-verify: true
- name: cluster2
  cluster:
    server: https://server2
    certificate-authority-data: Y2E=
- name: no-server
  cluster:
    insecure-skip-tls-verify: true
users:
- name: user
  user:
    client-certificate-data: Y2VydA==
    client-key-data: a2V5
- name: anonymous-ish
  user: {}
contexts:
- name: context1
  context:
    cluster: cluster1
    user: user
    namespace: namespace1
- name: context2
  context:
    cluster: cluster2
    user: user
    namespace: namespace2
- name: dangling-cluster
  context:
    cluster: missing
    user: user
- name: dangling-user
  context:
    cluster: cluster1
    user: missing
- name: serverless
  context:
    cluster: no-server
    user: user
- name: no-user
  context:
    cluster: cluster1
"#;

    fn config() -> Kubeconfig {
        Kubeconfig::from_yaml(CONFIG).unwrap()
    }

    #[test]
    fn test_resolve_current_context() {
        let ep = resolve(&config(), None, "", "").unwrap();

        assert_eq!(ep.meta.host, "https://server1");
        assert!(ep.meta.skip_tls_verify);
        assert_eq!(ep.namespace(), "namespace1");
        assert_eq!(
            ep.tls_data,
            TlsData::new(None, Some(b"cert".to_vec()), Some(b"key".to_vec()))
        );
    }

    #[test]
    fn test_resolve_named_context_with_override() {
        let ep = resolve(&config(), None, "context2", "namespace-override").unwrap();

        assert_eq!(ep.meta.host, "https://server2");
        assert!(!ep.meta.skip_tls_verify);
        assert_eq!(ep.namespace(), "namespace-override");
        let tls = ep.tls_data.unwrap();
        assert_eq!(tls.ca(), Some(&b"ca"[..]));
        assert_eq!(tls.cert(), Some(&b"cert"[..]));
        assert_eq!(tls.key(), Some(&b"key"[..]));
    }

    #[test]
    fn test_resolve_missing_entries() {
        let cfg = config();
        for context in ["nope", "dangling-cluster", "dangling-user"] {
            let err = resolve(&cfg, None, context, "").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "context {}", context);
        }

        let mut no_current = cfg.clone();
        no_current.current_context = None;
        assert!(resolve(&no_current, None, "", "").unwrap_err().is_not_found());
    }

    #[test]
    fn test_resolve_cluster_without_server() {
        let err = resolve(&config(), None, "serverless", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_resolve_context_without_user() {
        let ep = resolve(&config(), None, "no-user", "").unwrap();
        assert_eq!(ep.tls_data, None);
        assert_eq!(ep.namespace(), "");
        assert_eq!(ep.meta.username_password, None);
    }

    #[test]
    fn test_inline_data_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ca.crt"), b"ca-from-file").unwrap();
        let yaml = r#"
current-context: ctx
clusters:
- name: c
  cluster:
    server: https://c
    certificate-authority: ca.crt
    certificate-authority-data: Y2E=
users:
- name: u
  user: {}
contexts:
- name: ctx
  context: {cluster: c, user: u}
"#;
        let cfg = Kubeconfig::from_yaml(yaml).unwrap();
        let ep = resolve(&cfg, Some(dir.path()), "", "").unwrap();
        assert_eq!(ep.tls_data.unwrap().ca(), Some(&b"ca"[..]));
    }

    #[test]
    fn test_file_references_relative_to_kubeconfig() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("pki")).unwrap();
        fs::write(dir.path().join("pki").join("client.crt"), b"cert-from-file").unwrap();
        fs::write(dir.path().join("pki").join("client.key"), b"key-from-file").unwrap();
        let yaml = r#"
current-context: ctx
clusters:
- name: c
  cluster: {server: "https://c"}
users:
- name: u
  user:
    client-certificate: pki/client.crt
    client-key: pki/client.key
contexts:
- name: ctx
  context: {cluster: c, user: u}
"#;
        let cfg = Kubeconfig::from_yaml(yaml).unwrap();
        let ep = resolve(&cfg, Some(dir.path()), "", "").unwrap();
        let tls = ep.tls_data.unwrap();

        assert_eq!(tls.ca(), None);
        assert_eq!(tls.cert(), Some(&b"cert-from-file"[..]));
        assert_eq!(tls.key(), Some(&b"key-from-file"[..]));
    }

    #[test]
    fn test_missing_referenced_file() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = r#"
current-context: ctx
clusters:
- name: c
  cluster: {server: "https://c", certificate-authority: missing.crt}
contexts:
- name: ctx
  context: {cluster: c}
"#;
        let cfg = Kubeconfig::from_yaml(yaml).unwrap();
        let err = resolve(&cfg, Some(dir.path()), "", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_invalid_base64() {
        let yaml = r#"
current-context: ctx
clusters:
- name: c
  cluster: {server: "https://c", certificate-authority-data: "%%%"}
contexts:
- name: ctx
  context: {cluster: c}
"#;
        let cfg = Kubeconfig::from_yaml(yaml).unwrap();
        let err = resolve(&cfg, None, "", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_basic_auth_with_password_only() {
        let yaml = r#"
current-context: ctx
clusters:
- name: c
  cluster: {server: "https://c"}
users:
- name: u
  user: {password: secret}
contexts:
- name: ctx
  context: {cluster: c, user: u}
"#;
        let cfg = Kubeconfig::from_yaml(yaml).unwrap();
        let ep = resolve(&cfg, None, "", "").unwrap();
        assert_eq!(
            ep.meta.username_password,
            Some(UsernamePassword {
                username: String::new(),
                password: "secret".to_string(),
            })
        );

        let client = ep.client_config();
        assert_eq!(client.username, Some(String::new()));
        assert_eq!(client.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_empty_tls_sources_are_not_set() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.crt"), b"").unwrap();
        let yaml = r#"
current-context: ctx
clusters:
- name: c
  cluster: {server: "https://c", certificate-authority-data: ""}
users:
- name: u
  user: {client-certificate: empty.crt, client-key-data: a2V5}
contexts:
- name: ctx
  context: {cluster: c, user: u}
"#;
        let cfg = Kubeconfig::from_yaml(yaml).unwrap();
        let tls = resolve(&cfg, Some(dir.path()), "", "").unwrap().tls_data.unwrap();

        assert_eq!(tls.ca(), None);
        assert_eq!(tls.cert(), None);
        assert_eq!(tls.key(), Some(&b"key"[..]));
    }
}
