//! Kube Endpoint Command Line Tool
//!
//! Imports kubeconfig contexts into an endpoint store and shows the client
//! configuration rebuilt from a stored endpoint.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, error};
use serde_json::json;

use kube_endpoint::common::{init_logger, Result};
use kube_endpoint::config::{ConfigLoader, Settings};
use kube_endpoint::context::{
    client_config_from_context, endpoint_from_context, import_kubeconfig, ClientConfig,
};
use kube_endpoint::store::{DirectoryStore, MetadataStore, TlsStore};
use kube_endpoint::{APP_NAME, VERSION};

/// Kube Endpoint: persistable kubernetes endpoints from kubeconfig contexts
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Endpoint store directory
    #[clap(long, env = "KUBE_ENDPOINT_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Log level
    #[clap(long)]
    log_level: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a kubeconfig context and store it as an endpoint
    Import {
        /// Name to store the endpoint under
        name: String,

        /// Kubeconfig file (defaults to KUBECONFIG or ~/.kube/config)
        #[clap(long)]
        kubeconfig: Option<PathBuf>,

        /// Context to import (defaults to the current context)
        #[clap(long)]
        context: Option<String>,

        /// Namespace overriding the context's own
        #[clap(long, short = 'n')]
        namespace: Option<String>,
    },

    /// Show the client configuration of a stored endpoint or kubernetes:// URL
    Inspect {
        name: String,
    },

    /// List stored endpoints
    Ls,

    /// Remove a stored endpoint
    Rm {
        name: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut settings = match Settings::auto_load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", APP_NAME, e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = args.store_dir.clone() {
        settings.store_dir = dir;
    }
    if let Some(level) = args.log_level.clone() {
        settings.log_level = level;
    }

    init_logger(&settings.log_level);
    debug!("Starting {} v{}", APP_NAME, VERSION);
    settings.log();

    match run(args.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, settings: &Settings) -> Result<()> {
    let store = DirectoryStore::new(&settings.store_dir);

    match command {
        Command::Import {
            name,
            kubeconfig,
            context,
            namespace,
        } => {
            let path = match kubeconfig {
                Some(path) => path,
                None => settings.kubeconfig_path()?,
            };
            let endpoint = import_kubeconfig(
                &path,
                context.as_deref().unwrap_or_default(),
                namespace.as_deref().unwrap_or_default(),
                &name,
                &store,
                &store,
            )?;
            println!("{}\t{}", name, endpoint.meta.host);
        }
        Command::Inspect { name } => {
            let config = client_config_from_context(&name, &store, &store, settings)?;
            print_json(&describe(&config))?;
        }
        Command::Ls => {
            let mut records = store.list()?;
            records.sort_by(|a, b| a.name.cmp(&b.name));
            for record in records {
                let host = endpoint_from_context(&record)?
                    .map(|meta| meta.host)
                    .unwrap_or_else(|| "-".to_string());
                println!("{}\t{}", record.name, host);
            }
        }
        Command::Rm { name } => {
            store.remove(&name)?;
            store.remove_tls_material(&name)?;
            println!("{}", name);
        }
    }
    Ok(())
}

/// JSON view of a client configuration; key material is summarized
fn describe(config: &ClientConfig) -> serde_json::Value {
    let blob = |data: &Option<Vec<u8>>| data.as_ref().map(|d| format!("{} bytes", d.len()));
    json!({
        "host": config.host,
        "namespace": config.effective_namespace(),
        "insecure": config.insecure,
        "caData": blob(&config.ca_data),
        "certData": blob(&config.cert_data),
        "keyData": blob(&config.key_data),
        "username": config.username,
        "authProvider": config.auth_provider,
        "execProvider": config.exec_provider,
    })
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
