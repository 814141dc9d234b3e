//! Logging setup
//!
//! The library only talks to the `log` facade; binaries call [`init_logger`].

/// Initialize the global logger
///
/// `RUST_LOG` takes precedence over `level` when it is set.
///
/// # Parameters
///
/// * `level` - Default filter, e.g. `info` or `kube_endpoint=debug`
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", level);

    // A second initialization (tests, embedding) is not an error for us
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_twice() {
        init_logger("debug");
        init_logger("info");
        log::debug!("logger initialized");
    }
}
