//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system with `info` as the default filter.
///
/// `RUST_LOG` still overrides the default. Calling this more than once is
/// harmless; later calls are ignored.
pub fn init() {
    init_with_filter("info");
}

/// Initialize the logging system with a custom default filter
/// (e.g. `"engine_core=debug"`).
pub fn init_with_filter(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
    }
}
