//! Tracing setup
//!
//! The subscriber is installed before configuration is read, so messages
//! from config loading are not lost. Its filter starts at `info` (or
//! `RUST_LOG`) and is swapped for the configured level once known.

use std::path::Path;

use attendance_common::config::{self, TomlConfig};
use tracing::warn;
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Level used until the configuration has been loaded
pub const STARTUP_LEVEL: &str = "info";

/// Filter directives for a base level, keeping HTTP internals quiet
pub fn filter_directives(level: &str) -> String {
    format!("{},hyper=warn,reqwest=warn", level.trim())
}

/// Handle for replacing the active filter after startup
#[derive(Clone)]
pub struct LogHandle(reload::Handle<EnvFilter, Registry>);

impl LogHandle {
    /// Apply a configured level. `RUST_LOG`, when set, keeps precedence.
    pub fn set_level(&self, level: &str) {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }

        let filter = match EnvFilter::try_new(filter_directives(level)) {
            Ok(filter) => filter,
            Err(e) => {
                warn!(level, error = %e, "Invalid log level, keeping current filter");
                return;
            }
        };

        if let Err(e) = self.0.reload(filter) {
            warn!(error = %e, "Failed to apply configured log level");
        }
    }
}

/// Reloadable filter layer at the startup level
pub fn startup_filter() -> (reload::Layer<EnvFilter, Registry>, LogHandle) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(STARTUP_LEVEL)));
    let (layer, handle) = reload::Layer::new(filter);
    (layer, LogHandle(handle))
}

/// Install the global stderr subscriber
pub fn init() -> LogHandle {
    let (filter, handle) = startup_filter();
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    handle
}

/// Load configuration under the already-installed subscriber, then switch
/// the filter to the configured level
pub fn load_config(
    explicit_path: Option<&Path>,
    handle: &LogHandle,
) -> attendance_common::Result<TomlConfig> {
    let config = config::load_config(explicit_path)?;
    handle.set_level(&config.logging.level);
    Ok(config)
}
