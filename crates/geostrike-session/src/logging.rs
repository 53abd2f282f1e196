//! Logger setup for the session runner and the `geostrike` binary.

use env_logger::{Builder, Env};
use log::LevelFilter;

const GEOSTRIKE_TARGETS: [&str; 3] = ["geostrike_core", "geostrike_engine", "geostrike_session"];

/// Default filter: third-party crates at `warn`, geostrike crates at `level`.
fn default_filter(level: LevelFilter) -> String {
    let mut filter = String::from("warn");
    for target in GEOSTRIKE_TARGETS {
        filter.push_str(&format!(",{target}={level}"));
    }
    filter
}

/// Install the global logger. `verbose` lowers geostrike's own logging to
/// `debug`; `RUST_LOG` replaces the default filter entirely.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter(level)));
    builder.format_timestamp_millis();

    // Already installed (tests, embedding).
    let _ = builder.try_init();
}
