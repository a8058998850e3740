//! Log setup for the `migrate` binary.

use std::io::{self, IsTerminal};
use tracing_subscriber::{EnvFilter, fmt};

/// Crate target prefix, so `-v` raises only this crate's verbosity.
pub const TARGET_PREFIX: &str = "normalizer_migrate";

/// Filter for a given `-v` count. `RUST_LOG` wins when set.
pub fn filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        EnvFilter::new(format!("warn,{TARGET_PREFIX}={level}"))
    })
}

/// Installs a compact stderr subscriber. Safe to call more than once.
pub fn init(verbosity: u8) {
    let _ = fmt()
        .with_env_filter(filter(verbosity))
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .compact()
        .try_init();
}
