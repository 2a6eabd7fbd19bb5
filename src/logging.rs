//! Tracing setup for the binary.
//!
//! Verbosity comes from `RUST_LOG` (e.g. `RUST_LOG=aoi_credits=debug`) and
//! defaults to `warn`. Logs go to stderr so stdout stays clean for reports
//! and `--json` output.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
