//! Subscriber setup for the binaries. Library code only emits `tracing` events.
//!
//! `RUST_LOG` selects the filter (default `readalign=info`); set
//! `RUST_LOG_FORMAT=json` for one JSON object per line on stderr.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "readalign=info";

/// Installs the global subscriber. Later calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    let json = wants_json(std::env::var("RUST_LOG_FORMAT").ok().as_deref());
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

fn wants_json(format: Option<&str>) -> bool {
    format.is_some_and(|value| value.trim().eq_ignore_ascii_case("json"))
}
